//! What the HUD needs to know about the game world
//!
//! The simulation owns ships, planets and projectiles. The HUD only reads
//! them through [`WorldQuery`], once per frame.

use bitflags::bitflags;

use crate::foundation::math::Vec2;
use crate::render::{RenderBackend, Texture};

/// Stable pilot identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PilotId(pub u32);

/// Faction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactionId(pub u32);

bitflags! {
    /// Pilot status flags relevant to the HUD
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PilotFlags: u32 {
        /// Hostile towards the player
        const HOSTILE = 1 << 0;
        /// Disabled and drifting; can be boarded
        const DISABLED = 1 << 1;
    }
}

/// Ammunition loaded for a secondary weapon
#[derive(Debug, Clone, PartialEq)]
pub struct Ammo {
    /// Ammunition outfit name
    pub name: String,
    /// Rounds left
    pub quantity: u32,
}

/// Equipped secondary weapon
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryWeapon {
    /// Weapon outfit name
    pub name: String,
    /// Loaded ammunition, if the weapon uses any
    pub ammo: Option<Ammo>,
}

/// Snapshot of a pilot
#[derive(Debug, Clone, PartialEq)]
pub struct PilotView {
    /// Identifier
    pub id: PilotId,
    /// Display name
    pub name: String,
    /// Faction
    pub faction: FactionId,
    /// Faction display name
    pub faction_name: String,
    /// World position
    pub position: Vec2,
    /// World velocity
    pub velocity: Vec2,
    /// Heading in radians
    pub heading: f32,
    /// Status flags
    pub flags: PilotFlags,
    /// Shield points
    pub shield: f32,
    /// Maximum shield points
    pub shield_max: f32,
    /// Armour points
    pub armour: f32,
    /// Maximum armour points
    pub armour_max: f32,
    /// Energy
    pub energy: f32,
    /// Maximum energy
    pub energy_max: f32,
    /// Size of one frame of the ship's sprite
    pub sprite_size: Vec2,
    /// Ship picture for the target panel
    pub target_graphic: Option<Texture>,
    /// Equipped secondary weapon
    pub secondary: Option<SecondaryWeapon>,
}

impl PilotView {
    /// Whether the pilot is disabled
    pub fn is_disabled(&self) -> bool {
        self.flags.contains(PilotFlags::DISABLED)
    }

    /// Whether the pilot is hostile to the player
    pub fn is_hostile(&self) -> bool {
        self.flags.contains(PilotFlags::HOSTILE)
    }
}

/// A planet in the current system
#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    /// Display name
    pub name: String,
    /// World position
    pub position: Vec2,
    /// Size of the planet sprite
    pub sprite_size: Vec2,
    /// Owning faction
    pub faction: FactionId,
}

/// A hyperspace route out of the current system
#[derive(Debug, Clone, PartialEq)]
pub struct Jump {
    /// Destination system name
    pub name: String,
}

/// Whether the player could start a jump right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HyperspaceReadiness {
    /// Free to jump
    Ready,
    /// Too close to a planet or star
    TooCloseToGravity,
    /// Moving too fast
    TooFast,
}

/// Read access to the world for the HUD
pub trait WorldQuery {
    /// The player's own ship
    fn player(&self) -> &PilotView;

    /// Every other pilot in the system
    fn pilots(&self) -> &[PilotView];

    /// Look up a pilot other than the player
    fn pilot(&self, id: PilotId) -> Option<&PilotView> {
        self.pilots().iter().find(|pilot| pilot.id == id)
    }

    /// Planets of the current system
    fn planets(&self) -> &[Planet];

    /// Hyperspace routes of the current system
    fn jumps(&self) -> &[Jump];

    /// Positions of projectiles in flight
    fn projectiles(&self) -> &[Vec2];

    /// Whether two factions are at war
    fn are_enemies(&self, a: FactionId, b: FactionId) -> bool;

    /// Whether a jump would succeed right now
    fn hyperspace_readiness(&self) -> HyperspaceReadiness;

    /// Whether the player is far enough from gravity wells to jump
    fn can_hyperspace(&self) -> bool {
        self.hyperspace_readiness() != HyperspaceReadiness::TooCloseToGravity
    }

    /// Player's money
    fn credits(&self) -> u64;

    /// Draw the player's ship
    fn render_player(&self, backend: &mut dyn RenderBackend);
}
