//! Fixtures shared by the HUD tests

use crate::assets::ImageData;
use crate::foundation::math::Vec2;
use crate::render::{colors, RenderBackend};
use super::layout::{HudGeometry, HudGraphics, HudLayout, RadarLayout, RadarShape, Rect, TargetLayout};
use super::world::{
    FactionId, HyperspaceReadiness, Jump, PilotFlags, PilotId, PilotView, Planet, WorldQuery,
};

/// In-memory world with one planet and one jump route
pub(crate) struct TestWorld {
    pub player: PilotView,
    pub pilots: Vec<PilotView>,
    pub planets: Vec<Planet>,
    pub jumps: Vec<Jump>,
    pub projectiles: Vec<Vec2>,
    pub credits: u64,
    pub readiness: HyperspaceReadiness,
    pub enemies: Vec<(FactionId, FactionId)>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            player: Self::pilot(0, "Player", Vec2::zeros()),
            pilots: Vec::new(),
            planets: vec![Planet {
                name: "Dune".to_string(),
                position: Vec2::new(500.0, 300.0),
                sprite_size: Vec2::new(100.0, 80.0),
                faction: FactionId(2),
            }],
            jumps: vec![Jump { name: "Sirius".to_string() }],
            projectiles: Vec::new(),
            credits: 1500,
            readiness: HyperspaceReadiness::Ready,
            enemies: Vec::new(),
        }
    }

    /// Healthy neutral pilot with a 40x30 sprite
    pub fn pilot(id: u32, name: &str, position: Vec2) -> PilotView {
        PilotView {
            id: PilotId(id),
            name: name.to_string(),
            faction: FactionId(1),
            faction_name: "Independent".to_string(),
            position,
            velocity: Vec2::zeros(),
            heading: 0.0,
            flags: PilotFlags::empty(),
            shield: 100.0,
            shield_max: 100.0,
            armour: 100.0,
            armour_max: 100.0,
            energy: 100.0,
            energy_max: 100.0,
            sprite_size: Vec2::new(40.0, 30.0),
            target_graphic: None,
            secondary: None,
        }
    }
}

impl WorldQuery for TestWorld {
    fn player(&self) -> &PilotView {
        &self.player
    }

    fn pilots(&self) -> &[PilotView] {
        &self.pilots
    }

    fn planets(&self) -> &[Planet] {
        &self.planets
    }

    fn jumps(&self) -> &[Jump] {
        &self.jumps
    }

    fn projectiles(&self) -> &[Vec2] {
        &self.projectiles
    }

    fn are_enemies(&self, a: FactionId, b: FactionId) -> bool {
        self.enemies.contains(&(a, b)) || self.enemies.contains(&(b, a))
    }

    fn hyperspace_readiness(&self) -> HyperspaceReadiness {
        self.readiness
    }

    fn credits(&self) -> u64 {
        self.credits
    }

    fn render_player(&self, backend: &mut dyn RenderBackend) {
        backend.draw_points(&[self.player.position], colors::WHITE);
    }
}

/// Skin for an 800x600 screen with the HUD along the right edge
pub(crate) fn test_layout(backend: &mut dyn RenderBackend) -> HudLayout {
    let mut texture = |width, height, columns| {
        backend
            .create_texture(&ImageData::solid_color(width, height, [255, 255, 255, 255]), columns, columns)
            .unwrap()
    };
    let graphics = HudGraphics {
        frame: texture(150, 600, 1),
        target_pilot: texture(32, 32, 2),
        target_planet: texture(32, 32, 2),
    };

    let geometry = HudGeometry {
        frame: Vec2::new(650.0, 0.0),
        offset: Vec2::new(-90.0, 0.0),
        radar: RadarLayout {
            position: Vec2::new(660.0, 590.0),
            shape: RadarShape::Rectangle { width: 130.0, height: 120.0 },
        },
        nav: Rect::new(665.0, 450.0, 120.0, 40.0),
        shield: Rect::new(660.0, 390.0, 100.0, 8.0),
        armour: Rect::new(660.0, 375.0, 100.0, 8.0),
        energy: Rect::new(660.0, 360.0, 100.0, 8.0),
        weapon: Rect::new(665.0, 340.0, 120.0, 40.0),
        target: TargetLayout {
            gfx: Vec2::new(660.0, 190.0),
            name: Vec2::new(660.0, 175.0),
            faction: Vec2::new(660.0, 160.0),
            health: Vec2::new(660.0, 148.0),
        },
        misc: Rect::new(660.0, 110.0, 130.0, 40.0),
    };

    HudLayout {
        name: "test".to_string(),
        geometry,
        graphics,
    }
}
