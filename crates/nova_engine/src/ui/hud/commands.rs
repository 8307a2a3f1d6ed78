//! Player navigation commands
//!
//! Each command checks the world, explains refusals through the message log
//! and returns the action the game should carry out, if any.

use std::time::Duration;

use super::world::{HyperspaceReadiness, PilotId, WorldQuery};
use super::Hud;

/// Action accepted by a navigation command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// Board the disabled pilot
    Board(PilotId),
    /// Land on the planet at this index
    Land(usize),
    /// Start the jump along this route
    Hyperspace(usize),
}

impl Hud {
    /// Cycle the planet target through the current system
    pub fn target_next_planet(&mut self, world: &dyn WorldQuery) {
        self.state.target_next_planet(world.planets().len());
    }

    /// Cycle the hyperspace target through the current system
    pub fn target_next_hyperspace(&mut self, world: &dyn WorldQuery) {
        self.state.target_next_hyperspace(world.jumps().len());
    }

    /// Try to board the targeted pilot
    pub fn board(&mut self, world: &dyn WorldQuery, now: Duration) -> Option<NavAction> {
        let Some(target) = self.state.pilot_target().and_then(|id| world.pilot(id)) else {
            self.state.set_pilot_target(None);
            self.state.message("You need a target to board first!", now);
            return None;
        };
        let player = world.player();

        if !target.is_disabled() {
            self.state.message("You cannot board a ship that isn't disabled!", now);
            return None;
        }

        let reach = target.sprite_size.x * self.config.pilot_marker_scale;
        if (player.position - target.position).norm() > reach {
            self.state.message("You are too far away to board your target", now);
            return None;
        }

        let max_speed = self.config.max_docking_speed;
        if (player.velocity - target.velocity).norm_squared() > max_speed * max_speed {
            self.state.message("You are going to fast to board the ship", now);
            return None;
        }

        self.state.message(format!("Boarding ship {}", target.name), now);
        Some(NavAction::Board(target.id))
    }

    /// Try to land on the targeted planet, or target the nearest one
    pub fn land(&mut self, world: &dyn WorldQuery, now: Duration) -> Option<NavAction> {
        let player = world.player();
        let target = self
            .state
            .planet_target()
            .and_then(|index| world.planets().get(index).map(|planet| (index, planet)));

        let Some((index, planet)) = target else {
            self.state.target_nearest_planet(player.position, world.planets());
            return None;
        };

        if (player.position - planet.position).norm() > planet.sprite_size.x {
            self.state.message(format!("You are too far away to land on {}", planet.name), now);
            return None;
        }

        let max_speed = self.config.max_docking_speed;
        if player.velocity.norm_squared() > max_speed * max_speed {
            self.state.message(format!("You are going to fast to land on {}", planet.name), now);
            return None;
        }

        log::info!("Landing on {}", planet.name);
        Some(NavAction::Land(index))
    }

    /// Try to enter hyperspace along the targeted route
    pub fn jump(&mut self, world: &dyn WorldQuery, now: Duration) -> Option<NavAction> {
        let index = self.state.hyperspace_target()?;
        if index >= world.jumps().len() {
            self.state.set_hyperspace_target(None);
            return None;
        }

        match world.hyperspace_readiness() {
            HyperspaceReadiness::TooCloseToGravity => {
                self.state.message("You are too close to gravity centers to initiate hyperspace", now);
                None
            }
            HyperspaceReadiness::TooFast => {
                self.state.message("You are moving too fast to enter hyperspace.", now);
                None
            }
            HyperspaceReadiness::Ready => {
                self.state.message("Preparing for hyperspace", now);
                Some(NavAction::Hyperspace(index))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HudConfig;
    use crate::foundation::math::Vec2;
    use crate::ui::hud::testing::TestWorld;
    use crate::ui::hud::world::PilotFlags;

    fn newest(hud: &Hud) -> &str {
        hud.state().messages().get(0).map_or("", |m| m.text())
    }

    fn disabled_pilot(position: Vec2) -> TestWorld {
        let mut world = TestWorld::new();
        let mut wreck = TestWorld::pilot(3, "Trader", position);
        wreck.flags = PilotFlags::DISABLED;
        world.pilots.push(wreck);
        world
    }

    #[test]
    fn test_board_requires_target() {
        let world = TestWorld::new();
        let mut hud = Hud::new(HudConfig::default());

        assert_eq!(hud.board(&world, Duration::ZERO), None);
        assert_eq!(newest(&hud), "You need a target to board first!");

        hud.state_mut().set_pilot_target(Some(PilotId(42)));
        assert_eq!(hud.board(&world, Duration::ZERO), None);
        assert_eq!(hud.state().pilot_target(), None);
    }

    #[test]
    fn test_board_checks() {
        let mut world = disabled_pilot(Vec2::new(20.0, 0.0));
        let mut hud = Hud::new(HudConfig::default());
        hud.state_mut().set_pilot_target(Some(PilotId(3)));

        world.pilots[0].flags = PilotFlags::empty();
        assert_eq!(hud.board(&world, Duration::ZERO), None);
        assert_eq!(newest(&hud), "You cannot board a ship that isn't disabled!");

        // 40 px sprite: reach is 32
        world.pilots[0].flags = PilotFlags::DISABLED;
        world.pilots[0].position = Vec2::new(33.0, 0.0);
        assert_eq!(hud.board(&world, Duration::ZERO), None);
        assert_eq!(newest(&hud), "You are too far away to board your target");

        world.pilots[0].position = Vec2::new(20.0, 0.0);
        world.pilots[0].velocity = Vec2::new(30.0, 0.0);
        assert_eq!(hud.board(&world, Duration::ZERO), None);
        assert_eq!(newest(&hud), "You are going to fast to board the ship");

        world.player.velocity = Vec2::new(10.0, 0.0);
        assert_eq!(hud.board(&world, Duration::ZERO), Some(NavAction::Board(PilotId(3))));
        assert_eq!(newest(&hud), "Boarding ship Trader");
    }

    #[test]
    fn test_land_targets_nearest_first() {
        let mut world = TestWorld::new();
        world.planets.push(crate::ui::hud::world::Planet {
            name: "Caladan".to_string(),
            position: Vec2::new(50.0, 0.0),
            sprite_size: Vec2::new(120.0, 120.0),
            faction: crate::ui::hud::world::FactionId(1),
        });
        let mut hud = Hud::new(HudConfig::default());

        assert_eq!(hud.land(&world, Duration::ZERO), None);
        assert_eq!(hud.state().planet_target(), Some(1));
        assert!(hud.state().messages().is_empty());

        world.player.velocity = Vec2::new(20.0, 20.0);
        assert_eq!(hud.land(&world, Duration::ZERO), None);
        assert_eq!(newest(&hud), "You are going to fast to land on Caladan");

        world.player.velocity = Vec2::zeros();
        assert_eq!(hud.land(&world, Duration::ZERO), Some(NavAction::Land(1)));
    }

    #[test]
    fn test_land_too_far() {
        let world = TestWorld::new();
        let mut hud = Hud::new(HudConfig::default());
        hud.state_mut().set_planet_target(Some(0));

        assert_eq!(hud.land(&world, Duration::ZERO), None);
        assert_eq!(newest(&hud), "You are too far away to land on Dune");
    }

    #[test]
    fn test_jump_readiness() {
        let mut world = TestWorld::new();
        let mut hud = Hud::new(HudConfig::default());

        assert_eq!(hud.jump(&world, Duration::ZERO), None);
        assert!(hud.state().messages().is_empty());

        hud.target_next_hyperspace(&world);
        world.readiness = HyperspaceReadiness::TooCloseToGravity;
        assert_eq!(hud.jump(&world, Duration::ZERO), None);
        assert_eq!(newest(&hud), "You are too close to gravity centers to initiate hyperspace");

        world.readiness = HyperspaceReadiness::TooFast;
        assert_eq!(hud.jump(&world, Duration::ZERO), None);
        assert_eq!(newest(&hud), "You are moving too fast to enter hyperspace.");

        world.readiness = HyperspaceReadiness::Ready;
        assert_eq!(hud.jump(&world, Duration::ZERO), Some(NavAction::Hyperspace(0)));
        assert_eq!(newest(&hud), "Preparing for hyperspace");
    }

    #[test]
    fn test_planet_and_hyperspace_targets_exclusive() {
        let world = TestWorld::new();
        let mut hud = Hud::new(HudConfig::default());

        hud.target_next_planet(&world);
        assert_eq!(hud.state().planet_target(), Some(0));
        hud.target_next_hyperspace(&world);
        assert_eq!(hud.state().planet_target(), None);
        assert_eq!(hud.state().hyperspace_target(), Some(0));
    }
}
