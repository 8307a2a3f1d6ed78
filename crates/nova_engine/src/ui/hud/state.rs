//! Live HUD data: targets, radar zoom and messages

use std::time::Duration;

use crate::config::{HudConfig, RadarResolutionConfig};
use crate::foundation::math::Vec2;
use super::messages::MessageLog;
use super::world::{Planet, PilotId};

/// Per-player HUD state, reset on a new game or respawn
#[derive(Debug, Clone)]
pub struct HudState {
    pilot_target: Option<PilotId>,
    planet_target: Option<usize>,
    hyperspace_target: Option<usize>,
    radar_resolution: f32,
    radar_limits: RadarResolutionConfig,
    messages: MessageLog,
}

impl HudState {
    /// Fresh state with no targets and the default radar zoom
    pub fn new(config: &HudConfig) -> Self {
        Self {
            pilot_target: None,
            planet_target: None,
            hyperspace_target: None,
            radar_resolution: config.radar.clamp(config.radar.default),
            radar_limits: config.radar,
            messages: MessageLog::new(config.message_capacity, config.message_timeout()),
        }
    }

    /// Targeted pilot
    pub fn pilot_target(&self) -> Option<PilotId> {
        self.pilot_target
    }

    /// Target a pilot, or clear with `None`
    pub fn set_pilot_target(&mut self, target: Option<PilotId>) {
        self.pilot_target = target;
    }

    /// Index of the targeted planet in the current system
    pub fn planet_target(&self) -> Option<usize> {
        self.planet_target
    }

    /// Target a planet directly; clears the hyperspace target
    pub fn set_planet_target(&mut self, target: Option<usize>) {
        self.planet_target = target;
        if target.is_some() {
            self.hyperspace_target = None;
        }
    }

    /// Index of the targeted hyperspace route
    pub fn hyperspace_target(&self) -> Option<usize> {
        self.hyperspace_target
    }

    /// Target a hyperspace route directly; clears the planet target
    pub fn set_hyperspace_target(&mut self, target: Option<usize>) {
        self.hyperspace_target = target;
        if target.is_some() {
            self.planet_target = None;
        }
    }

    /// World units per radar pixel
    pub fn radar_resolution(&self) -> f32 {
        self.radar_resolution
    }

    /// Message log
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Mutable message log
    pub fn messages_mut(&mut self) -> &mut MessageLog {
        &mut self.messages
    }

    /// Show a message for the configured timeout
    pub fn message(&mut self, text: impl Into<String>, now: Duration) {
        self.messages.push(text, now);
    }

    /// Drop pilot, planet and hyperspace targets
    pub fn clear_targets(&mut self) {
        self.pilot_target = None;
        self.planet_target = None;
        self.hyperspace_target = None;
    }

    /// Cycle to the next planet, wrapping to no target after the last one
    pub fn target_next_planet(&mut self, planet_count: usize) {
        self.hyperspace_target = None;
        self.planet_target = next_index(self.planet_target, planet_count);
    }

    /// Cycle to the next hyperspace route, wrapping to no target after the last
    pub fn target_next_hyperspace(&mut self, jump_count: usize) {
        self.planet_target = None;
        self.hyperspace_target = next_index(self.hyperspace_target, jump_count);
    }

    /// Target the planet closest to `position`; returns the new target
    pub fn target_nearest_planet(&mut self, position: Vec2, planets: &[Planet]) -> Option<usize> {
        let nearest = planets
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (a.position - position).norm_squared();
                let db = (b.position - position).norm_squared();
                da.total_cmp(&db)
            })
            .map(|(index, _)| index);

        if nearest.is_some() {
            self.set_planet_target(nearest);
        }
        nearest
    }

    /// Zoom the radar out (positive) or in (negative) by whole steps
    pub fn zoom_radar(&mut self, steps: i32) {
        let limits = &self.radar_limits;
        self.radar_resolution = limits.clamp(self.radar_resolution + steps as f32 * limits.step);
    }

    /// Forget targets and messages and restore the default zoom
    pub fn reset(&mut self) {
        self.clear_targets();
        self.radar_resolution = self.radar_limits.clamp(self.radar_limits.default);
        self.messages.clear();
    }
}

fn next_index(current: Option<usize>, count: usize) -> Option<usize> {
    let next = current.map_or(0, |index| index + 1);
    (next < count).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::hud::world::FactionId;

    fn planet(name: &str, x: f32, y: f32) -> Planet {
        Planet {
            name: name.to_string(),
            position: Vec2::new(x, y),
            sprite_size: Vec2::new(64.0, 64.0),
            faction: FactionId(0),
        }
    }

    #[test]
    fn test_new_state_has_no_targets() {
        let state = HudState::new(&HudConfig::default());
        assert_eq!(state.pilot_target(), None);
        assert_eq!(state.planet_target(), None);
        assert_eq!(state.hyperspace_target(), None);
        assert_eq!(state.radar_resolution(), 40.0);
    }

    #[test]
    fn test_planet_cycle_wraps_to_none() {
        let mut state = HudState::new(&HudConfig::default());
        state.target_next_hyperspace(2);
        assert_eq!(state.hyperspace_target(), Some(0));

        state.target_next_planet(2);
        assert_eq!(state.planet_target(), Some(0));
        assert_eq!(state.hyperspace_target(), None);
        state.target_next_planet(2);
        assert_eq!(state.planet_target(), Some(1));
        state.target_next_planet(2);
        assert_eq!(state.planet_target(), None);

        state.target_next_planet(0);
        assert_eq!(state.planet_target(), None);
    }

    #[test]
    fn test_hyperspace_cycle_clears_planet() {
        let mut state = HudState::new(&HudConfig::default());
        state.target_next_planet(3);
        state.target_next_hyperspace(1);
        assert_eq!(state.planet_target(), None);
        assert_eq!(state.hyperspace_target(), Some(0));
        state.target_next_hyperspace(1);
        assert_eq!(state.hyperspace_target(), None);
    }

    #[test]
    fn test_nearest_planet() {
        let mut state = HudState::new(&HudConfig::default());
        let planets = [planet("Far", 1000.0, 0.0), planet("Near", -50.0, 20.0), planet("Mid", 300.0, 0.0)];

        assert_eq!(state.target_nearest_planet(Vec2::zeros(), &planets), Some(1));
        assert_eq!(state.planet_target(), Some(1));
        assert_eq!(state.target_nearest_planet(Vec2::zeros(), &[]), None);
        assert_eq!(state.planet_target(), Some(1));
    }

    #[test]
    fn test_radar_zoom_clamps() {
        let mut state = HudState::new(&HudConfig::default());
        state.zoom_radar(2);
        assert_eq!(state.radar_resolution(), 60.0);
        state.zoom_radar(10);
        assert_eq!(state.radar_resolution(), 100.0);
        state.zoom_radar(-20);
        assert_eq!(state.radar_resolution(), 10.0);
    }

    #[test]
    fn test_reset() {
        let mut state = HudState::new(&HudConfig::default());
        state.set_pilot_target(Some(PilotId(7)));
        state.zoom_radar(-1);
        state.message("Hello", Duration::ZERO);

        state.reset();
        assert_eq!(state.pilot_target(), None);
        assert_eq!(state.radar_resolution(), 40.0);
        assert!(state.messages().is_empty());
    }
}
