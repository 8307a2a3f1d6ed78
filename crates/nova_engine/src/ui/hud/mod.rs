//! Heads-up display
//!
//! A [`Hud`] owns the loaded skin ([`HudLayout`]) and the live
//! [`HudState`]. The game calls [`Hud::render_background`] before drawing
//! ships and [`Hud::render_overlay`] after, passing its world through
//! [`WorldQuery`].
//!
//! ```no_run
//! use std::time::Duration;
//! use nova_engine::assets::DirectorySource;
//! use nova_engine::config::HudConfig;
//! use nova_engine::render::HeadlessBackend;
//! use nova_engine::ui::hud::Hud;
//!
//! let source = DirectorySource::new(["data"]);
//! let mut backend = HeadlessBackend::new(800.0, 600.0);
//! let mut hud = Hud::new(HudConfig::default());
//! hud.load_layout(&source, &mut backend, "simple")?;
//! hud.message("Welcome to Sirius", Duration::ZERO);
//! # Ok::<(), nova_engine::ui::hud::HudError>(())
//! ```

pub mod commands;
pub mod layout;
pub mod messages;
pub mod renderer;
pub mod state;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use crate::assets::AssetSource;
use crate::config::HudConfig;
use crate::render::RenderBackend;

pub use commands::NavAction;
pub use layout::{
    GuiDescriptor, HudError, HudGeometry, HudGraphics, HudLayout, LayoutMetrics, RadarLayout, RadarShape,
    Rect, TargetLayout,
};
pub use messages::{Message, MessageLog, MESSAGE_MAX_CHARS};
pub use renderer::{format_credits, in_radar_range, HudRenderer};
pub use state::HudState;
pub use world::{
    Ammo, FactionId, HyperspaceReadiness, Jump, PilotFlags, PilotId, PilotView, Planet, SecondaryWeapon,
    WorldQuery,
};

/// HUD context: configuration, skin and live state
#[derive(Debug)]
pub struct Hud {
    config: HudConfig,
    layout: Option<HudLayout>,
    state: HudState,
}

impl Hud {
    /// Create a HUD with no skin loaded
    pub fn new(config: HudConfig) -> Self {
        let state = HudState::new(&config);
        Self {
            config,
            layout: None,
            state,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &HudConfig {
        &self.config
    }

    /// Load the skin `name` and make it current
    ///
    /// # Errors
    ///
    /// See [`HudLayout::load`]. The current skin is kept on failure.
    pub fn load_layout(
        &mut self,
        source: &dyn AssetSource,
        backend: &mut dyn RenderBackend,
        name: &str,
    ) -> Result<(), HudError> {
        let layout = HudLayout::load(source, backend, &self.config, name)?;
        log::info!("Loaded GUI '{}'", layout.name);
        self.set_layout(backend, layout);
        Ok(())
    }

    /// Replace the current skin, releasing the old one
    pub fn set_layout(&mut self, backend: &mut dyn RenderBackend, layout: HudLayout) {
        if let Some(old) = self.layout.replace(layout) {
            old.release(backend);
        }
    }

    /// Current skin
    pub fn layout(&self) -> Option<&HudLayout> {
        self.layout.as_ref()
    }

    /// Live state
    pub fn state(&self) -> &HudState {
        &self.state
    }

    /// Mutable live state
    pub fn state_mut(&mut self) -> &mut HudState {
        &mut self.state
    }

    /// Show a message in the log
    pub fn message(&mut self, text: impl Into<String>, now: Duration) {
        self.state.message(text, now);
    }

    /// Draw the layer below ships. Does nothing without a skin.
    pub fn render_background(&mut self, world: &dyn WorldQuery, backend: &mut dyn RenderBackend) {
        if let Some(layout) = &self.layout {
            HudRenderer::new(layout, &self.config).render_background(&mut self.state, world, backend);
        }
    }

    /// Draw the player and the HUD proper. Does nothing without a skin.
    pub fn render_overlay(&mut self, world: &dyn WorldQuery, backend: &mut dyn RenderBackend, now: Duration) {
        if let Some(layout) = &self.layout {
            HudRenderer::new(layout, &self.config).render_overlay(&mut self.state, world, backend, now);
        }
    }

    /// Free the skin's textures
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(layout) = self.layout.take() {
            layout.release(backend);
        }
    }
}
