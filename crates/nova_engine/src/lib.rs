//! # Nova Engine
//!
//! Model loading, model placement and the in-flight HUD of a 2D space game
//! with 3D-rendered ships.
//!
//! ## Features
//!
//! - **Wavefront models**: `.obj` geometry with `.mtl` materials, triangulated
//!   into one vertex buffer per part
//! - **Object rendering**: draw a named part of a model at a world position and
//!   heading, with per-draw transparency
//! - **HUD**: XML-described skins, radar, health bars, target and navigation
//!   panels, and a timed message log
//! - **Backend agnostic**: all drawing goes through [`render::RenderBackend`];
//!   [`render::HeadlessBackend`] records commands for tools and tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use nova_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     nova_engine::foundation::logging::init();
//!
//!     let config = EngineConfig::default();
//!     let source = DirectorySource::new(config.search_paths.clone());
//!     let mut backend = HeadlessBackend::new(800.0, 600.0);
//!
//!     let ship = ObjLoader::load(&source, &mut backend, Path::new("models/shark.obj"))?;
//!     let renderer = ObjectRenderer::new(&config.object);
//!     let placement = WorldPlacement::new(Vec2::new(100.0, 50.0), 0.0);
//!     renderer.render_part(&mut backend, &ship, &placement, "hull", 1.0);
//!
//!     let mut hud = Hud::new(config.hud.clone());
//!     hud.load_layout(&source, &mut backend, "simple")?;
//!     Ok(())
//! }
//! ```

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;
pub mod ui;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        foundation::math::{Vec2, Vec3, Vec4, Mat4},
        config::{Config, EngineConfig, HudConfig, ObjectRenderConfig},
        assets::{AssetSource, DirectorySource, ObjLoader, Object, Mesh, Material},
        render::{RenderBackend, HeadlessBackend, ObjectRenderer, WorldPlacement, Vertex, Color},
        ui::hud::{Hud, HudState, NavAction, WorldQuery, PilotView, PilotId, Planet, Jump},
    };
}
