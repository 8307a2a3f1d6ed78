//! # Rendering System
//!
//! The engine never talks to a graphics API directly. Everything it draws goes
//! through the [`RenderBackend`] capability trait:
//! - **ObjectRenderer**: places one part of a loaded model in the world
//! - **HeadlessBackend**: a recording backend for tools and tests
//!
//! Colours are straight RGBA in `[0, 1]`.

pub mod backend;
pub mod headless;
pub mod object_renderer;

pub use backend::{
    RenderBackend, BackendResult, StateGuard, VertexBufferHandle, TextureHandle, Texture,
    VertexLayout, MaterialParams, Font,
};
pub use headless::{HeadlessBackend, DrawCommand};
pub use object_renderer::{ObjectRenderer, WorldPlacement};

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

/// RGBA colour
pub type Color = [f32; 4];

/// One triangle corner: model-space position and texture coordinate.
///
/// Loaded models carry no normals; the `#[repr(C)]` layout is what
/// [`Vertex::LAYOUT`] describes to the backend.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Interleaved layout of [`Vertex`]. Texture V is flipped because images
    /// are stored top row first.
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: std::mem::size_of::<Vertex>() as u32,
        position_offset: std::mem::offset_of!(Vertex, position) as u32,
        tex_coord_offset: std::mem::offset_of!(Vertex, tex_coord) as u32,
        flip_v: true,
    };

    /// Create a new vertex
    pub const fn new(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, tex_coord }
    }

    /// Raw bytes of a vertex slice, as uploaded to a GPU buffer
    pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}

/// Named HUD colours
pub mod colors {
    use super::Color;

    /// Default text colour
    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    /// Disabled labels
    pub const GREY: Color = [0.5, 0.5, 0.5, 1.0];
    /// Panel headings
    pub const CONSOLE: Color = [0.1, 0.9, 0.1, 1.0];
    /// Disabled ships
    pub const INERT: Color = [221.0 / 255.0, 221.0 / 255.0, 221.0 / 255.0, 1.0];
    /// Non-hostile objects
    pub const NEUTRAL: Color = [221.0 / 255.0, 204.0 / 255.0, 119.0 / 255.0, 1.0];
    /// Friendly objects
    pub const FRIEND: Color = [68.0 / 255.0, 170.0 / 255.0, 153.0 / 255.0, 1.0];
    /// Hostile objects
    pub const HOSTILE: Color = [204.0 / 255.0, 68.0 / 255.0, 153.0 / 255.0, 1.0];
    /// Player glyph on the radar
    pub const RADAR_PLAYER: Color = [0.9, 0.1, 0.9, 1.0];
    /// Targeted pilot on the radar
    pub const RADAR_TARGET: Color = [1.0, 1.0, 1.0, 1.0];
    /// Projectiles on the radar
    pub const RADAR_WEAPON: Color = [0.8, 0.2, 0.2, 1.0];
    /// Shield bar
    pub const SHIELD: Color = [0.2, 0.2, 0.8, 1.0];
    /// Armour bar
    pub const ARMOUR: Color = [0.5, 0.5, 0.5, 1.0];
    /// Energy bar
    pub const ENERGY: Color = [0.2, 0.8, 0.2, 1.0];
}

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Backend could not allocate a resource
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// Texture data unusable by the backend
    #[error("Invalid texture: {0}")]
    InvalidTexture(String),
}
