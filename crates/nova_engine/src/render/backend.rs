//! Backend abstraction traits for the rendering system
//!
//! This module defines the capabilities a graphics backend provides to the
//! model renderer and the HUD. Resource creation is fallible; per-frame state
//! and draw calls are not.
//!
//! ## Coordinate spaces
//!
//! - 3D draws use the model matrix set with [`RenderBackend::set_model_matrix`]
//!   in normalized device coordinates.
//! - HUD calls (`blit_static`, `fill_quad`, `draw_points`, `print*`) take
//!   screen pixels with the origin at the bottom-left corner, y growing up.
//! - `blit_sprite` takes a world position; the backend applies the camera.

use std::ops::{Deref, DerefMut};

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec2};
use super::{Color, RenderError, Vertex};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a static vertex buffer stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferHandle(pub u64);

/// Handle to a texture stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// A texture together with its size and sprite-sheet grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    /// Backend handle
    pub handle: TextureHandle,
    /// Full width in pixels
    pub width: f32,
    /// Full height in pixels
    pub height: f32,
    /// Sprite columns (1 for plain images)
    pub columns: u32,
    /// Sprite rows (1 for plain images)
    pub rows: u32,
}

impl Texture {
    /// Width of one sprite cell
    pub fn sprite_width(&self) -> f32 {
        self.width / self.columns.max(1) as f32
    }

    /// Height of one sprite cell
    pub fn sprite_height(&self) -> f32 {
        self.height / self.rows.max(1) as f32
    }
}

/// Interleaved vertex buffer layout, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    /// Distance between consecutive vertices
    pub stride: u32,
    /// Offset of the 3-float position
    pub position_offset: u32,
    /// Offset of the 2-float texture coordinate
    pub tex_coord_offset: u32,
    /// Sample textures with V inverted
    pub flip_v: bool,
}

/// Fixed-function lighting parameters for one draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    /// Ambient reflectance
    pub ambient: Color,
    /// Diffuse reflectance; alpha is the per-draw opacity
    pub diffuse: Color,
    /// Specular reflectance
    pub specular: Color,
    /// Specular exponent
    pub shininess: f32,
}

/// HUD font sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Regular HUD text
    Default,
    /// Secondary lines and long names
    Small,
}

/// Main rendering backend trait
pub trait RenderBackend {
    /// Upload triangulated vertex data; the backend takes ownership of it
    ///
    /// # Errors
    ///
    /// [`RenderError::ResourceCreation`] if the buffer cannot be created.
    fn create_vertex_buffer(&mut self, vertices: Vec<Vertex>) -> BackendResult<VertexBufferHandle>;

    /// Free a vertex buffer
    fn release_vertex_buffer(&mut self, handle: VertexBufferHandle);

    /// Upload an image as a texture split into a `columns` x `rows` sprite grid
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidTexture`] for unusable images or grids.
    fn create_texture(&mut self, image: &ImageData, columns: u32, rows: u32) -> BackendResult<Texture>;

    /// Free a texture
    fn release_texture(&mut self, handle: TextureHandle);

    /// Screen size in pixels
    fn screen_size(&self) -> Vec2;

    /// World position the camera is centred on
    fn camera_position(&self) -> Vec2;

    /// Current camera zoom factor
    fn camera_zoom(&self) -> f32;

    /// Whether fixed-function lighting is on
    fn lighting_enabled(&self) -> bool;

    /// Save transform, texture binding, depth test and colour state
    fn push_state(&mut self);

    /// Restore the state saved by the matching [`RenderBackend::push_state`]
    fn pop_state(&mut self);

    /// Replace the current model transform
    fn set_model_matrix(&mut self, model: &Mat4);

    /// Bind a vertex buffer for the next draw
    fn bind_vertex_buffer(&mut self, handle: VertexBufferHandle, layout: &VertexLayout);

    /// Set lighting material parameters
    fn set_lighting_material(&mut self, material: &MaterialParams);

    /// Set a flat draw colour
    fn set_color(&mut self, color: Color);

    /// Bind a 2D texture for the next draw
    fn bind_texture(&mut self, handle: TextureHandle);

    /// Enable or disable depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Draw `count` vertices of the bound buffer as triangles
    fn draw_triangles(&mut self, first: u32, count: u32);

    /// Draw a whole texture with its bottom-left corner at a screen position
    fn blit_static(&mut self, texture: &Texture, position: Vec2, color: Option<Color>);

    /// Draw one sprite cell centred on a world position
    fn blit_sprite(&mut self, texture: &Texture, world_position: Vec2, column: u32, row: u32, color: Color);

    /// Fill a quad given in screen pixels
    fn fill_quad(&mut self, corners: [Vec2; 4], color: Color);

    /// Draw single-pixel points in screen pixels
    fn draw_points(&mut self, points: &[Vec2], color: Color);

    /// Print text with its baseline start at a screen position
    fn print(&mut self, font: Font, position: Vec2, color: Option<Color>, text: &str);

    /// Print text centred inside `width` pixels starting at `position.x`
    fn print_mid(&mut self, font: Font, width: f32, position: Vec2, color: Option<Color>, text: &str);

    /// Rendered width of `text`
    fn text_width(&self, font: Font, text: &str) -> f32;

    /// Line height of a font
    fn font_height(&self, font: Font) -> f32;
}

/// Scoped backend state: pushes on creation and pops when dropped.
///
/// Every exit path out of a draw, including `?` and early returns, restores
/// the state the caller had.
pub struct StateGuard<'a> {
    backend: &'a mut dyn RenderBackend,
}

impl<'a> StateGuard<'a> {
    /// Push backend state for the lifetime of the guard
    pub fn new(backend: &'a mut dyn RenderBackend) -> Self {
        backend.push_state();
        Self { backend }
    }
}

impl<'a> Deref for StateGuard<'a> {
    type Target = dyn RenderBackend + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.backend
    }
}

impl<'a> DerefMut for StateGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.backend
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.backend.pop_state();
    }
}
