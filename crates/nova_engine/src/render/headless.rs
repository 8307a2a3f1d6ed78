//! Headless rendering backend
//!
//! Keeps uploaded resources in slot maps and records every draw call as a
//! [`DrawCommand`]. Used by the asset inspector and by renderer tests, which
//! assert on the recorded command stream.

use slotmap::{DefaultKey, Key, KeyData, SlotMap};

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec2};
use super::backend::{
    BackendResult, Font, MaterialParams, RenderBackend, Texture, TextureHandle, VertexBufferHandle,
    VertexLayout,
};
use super::{Color, RenderError, Vertex};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// State pushed
    PushState,
    /// State popped
    PopState,
    /// Model transform replaced
    SetModelMatrix(Mat4),
    /// Vertex buffer bound
    BindVertexBuffer {
        /// Buffer bound
        handle: VertexBufferHandle,
        /// Layout used for the binding
        layout: VertexLayout,
    },
    /// Lighting material set
    SetLightingMaterial(MaterialParams),
    /// Flat colour set
    SetColor(Color),
    /// Texture bound
    BindTexture(TextureHandle),
    /// Depth test toggled
    SetDepthTest(bool),
    /// Triangles drawn from the bound buffer
    DrawTriangles {
        /// First vertex
        first: u32,
        /// Vertex count
        count: u32,
    },
    /// Screen-space texture blit
    BlitStatic {
        /// Texture drawn
        texture: TextureHandle,
        /// Bottom-left corner
        position: Vec2,
        /// Optional tint
        color: Option<Color>,
    },
    /// World-space sprite blit
    BlitSprite {
        /// Sprite sheet
        texture: TextureHandle,
        /// Sprite centre in world space
        world_position: Vec2,
        /// Sheet column
        column: u32,
        /// Sheet row
        row: u32,
        /// Tint
        color: Color,
    },
    /// Filled quad
    FillQuad {
        /// Corners in drawing order
        corners: [Vec2; 4],
        /// Fill colour
        color: Color,
    },
    /// Points
    Points {
        /// Point positions
        points: Vec<Vec2>,
        /// Point colour
        color: Color,
    },
    /// Text, left-aligned or centred
    Text {
        /// Font used
        font: Font,
        /// Start position after centring
        position: Vec2,
        /// Colour, `None` for the default text colour
        color: Option<Color>,
        /// Text printed
        text: String,
    },
}

struct VertexBufferEntry {
    vertices: Vec<Vertex>,
}

/// Recording backend with configurable screen and camera
pub struct HeadlessBackend {
    screen_size: Vec2,
    camera_position: Vec2,
    camera_zoom: f32,
    lighting: bool,
    default_font_height: f32,
    small_font_height: f32,
    vertex_buffers: SlotMap<DefaultKey, VertexBufferEntry>,
    textures: SlotMap<DefaultKey, (u32, u32)>,
    uploaded_bytes: usize,
    state_depth: usize,
    max_state_depth: usize,
    commands: Vec<DrawCommand>,
}

impl HeadlessBackend {
    /// Create a backend with the given screen size, camera at the origin
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            screen_size: Vec2::new(width, height),
            camera_position: Vec2::zeros(),
            camera_zoom: 1.0,
            lighting: true,
            default_font_height: 12.0,
            small_font_height: 10.0,
            vertex_buffers: SlotMap::new(),
            textures: SlotMap::new(),
            uploaded_bytes: 0,
            state_depth: 0,
            max_state_depth: 0,
            commands: Vec::new(),
        }
    }

    /// Move the camera
    pub fn set_camera(&mut self, position: Vec2, zoom: f32) {
        self.camera_position = position;
        self.camera_zoom = zoom;
    }

    /// Toggle fixed-function lighting
    pub fn set_lighting(&mut self, enabled: bool) {
        self.lighting = enabled;
    }

    /// Override the font line heights
    pub fn set_font_heights(&mut self, default: f32, small: f32) {
        self.default_font_height = default;
        self.small_font_height = small;
    }

    /// Commands recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the log empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Printed strings in drawing order
    pub fn printed_text(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Current push depth; zero when every push was popped
    pub fn state_depth(&self) -> usize {
        self.state_depth
    }

    /// Deepest push depth reached
    pub fn max_state_depth(&self) -> usize {
        self.max_state_depth
    }

    /// Live vertex buffers
    pub fn vertex_buffer_count(&self) -> usize {
        self.vertex_buffers.len()
    }

    /// Live textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Total vertex bytes uploaded since creation
    pub fn uploaded_bytes(&self) -> usize {
        self.uploaded_bytes
    }

    /// Contents of a live vertex buffer
    pub fn vertex_buffer(&self, handle: VertexBufferHandle) -> Option<&[Vertex]> {
        self.vertex_buffers
            .get(KeyData::from_ffi(handle.0).into())
            .map(|entry| entry.vertices.as_slice())
    }

    fn record(&mut self, command: DrawCommand) {
        log::trace!("{:?}", command);
        self.commands.push(command);
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_vertex_buffer(&mut self, vertices: Vec<Vertex>) -> BackendResult<VertexBufferHandle> {
        if vertices.is_empty() {
            return Err(RenderError::ResourceCreation("empty vertex buffer".to_string()));
        }
        self.uploaded_bytes += Vertex::as_bytes(&vertices).len();
        let key = self.vertex_buffers.insert(VertexBufferEntry { vertices });
        Ok(VertexBufferHandle(key.data().as_ffi()))
    }

    fn release_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        if self.vertex_buffers.remove(KeyData::from_ffi(handle.0).into()).is_none() {
            log::warn!("Releasing unknown vertex buffer {:?}", handle);
        }
    }

    fn create_texture(&mut self, image: &ImageData, columns: u32, rows: u32) -> BackendResult<Texture> {
        if image.width == 0 || image.height == 0 {
            return Err(RenderError::InvalidTexture(format!(
                "{}x{} image",
                image.width, image.height
            )));
        }
        if columns == 0 || rows == 0 {
            return Err(RenderError::InvalidTexture(format!("{}x{} sprite grid", columns, rows)));
        }

        let key = self.textures.insert((image.width, image.height));
        Ok(Texture {
            handle: TextureHandle(key.data().as_ffi()),
            width: image.width as f32,
            height: image.height as f32,
            columns,
            rows,
        })
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(KeyData::from_ffi(handle.0).into()).is_none() {
            log::warn!("Releasing unknown texture {:?}", handle);
        }
    }

    fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    fn camera_position(&self) -> Vec2 {
        self.camera_position
    }

    fn camera_zoom(&self) -> f32 {
        self.camera_zoom
    }

    fn lighting_enabled(&self) -> bool {
        self.lighting
    }

    fn push_state(&mut self) {
        self.state_depth += 1;
        self.max_state_depth = self.max_state_depth.max(self.state_depth);
        self.record(DrawCommand::PushState);
    }

    fn pop_state(&mut self) {
        if self.state_depth == 0 {
            log::error!("pop_state without matching push_state");
        } else {
            self.state_depth -= 1;
        }
        self.record(DrawCommand::PopState);
    }

    fn set_model_matrix(&mut self, model: &Mat4) {
        self.record(DrawCommand::SetModelMatrix(*model));
    }

    fn bind_vertex_buffer(&mut self, handle: VertexBufferHandle, layout: &VertexLayout) {
        self.record(DrawCommand::BindVertexBuffer { handle, layout: *layout });
    }

    fn set_lighting_material(&mut self, material: &MaterialParams) {
        self.record(DrawCommand::SetLightingMaterial(*material));
    }

    fn set_color(&mut self, color: Color) {
        self.record(DrawCommand::SetColor(color));
    }

    fn bind_texture(&mut self, handle: TextureHandle) {
        self.record(DrawCommand::BindTexture(handle));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.record(DrawCommand::SetDepthTest(enabled));
    }

    fn draw_triangles(&mut self, first: u32, count: u32) {
        self.record(DrawCommand::DrawTriangles { first, count });
    }

    fn blit_static(&mut self, texture: &Texture, position: Vec2, color: Option<Color>) {
        self.record(DrawCommand::BlitStatic { texture: texture.handle, position, color });
    }

    fn blit_sprite(&mut self, texture: &Texture, world_position: Vec2, column: u32, row: u32, color: Color) {
        self.record(DrawCommand::BlitSprite {
            texture: texture.handle,
            world_position,
            column,
            row,
            color,
        });
    }

    fn fill_quad(&mut self, corners: [Vec2; 4], color: Color) {
        self.record(DrawCommand::FillQuad { corners, color });
    }

    fn draw_points(&mut self, points: &[Vec2], color: Color) {
        self.record(DrawCommand::Points { points: points.to_vec(), color });
    }

    fn print(&mut self, font: Font, position: Vec2, color: Option<Color>, text: &str) {
        self.record(DrawCommand::Text { font, position, color, text: text.to_string() });
    }

    fn print_mid(&mut self, font: Font, width: f32, position: Vec2, color: Option<Color>, text: &str) {
        let offset = ((width - self.text_width(font, text)) / 2.0).max(0.0);
        self.print(font, Vec2::new(position.x + offset, position.y), color, text);
    }

    fn text_width(&self, font: Font, text: &str) -> f32 {
        0.6 * self.font_height(font) * text.chars().count() as f32
    }

    fn font_height(&self, font: Font) -> f32 {
        match font {
            Font::Default => self.default_font_height,
            Font::Small => self.small_font_height,
        }
    }
}
