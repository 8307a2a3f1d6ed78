//! Materials for loaded models
//!
//! A [`Material`] is immutable once its library has been parsed. Opacity
//! changes such as cloaking fades are passed per draw to
//! [`Material::params`] instead of being written back into the record.

pub mod mtl_parser;

pub use mtl_parser::{MtlParser, MtlError, MtlKeyword};

use crate::render::{Color, MaterialParams, RenderBackend, Texture};

/// Surface properties shared by the meshes of one object
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Name used by `usemtl`
    pub name: String,
    /// Ambient colour (`Ka`), alpha 1
    pub ambient: Color,
    /// Diffuse colour (`Kd`), alpha 1
    pub diffuse: Color,
    /// Specular colour (`Ks`), alpha 1
    pub specular: Color,
    /// Specular exponent (`Ns`)
    pub shininess: f32,
    /// Index of refraction (`Ni`); parsed, not used for drawing
    pub refraction_index: f32,
    /// Dissolve (`d`)
    pub opacity: f32,
    /// Diffuse map (`map_Kd`)
    pub texture: Option<Texture>,
}

impl Material {
    /// Black, opaque, untextured material
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [0.0, 0.0, 0.0, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            shininess: 0.0,
            refraction_index: 1.0,
            opacity: 1.0,
            texture: None,
        }
    }

    /// Whether a diffuse map is bound when drawing
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Lighting parameters for one draw, diffuse alpha replaced by `alpha`
    pub fn params(&self, alpha: f32) -> MaterialParams {
        let mut diffuse = self.diffuse;
        diffuse[3] = alpha;
        MaterialParams {
            ambient: self.ambient,
            diffuse,
            specular: self.specular,
            shininess: self.shininess,
        }
    }

    /// Free the texture, if any
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(texture) = self.texture.take() {
            backend.release_texture(texture.handle);
        }
    }
}
