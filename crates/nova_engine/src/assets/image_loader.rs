//! Image loading utilities for texture data

use std::path::Path;
use crate::assets::{AssetError, AssetSource};

/// Loaded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Load an image through an asset source
    ///
    /// # Errors
    ///
    /// Read failures from `source`, or bytes that do not decode.
    pub fn from_source(source: &dyn AssetSource, path: &Path) -> Result<Self, AssetError> {
        log::debug!("Loading image from {:?}", path);

        let bytes = source.read_bytes(path)?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            AssetError::LoadFailed(reason) => {
                AssetError::LoadFailed(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    /// Decode an image held in memory, converting it to RGBA8
    ///
    /// # Errors
    ///
    /// [`AssetError::LoadFailed`] if the format is unknown or corrupt.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to decode image: {}", e)))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::trace!("Decoded image {}x{}", width, height);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let data = color.iter().copied().cycle().take(pixel_count * 4).collect();

        Self { data, width, height }
    }
}
