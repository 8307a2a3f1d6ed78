//! MTL (Material Template Library) file parser
//!
//! Supports the subset used by ship models: `newmtl`, `Ns`, `Ni`, `d`,
//! `Ka`, `Kd`, `Ks` and `map_Kd` without options. Unknown directives are
//! logged and skipped; anything malformed aborts the whole library.

use std::path::{Path, PathBuf};
use std::str::SplitWhitespace;
use thiserror::Error;

use crate::assets::{directive_lines, sibling_path, AssetError, AssetSource, ImageData, LineError};
use crate::render::{RenderBackend, RenderError};
use super::Material;

/// Directive keywords understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtlKeyword {
    /// `newmtl`
    NewMaterial,
    /// `Ns`
    Shininess,
    /// `Ni`
    RefractionIndex,
    /// `d`
    Opacity,
    /// `Ka`
    Ambient,
    /// `Kd`
    Diffuse,
    /// `Ks`
    Specular,
    /// `map_Kd`
    DiffuseMap,
    /// Any token starting with `#`
    Comment,
    /// Anything else
    Unknown,
}

impl MtlKeyword {
    /// Classify the first token of a line
    pub fn parse(token: &str) -> Self {
        match token {
            "newmtl" => Self::NewMaterial,
            "Ns" => Self::Shininess,
            "Ni" => Self::RefractionIndex,
            "d" => Self::Opacity,
            "Ka" => Self::Ambient,
            "Kd" => Self::Diffuse,
            "Ks" => Self::Specular,
            "map_Kd" => Self::DiffuseMap,
            t if t.starts_with('#') => Self::Comment,
            _ => Self::Unknown,
        }
    }
}

/// Material library errors. All of them abort the load.
#[derive(Error, Debug)]
pub enum MtlError {
    /// Library or texture file could not be read
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Line too long or unterminated
    #[error("{}: {source}", .path.display())]
    Line {
        /// Library path
        path: PathBuf,
        /// What was wrong with the line
        source: LineError,
    },

    /// Bad or missing directive arguments
    #[error("{}:{line}: {message}", .path.display())]
    Syntax {
        /// Library path
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Description
        message: String,
    },

    /// Property directive before any `newmtl`
    #[error("{}:{line}: {keyword} before any newmtl", .path.display())]
    NoCurrentMaterial {
        /// Library path
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Offending directive
        keyword: String,
    },

    /// `map_Kd` with option flags
    #[error("{}:{line}: options not supported for map_Kd", .path.display())]
    TextureOptions {
        /// Library path
        path: PathBuf,
        /// 1-based line number
        line: usize,
    },

    /// Backend rejected a texture
    #[error("texture {}: {source}", .path.display())]
    Texture {
        /// Texture path
        path: PathBuf,
        /// Backend error
        source: RenderError,
    },
}

/// MTL file parser
pub struct MtlParser<'a> {
    source: &'a dyn AssetSource,
    path: &'a Path,
}

impl<'a> MtlParser<'a> {
    /// Read the library at `path` and append its materials to `materials`.
    ///
    /// Several libraries may feed the same list. Textures are uploaded as
    /// they are met and stored on their material immediately, so on error
    /// the caller releases everything in `materials`, including partial
    /// entries from this file. Returns the number of materials added.
    ///
    /// # Errors
    ///
    /// Fails on a missing file, a bad line, wrong argument counts, a property
    /// before `newmtl`, texture options, or a texture that cannot be loaded.
    pub fn parse_file(
        source: &'a dyn AssetSource,
        backend: &mut dyn RenderBackend,
        path: &'a Path,
        materials: &mut Vec<Material>,
    ) -> Result<usize, MtlError> {
        log::debug!("Loading material from {}", path.display());
        let text = source.read_to_string(path)?;
        Self { source, path }.parse(&text, backend, materials)
    }

    fn parse(
        &self,
        text: &str,
        backend: &mut dyn RenderBackend,
        materials: &mut Vec<Material>,
    ) -> Result<usize, MtlError> {
        let first_new = materials.len();

        for entry in directive_lines(text) {
            let (line, content) = entry.map_err(|source| MtlError::Line {
                path: self.path.to_path_buf(),
                source,
            })?;

            let mut tokens = content.split_whitespace();
            let Some(token) = tokens.next() else {
                continue;
            };

            let keyword = MtlKeyword::parse(token);
            match keyword {
                MtlKeyword::Comment => continue,
                MtlKeyword::Unknown => {
                    log::warn!("{}:{}: can't understand token {}", self.path.display(), line, token);
                    continue;
                }
                MtlKeyword::NewMaterial => {
                    let name = tokens.next().ok_or_else(|| self.syntax(line, "newmtl missing material name"))?;
                    log::debug!("Reading new material {}", name);
                    materials.push(Material::new(name));
                    continue;
                }
                _ => {}
            }

            // Properties apply to the latest material of this file only
            if materials.len() == first_new {
                return Err(MtlError::NoCurrentMaterial {
                    path: self.path.to_path_buf(),
                    line,
                    keyword: token.to_string(),
                });
            }
            let Some(current) = materials.last_mut() else {
                continue;
            };

            match keyword {
                MtlKeyword::Shininess => current.shininess = self.parse_floats::<1>(line, token, tokens)?[0],
                MtlKeyword::RefractionIndex => {
                    current.refraction_index = self.parse_floats::<1>(line, token, tokens)?[0];
                }
                MtlKeyword::Opacity => current.opacity = self.parse_floats::<1>(line, token, tokens)?[0],
                MtlKeyword::Ambient => current.ambient = self.parse_color(line, token, tokens)?,
                MtlKeyword::Diffuse => current.diffuse = self.parse_color(line, token, tokens)?,
                MtlKeyword::Specular => current.specular = self.parse_color(line, token, tokens)?,
                MtlKeyword::DiffuseMap => {
                    let file = tokens.next().ok_or_else(|| self.syntax(line, "map_Kd missing texture path"))?;
                    if file.starts_with('-') {
                        return Err(MtlError::TextureOptions { path: self.path.to_path_buf(), line });
                    }

                    let texture_path = sibling_path(self.path, file);
                    let image = ImageData::from_source(self.source, &texture_path)?;
                    let texture = backend
                        .create_texture(&image, 1, 1)
                        .map_err(|source| MtlError::Texture { path: texture_path, source })?;

                    if let Some(previous) = current.texture.replace(texture) {
                        backend.release_texture(previous.handle);
                    }
                }
                MtlKeyword::NewMaterial | MtlKeyword::Comment | MtlKeyword::Unknown => {}
            }
        }

        Ok(materials.len() - first_new)
    }

    /// Parse exactly `N` floats
    fn parse_floats<const N: usize>(
        &self,
        line: usize,
        keyword: &str,
        tokens: SplitWhitespace<'_>,
    ) -> Result<[f32; N], MtlError> {
        let mut values = [0.0; N];
        let mut count = 0;
        for token in tokens {
            if count == N {
                return Err(self.syntax(line, &format!("{} expects {} values", keyword, N)));
            }
            values[count] = token
                .parse()
                .map_err(|_| self.syntax(line, &format!("{} invalid float value '{}'", keyword, token)))?;
            count += 1;
        }
        if count != N {
            return Err(self.syntax(line, &format!("{} expects {} values, got {}", keyword, N, count)));
        }
        Ok(values)
    }

    /// Parse an RGB triple as an opaque colour
    fn parse_color(
        &self,
        line: usize,
        keyword: &str,
        tokens: SplitWhitespace<'_>,
    ) -> Result<[f32; 4], MtlError> {
        let [r, g, b] = self.parse_floats::<3>(line, keyword, tokens)?;
        Ok([r, g, b, 1.0])
    }

    fn syntax(&self, line: usize, message: &str) -> MtlError {
        MtlError::Syntax {
            path: self.path.to_path_buf(),
            line,
            message: message.to_string(),
        }
    }
}
