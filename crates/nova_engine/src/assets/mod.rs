//! Asset management system
//!
//! Everything here is read-only: assets are located through an
//! [`AssetSource`] and parsed once during scene setup.

pub mod obj_loader;
pub mod image_loader;
pub mod materials;

pub use obj_loader::{ObjLoader, ObjError, ObjKeyword, Object, Mesh};
pub use image_loader::ImageData;
pub use materials::{MtlParser, MtlError, MtlKeyword, Material};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Read-only access to game data files.
///
/// Paths handed to a source are relative to the game data root (for example
/// `dat/gui.xml` or `models/ship.obj`).
pub trait AssetSource {
    /// Read a whole file as bytes
    ///
    /// # Errors
    ///
    /// [`AssetError::NotFound`] when no root holds the file, IO errors otherwise.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, AssetError>;

    /// Read a whole file as UTF-8 text
    ///
    /// # Errors
    ///
    /// As [`AssetSource::read_bytes`], plus invalid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, AssetError> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes)
            .map_err(|e| AssetError::InvalidData(format!("{}: {}", path.display(), e)))
    }

    /// Whether the file can be found
    fn exists(&self, path: &Path) -> bool;
}

/// Asset source backed by an ordered list of directories.
///
/// The first root is usually the per-user base path, followed by the
/// installed data directory; the first root holding a file wins.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    search_paths: Vec<PathBuf>,
}

impl DirectorySource {
    /// Create a source from search roots, highest priority first
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Search roots, highest priority first
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Resolve a data-relative path to the first existing file
    pub fn resolve(&self, path: &Path) -> Option<PathBuf> {
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }
        self.search_paths
            .iter()
            .map(|root| root.join(path))
            .find(|candidate| candidate.is_file())
    }
}

impl AssetSource for DirectorySource {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        let full_path = self
            .resolve(path)
            .ok_or_else(|| AssetError::NotFound(path.to_path_buf()))?;

        log::debug!("Reading {:?}", full_path);
        Ok(std::fs::read(&full_path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }
}

/// Join `file` onto the directory holding `sibling`.
///
/// Material libraries are named relative to their object file and textures
/// relative to their material library.
pub fn sibling_path(sibling: &Path, file: &str) -> PathBuf {
    sibling
        .parent()
        .map_or_else(|| PathBuf::from(file), |dir| dir.join(file))
}

/// Longest directive line accepted, newline included
pub const MAX_LINE_LENGTH: usize = 255;

/// Malformed line in a directive-based text file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Line exceeds [`MAX_LINE_LENGTH`]
    #[error("line {line} is longer than {MAX_LINE_LENGTH} bytes")]
    TooLong {
        /// 1-based line number
        line: usize,
    },

    /// Last line lacks its newline
    #[error("line {line} is not terminated by a newline")]
    Unterminated {
        /// 1-based line number
        line: usize,
    },
}

/// Split OBJ/MTL text into `(line_number, line)` pairs.
///
/// Every line, the last one included, must end in `\n` and fit in
/// [`MAX_LINE_LENGTH`] bytes. Returned lines have the line ending removed.
pub(crate) fn directive_lines(text: &str) -> impl Iterator<Item = Result<(usize, &str), LineError>> {
    text.split_inclusive('\n').enumerate().map(|(index, raw)| {
        let line = index + 1;
        if raw.len() > MAX_LINE_LENGTH {
            Err(LineError::TooLong { line })
        } else if let Some(content) = raw.strip_suffix('\n') {
            Ok((line, content.strip_suffix('\r').unwrap_or(content)))
        } else {
            Err(LineError::Unterminated { line })
        }
    })
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(PathBuf),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
