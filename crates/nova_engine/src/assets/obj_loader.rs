//! OBJ file loader for ship models
//!
//! Reads the triangulated subset of Wavefront OBJ (`mtllib`, `o`, `v`, `vt`,
//! `f` with `v/t` corners, `usemtl`). Each `o` or `usemtl` boundary closes the
//! mesh in progress, so an [`Object`] is an ordered list of named meshes that
//! each use exactly one material.

use std::path::{Path, PathBuf};
use std::str::SplitWhitespace;
use thiserror::Error;

use crate::assets::{directive_lines, sibling_path, AssetError, AssetSource, LineError};
use crate::assets::materials::{Material, MtlError, MtlParser};
use crate::render::{RenderBackend, RenderError, Vertex, VertexBufferHandle};

/// A run of triangles sharing a name and a material
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Part name from the last `o` directive
    pub name: String,
    /// Backend buffer holding the triangle corners
    pub vertex_buffer: VertexBufferHandle,
    /// Number of corners (three per triangle)
    pub num_corners: u32,
    /// Index into the owning object's materials
    pub material: usize,
}

impl Mesh {
    /// Create a mesh record
    pub fn new(name: impl Into<String>, vertex_buffer: VertexBufferHandle, num_corners: u32, material: usize) -> Self {
        Self {
            name: name.into(),
            vertex_buffer,
            num_corners,
            material,
        }
    }
}

/// A loaded model: meshes in file order plus the materials they use.
///
/// Every mesh's material index is valid for [`Object::materials`].
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
}

impl Object {
    /// Assemble an object from already uploaded parts
    pub(crate) fn from_parts(meshes: Vec<Mesh>, materials: Vec<Material>) -> Self {
        debug_assert!(meshes.iter().all(|mesh| mesh.material < materials.len()));
        Self { meshes, materials }
    }

    /// Meshes in the order their boundaries appeared in the file
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Materials in library order
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// First mesh called `name`. Later meshes with the same name are shadowed.
    pub fn find_mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }

    /// Material of a mesh
    pub fn mesh_material(&self, mesh: &Mesh) -> &Material {
        &self.materials[mesh.material]
    }

    /// Free every vertex buffer and texture owned by the object
    pub fn release(self, backend: &mut dyn RenderBackend) {
        release_parts(backend, self.meshes, self.materials);
    }
}

fn release_parts(backend: &mut dyn RenderBackend, meshes: Vec<Mesh>, mut materials: Vec<Material>) {
    for mesh in meshes {
        backend.release_vertex_buffer(mesh.vertex_buffer);
    }
    for material in &mut materials {
        material.release(backend);
    }
}

/// Directive keywords understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKeyword {
    /// `mtllib`
    MaterialLibrary,
    /// `o`
    Object,
    /// `v`
    Vertex,
    /// `vt`
    TexCoord,
    /// `f`
    Face,
    /// `usemtl`
    UseMaterial,
    /// Any token starting with `#`
    Comment,
    /// Anything else
    Unknown,
}

impl ObjKeyword {
    /// Classify the first token of a line
    pub fn parse(token: &str) -> Self {
        match token {
            "mtllib" => Self::MaterialLibrary,
            "o" => Self::Object,
            "v" => Self::Vertex,
            "vt" => Self::TexCoord,
            "f" => Self::Face,
            "usemtl" => Self::UseMaterial,
            t if t.starts_with('#') => Self::Comment,
            _ => Self::Unknown,
        }
    }
}

/// Object loading errors. All of them abort the load.
#[derive(Error, Debug)]
pub enum ObjError {
    /// Object file could not be read
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// A material library failed
    #[error(transparent)]
    Material(#[from] MtlError),

    /// Line too long or unterminated
    #[error("{}: {source}", .path.display())]
    Line {
        /// Object path
        path: PathBuf,
        /// What was wrong with the line
        source: LineError,
    },

    /// Bad or missing directive arguments
    #[error("{}:{line}: {message}", .path.display())]
    Syntax {
        /// Object path
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Description
        message: String,
    },

    /// Face that is not a triangle
    #[error("{}:{line}: face has {count} corners, expected 3", .path.display())]
    FaceArity {
        /// Object path
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Corners found
        count: usize,
    },

    /// Face index outside what has been declared so far
    #[error("{}:{line}: {kind} index {index} out of range 1..={declared}", .path.display())]
    IndexOutOfRange {
        /// Object path
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// `vertex` or `texture`
        kind: &'static str,
        /// Index as written
        index: i64,
        /// Entries declared before the face
        declared: usize,
    },

    /// `usemtl` naming a material no library defined
    #[error("{}:{line}: no such material {name}", .path.display())]
    UnknownMaterial {
        /// Object path
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Requested name
        name: String,
    },

    /// Faces before any `o`
    #[error("{}:{line}: faces without an object name", .path.display())]
    UnnamedMesh {
        /// Object path
        path: PathBuf,
        /// 1-based line number of the closing boundary
        line: usize,
    },

    /// Faces before any `usemtl`
    #[error("{}:{line}: mesh {name} has no material", .path.display())]
    NoMaterial {
        /// Object path
        path: PathBuf,
        /// 1-based line number of the closing boundary
        line: usize,
        /// Mesh name
        name: String,
    },

    /// Backend rejected a vertex buffer
    #[error("{}: vertex buffer for {name}: {source}", .path.display())]
    Buffer {
        /// Object path
        path: PathBuf,
        /// Mesh name
        name: String,
        /// Backend error
        source: RenderError,
    },
}

/// Accumulates corners and closes them into meshes at each boundary
#[derive(Debug, Default)]
struct MeshBuilder {
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    corners: Vec<Vertex>,
    name: Option<String>,
    material: Option<usize>,
    meshes: Vec<Mesh>,
}

impl MeshBuilder {
    /// Close the mesh in progress. Nothing happens when no faces are pending.
    fn flush(&mut self, backend: &mut dyn RenderBackend, path: &Path, line: usize) -> Result<(), ObjError> {
        if self.corners.is_empty() {
            return Ok(());
        }
        let Some(name) = self.name.clone() else {
            return Err(ObjError::UnnamedMesh { path: path.to_path_buf(), line });
        };
        let Some(material) = self.material else {
            return Err(ObjError::NoMaterial { path: path.to_path_buf(), line, name });
        };

        let corners = std::mem::take(&mut self.corners);
        let num_corners = corners.len() as u32;
        let vertex_buffer = backend.create_vertex_buffer(corners).map_err(|source| ObjError::Buffer {
            path: path.to_path_buf(),
            name: name.clone(),
            source,
        })?;

        log::trace!("Mesh {} with {} corners, material {}", name, num_corners, material);
        self.meshes.push(Mesh::new(name, vertex_buffer, num_corners, material));
        Ok(())
    }
}

/// OBJ model loader
pub struct ObjLoader<'a> {
    source: &'a dyn AssetSource,
    path: &'a Path,
}

impl<'a> ObjLoader<'a> {
    /// Load the object at `path`, uploading its meshes and textures.
    ///
    /// Material libraries are resolved next to the object file. On error
    /// every buffer and texture created so far is released again.
    ///
    /// # Errors
    ///
    /// Any [`ObjError`]: unreadable files, material library failures,
    /// non-triangle faces, out-of-range indices, unknown materials and meshes
    /// without a name or material.
    pub fn load(
        source: &'a dyn AssetSource,
        backend: &mut dyn RenderBackend,
        path: &'a Path,
    ) -> Result<Object, ObjError> {
        log::debug!("Loading object from {}", path.display());
        let text = source.read_to_string(path)?;

        let loader = Self { source, path };
        let mut builder = MeshBuilder::default();
        let mut materials = Vec::new();

        match loader.parse(&text, backend, &mut builder, &mut materials) {
            Ok(()) => {
                log::debug!(
                    "Loaded {}: {} meshes, {} materials",
                    path.display(),
                    builder.meshes.len(),
                    materials.len()
                );
                Ok(Object::from_parts(builder.meshes, materials))
            }
            Err(e) => {
                release_parts(backend, builder.meshes, materials);
                Err(e)
            }
        }
    }

    fn parse(
        &self,
        text: &str,
        backend: &mut dyn RenderBackend,
        builder: &mut MeshBuilder,
        materials: &mut Vec<Material>,
    ) -> Result<(), ObjError> {
        let mut last_line = 0;

        for entry in directive_lines(text) {
            let (line, content) = entry.map_err(|source| ObjError::Line {
                path: self.path.to_path_buf(),
                source,
            })?;
            last_line = line;

            let mut tokens = content.split_whitespace();
            let Some(token) = tokens.next() else {
                continue;
            };

            match ObjKeyword::parse(token) {
                ObjKeyword::MaterialLibrary => {
                    for library in tokens {
                        let library_path = sibling_path(self.path, library);
                        MtlParser::parse_file(self.source, backend, &library_path, materials)?;
                    }
                }
                ObjKeyword::Object => {
                    builder.flush(backend, self.path, line)?;
                    let name = tokens.next().ok_or_else(|| self.syntax(line, "o missing object name"))?;
                    builder.name = Some(name.to_string());
                }
                ObjKeyword::Vertex => {
                    let [x, y, z] = self.parse_floats::<3>(line, token, tokens)?;
                    builder.positions.push([x, y, z]);
                }
                ObjKeyword::TexCoord => {
                    let uv = self.parse_floats::<2>(line, token, tokens)?;
                    builder.tex_coords.push(uv);
                }
                ObjKeyword::Face => self.parse_face(line, tokens, builder)?,
                ObjKeyword::UseMaterial => {
                    builder.flush(backend, self.path, line)?;
                    let name = tokens.next().ok_or_else(|| self.syntax(line, "usemtl missing material name"))?;
                    let index = materials
                        .iter()
                        .position(|material| material.name == name)
                        .ok_or_else(|| ObjError::UnknownMaterial {
                            path: self.path.to_path_buf(),
                            line,
                            name: name.to_string(),
                        })?;
                    builder.material = Some(index);
                }
                ObjKeyword::Comment => {}
                ObjKeyword::Unknown => {
                    log::warn!("{}:{}: can't understand token {}", self.path.display(), line, token);
                }
            }
        }

        builder.flush(backend, self.path, last_line)
    }

    /// Append one triangle's corners to the pending mesh
    fn parse_face(&self, line: usize, tokens: SplitWhitespace<'_>, builder: &mut MeshBuilder) -> Result<(), ObjError> {
        let mut face = Vec::with_capacity(3);

        for corner in tokens {
            // v/t, anything after a second slash is ignored
            let mut indices = corner.split('/');
            let vertex = self.parse_index(line, indices.next())?;
            let texture = self.parse_index(line, indices.next())?;

            let position = self.lookup(line, "vertex", vertex, &builder.positions)?;
            let tex_coord = self.lookup(line, "texture", texture, &builder.tex_coords)?;
            face.push(Vertex::new(position, tex_coord));
        }

        if face.len() != 3 {
            return Err(ObjError::FaceArity {
                path: self.path.to_path_buf(),
                line,
                count: face.len(),
            });
        }
        builder.corners.extend(face);
        Ok(())
    }

    fn parse_index(&self, line: usize, token: Option<&str>) -> Result<i64, ObjError> {
        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| self.syntax(line, "face corner must be v/t"))?;
        token
            .parse()
            .map_err(|_| self.syntax(line, &format!("invalid face index '{}'", token)))
    }

    /// Resolve a 1-based index against entries declared so far
    fn lookup<T: Copy>(&self, line: usize, kind: &'static str, index: i64, declared: &[T]) -> Result<T, ObjError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| declared.get(i).copied())
            .ok_or_else(|| ObjError::IndexOutOfRange {
                path: self.path.to_path_buf(),
                line,
                kind,
                index,
                declared: declared.len(),
            })
    }

    /// Parse exactly `N` floats
    fn parse_floats<const N: usize>(
        &self,
        line: usize,
        keyword: &str,
        tokens: SplitWhitespace<'_>,
    ) -> Result<[f32; N], ObjError> {
        let values = tokens
            .map(|token| {
                token
                    .parse::<f32>()
                    .map_err(|_| self.syntax(line, &format!("{} invalid float value '{}'", keyword, token)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        <[f32; N]>::try_from(values.as_slice()).map_err(|_| {
            self.syntax(line, &format!("{} expects {} values, got {}", keyword, N, values.len()))
        })
    }

    fn syntax(&self, line: usize, message: &str) -> ObjError {
        ObjError::Syntax {
            path: self.path.to_path_buf(),
            line,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirectorySource;
    use crate::render::HeadlessBackend;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const MATERIALS: &str = "newmtl Hull\nKd 0.5 0.5 0.5\nnewmtl Glass\nKd 0 0 1\nd 0.5\n";

    const SQUARE: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
";

    fn fixture(obj: &str) -> TempDir {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("models")).unwrap();
        fs::write(root.path().join("models/ship.mtl"), MATERIALS).unwrap();
        fs::write(root.path().join("models/ship.obj"), obj).unwrap();
        root
    }

    fn load(obj: &str) -> (Result<Object, ObjError>, HeadlessBackend) {
        let root = fixture(obj);
        let source = DirectorySource::new([root.path()]);
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        let result = ObjLoader::load(&source, &mut backend, Path::new("models/ship.obj"));
        (result, backend)
    }

    fn with_header(body: &str) -> String {
        format!("mtllib ship.mtl\n{}{}", SQUARE, body)
    }

    #[test]
    fn test_mesh_materials_match_usemtl() {
        let (result, _) = load(&with_header(
            "o body\nusemtl Hull\nf 1/1 2/2 3/3\nusemtl Glass\nf 1/1 3/3 4/4\no canopy\nf 2/2 3/3 4/4\n",
        ));
        let object = result.unwrap();

        let used: Vec<(&str, &str)> = object
            .meshes()
            .iter()
            .map(|mesh| (mesh.name.as_str(), object.mesh_material(mesh).name.as_str()))
            .collect();
        assert_eq!(used, vec![("body", "Hull"), ("body", "Glass"), ("canopy", "Glass")]);
    }

    #[test]
    fn test_meshes_keep_file_order() {
        let (result, backend) = load(&with_header(
            "usemtl Hull\no wing\nf 1/1 2/2 3/3\no nose\nf 1/1 2/2 3/3\nf 1/1 3/3 4/4\no tail\nf 2/2 3/3 4/4\n",
        ));
        let object = result.unwrap();

        let names: Vec<&str> = object.meshes().iter().map(|mesh| mesh.name.as_str()).collect();
        assert_eq!(names, vec!["wing", "nose", "tail"]);
        assert_eq!(object.meshes()[1].num_corners, 6);
        assert_eq!(backend.vertex_buffer_count(), 3);
    }

    #[test]
    fn test_corner_data_and_third_component_ignored() {
        let (result, backend) = load(&with_header("o hull\nusemtl Hull\nf 2/3/9 3/4 4/1/1\n"));
        let object = result.unwrap();

        let vertices = backend.vertex_buffer(object.meshes()[0].vertex_buffer).unwrap();
        assert_eq!(vertices[0], Vertex::new([1.0, 0.0, 0.0], [1.0, 1.0]));
        assert_eq!(vertices[1], Vertex::new([1.0, 1.0, 0.0], [0.0, 1.0]));
        assert_eq!(vertices[2], Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0]));
    }

    #[test]
    fn test_face_must_be_triangle() {
        let (result, _) = load(&with_header("o hull\nusemtl Hull\nf 1/1 2/2\n"));
        assert!(matches!(result, Err(ObjError::FaceArity { count: 2, .. })));

        let (result, _) = load(&with_header("o hull\nusemtl Hull\nf 1/1 2/2 3/3 4/4\n"));
        assert!(matches!(result, Err(ObjError::FaceArity { count: 4, .. })));
    }

    #[test]
    fn test_face_index_bounds() {
        let (result, _) = load(&with_header("o hull\nusemtl Hull\nf 1/1 2/2 5/3\n"));
        assert!(matches!(
            result,
            Err(ObjError::IndexOutOfRange { kind: "vertex", index: 5, declared: 4, .. })
        ));

        let (result, _) = load(&with_header("o hull\nusemtl Hull\nf 1/0 2/2 3/3\n"));
        assert!(matches!(result, Err(ObjError::IndexOutOfRange { kind: "texture", index: 0, .. })));

        // Only entries declared before the face count
        let (result, _) = load("mtllib ship.mtl\nv 0 0 0\nvt 0 0\no hull\nusemtl Hull\nf 1/1 1/1 2/1\nv 1 1 1\n");
        assert!(matches!(result, Err(ObjError::IndexOutOfRange { index: 2, declared: 1, .. })));
    }

    #[test]
    fn test_back_to_back_usemtl_creates_no_empty_mesh() {
        let (result, _) = load(&with_header("o hull\nusemtl Hull\nusemtl Glass\nusemtl Hull\nf 1/1 2/2 3/3\n"));
        let object = result.unwrap();
        assert_eq!(object.meshes().len(), 1);
        assert_eq!(object.mesh_material(&object.meshes()[0]).name, "Hull");
    }

    #[test]
    fn test_unknown_material_is_fatal() {
        let (result, backend) = load(&with_header("o hull\nusemtl Hull\nf 1/1 2/2 3/3\nusemtl Paint\nf 1/1 2/2 3/3\n"));
        assert!(matches!(result, Err(ObjError::UnknownMaterial { ref name, line: 13, .. }) if name == "Paint"));
        // The hull mesh flushed before the failure is released again
        assert_eq!(backend.vertex_buffer_count(), 0);
    }

    #[test]
    fn test_flush_requires_name_and_material() {
        let (result, _) = load(&with_header("usemtl Hull\nf 1/1 2/2 3/3\n"));
        assert!(matches!(result, Err(ObjError::UnnamedMesh { .. })));

        let (result, _) = load(&with_header("o hull\nf 1/1 2/2 3/3\no fin\n"));
        assert!(matches!(result, Err(ObjError::NoMaterial { ref name, .. }) if name == "hull"));
    }

    #[test]
    fn test_shadowed_part_lookup() {
        let (result, _) = load(&with_header("o hull\nusemtl Hull\nf 1/1 2/2 3/3\nusemtl Glass\nf 1/1 3/3 4/4\n"));
        let object = result.unwrap();
        let found = object.find_mesh("hull").unwrap();
        assert_eq!(object.mesh_material(found).name, "Hull");
        assert!(object.find_mesh("wing").is_none());
    }

    #[test]
    fn test_vertex_needs_three_floats() {
        let (result, _) = load("v 1 2\n");
        assert!(matches!(result, Err(ObjError::Syntax { line: 1, .. })));
    }

    #[test]
    fn test_missing_trailing_newline_is_fatal() {
        let (result, _) = load("o hull\nv 1 2 3");
        assert!(matches!(result, Err(ObjError::Line { source: LineError::Unterminated { line: 2 }, .. })));
    }

    #[test]
    fn test_missing_library_is_fatal() {
        let (result, _) = load("mtllib other.mtl\n");
        assert!(matches!(result, Err(ObjError::Material(MtlError::Asset(AssetError::NotFound(_))))));
    }

    #[test]
    fn test_release_frees_everything() {
        let root = fixture(&with_header("o hull\nusemtl Hull\nf 1/1 2/2 3/3\n"));
        fs::write(root.path().join("models/ship.mtl"), "newmtl Hull\nmap_Kd hull.png\n").unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]))
            .save(root.path().join("models/hull.png"))
            .unwrap();

        let source = DirectorySource::new([root.path()]);
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        let object = ObjLoader::load(&source, &mut backend, Path::new("models/ship.obj")).unwrap();
        assert!(object.materials()[0].has_texture());
        assert_eq!((backend.vertex_buffer_count(), backend.texture_count()), (1, 1));

        object.release(&mut backend);
        assert_eq!((backend.vertex_buffer_count(), backend.texture_count()), (0, 0));
    }

    fn load_with_libraries(obj: &str, libraries: &[(&str, &str)]) -> (Result<Object, ObjError>, HeadlessBackend) {
        let root = fixture(obj);
        for (name, text) in libraries {
            fs::write(root.path().join("models").join(name), text).unwrap();
        }
        image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]))
            .save(root.path().join("models/paint.png"))
            .unwrap();

        let source = DirectorySource::new([root.path()]);
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        let result = ObjLoader::load(&source, &mut backend, Path::new("models/ship.obj"));
        (result, backend)
    }

    #[test]
    fn test_libraries_accumulate_into_one_set() {
        let libraries = [("a.mtl", "newmtl A\nKd 1 0 0\n"), ("b.mtl", "newmtl B\nKd 0 1 0\n")];
        let body = format!("{}o hull\nusemtl B\nf 1/1 2/2 3/3\nusemtl A\nf 1/1 3/3 4/4\n", SQUARE);

        for header in ["mtllib a.mtl b.mtl\n", "mtllib a.mtl\nmtllib b.mtl\n"] {
            let (result, _) = load_with_libraries(&format!("{}{}", header, body), &libraries);
            let object = result.unwrap();

            let names: Vec<&str> = object.materials().iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, vec!["A", "B"]);

            let used: Vec<(usize, &str)> = object
                .meshes()
                .iter()
                .map(|mesh| (mesh.material, object.mesh_material(mesh).name.as_str()))
                .collect();
            assert_eq!(used, vec![(1, "B"), (0, "A")]);
        }
    }

    #[test]
    fn test_failed_second_library_releases_first_textures() {
        let libraries = [("a.mtl", "newmtl A\nmap_Kd paint.png\n"), ("b.mtl", "Kd 1 1 1\nnewmtl B\n")];
        let (result, backend) = load_with_libraries("mtllib a.mtl b.mtl\n", &libraries);

        assert!(matches!(result, Err(ObjError::Material(MtlError::NoCurrentMaterial { .. }))));
        assert_eq!(backend.texture_count(), 0);
        assert_eq!(backend.vertex_buffer_count(), 0);
    }

    #[test]
    fn test_unknown_directive_warns_only() {
        let (result, _) = load(&with_header("s off\ng group\no hull\nusemtl Hull\n# comment\nf 1/1 2/2 3/3\n"));
        assert_eq!(result.unwrap().meshes().len(), 1);
    }
}
