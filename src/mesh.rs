//! Triangle-soup mesh input for the software pipeline.
//!
//! A [`Mesh`] holds three vertices per triangle as homogeneous points,
//! parallel per-vertex normals, and optional texture coordinates. Meshes
//! can be built in memory or loaded from OBJ files.

use std::fmt;
use std::path::Path;

use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;

/// Error loading a mesh from disk.
#[derive(Debug)]
pub enum LoadError {
    /// The OBJ file could not be read or parsed.
    Obj(tobj::LoadError),
    /// The file parsed but contained no triangles.
    Empty,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Obj(e) => write!(f, "failed to load OBJ: {e}"),
            LoadError::Empty => write!(f, "OBJ file contains no triangles"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Obj(e) => Some(e),
            LoadError::Empty => None,
        }
    }
}

impl From<tobj::LoadError> for LoadError {
    fn from(e: tobj::LoadError) -> Self {
        LoadError::Obj(e)
    }
}

/// An ordered triangle list with per-vertex attributes in object space.
///
/// Layout: `vertices[3*i..3*i+3]` are triangle `i`'s corners, with
/// `normals` parallel and `texcoords` either empty or parallel as well.
pub struct Mesh {
    name: String,
    vertices: Vec<Vec4>,
    normals: Vec<Vec4>,
    texcoords: Vec<Vec2>,
    bounding_box_min: Vec3,
    bounding_box_max: Vec3,
}

impl Mesh {
    /// Build a mesh from a triangle soup.
    ///
    /// `normals` must parallel `vertices`; `texcoords` may be empty when the
    /// mesh carries no UVs. The bounding box is computed from the vertices.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec4>,
        normals: Vec<Vec4>,
        texcoords: Vec<Vec2>,
    ) -> Self {
        debug_assert_eq!(vertices.len() % 3, 0);
        debug_assert_eq!(vertices.len(), normals.len());
        debug_assert!(texcoords.is_empty() || texcoords.len() == vertices.len());

        let (bounding_box_min, bounding_box_max) = bounding_box(&vertices);
        Self {
            name: name.into(),
            vertices,
            normals,
            texcoords,
            bounding_box_min,
            bounding_box_max,
        }
    }

    /// Load all objects of an OBJ file into a single triangle soup.
    ///
    /// Faces are triangulated by the loader. Missing normals are replaced by
    /// per-face normals computed from the winding.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let (models, _materials) = tobj::load_obj(
            path.as_ref(),
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )?;

        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut texcoords = Vec::new();
        let mut name = String::new();
        let mut has_texcoords = true;

        for model in &models {
            if name.is_empty() {
                name = model.name.clone();
            }
            let mesh = &model.mesh;
            has_texcoords &= !mesh.texcoords.is_empty();

            for &index in &mesh.indices {
                let i = index as usize;
                vertices.push(Vec4::point(
                    mesh.positions[3 * i],
                    mesh.positions[3 * i + 1],
                    mesh.positions[3 * i + 2],
                ));
                if mesh.normals.is_empty() {
                    normals.push(Vec4::ZERO); // filled in below
                } else {
                    normals.push(Vec4::direction(
                        mesh.normals[3 * i],
                        mesh.normals[3 * i + 1],
                        mesh.normals[3 * i + 2],
                    ));
                }
                if !mesh.texcoords.is_empty() {
                    texcoords.push(Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]));
                }
            }
        }

        if vertices.is_empty() {
            return Err(LoadError::Empty);
        }
        if !has_texcoords {
            texcoords.clear();
        }

        fill_missing_normals(&vertices, &mut normals);

        Ok(Self::new(name, vertices, normals, texcoords))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn vertices(&self) -> &[Vec4] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec4] {
        &self.normals
    }

    /// Per-vertex texture coordinates, empty when the mesh has none.
    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    pub fn bounding_box_min(&self) -> Vec3 {
        self.bounding_box_min
    }

    pub fn bounding_box_max(&self) -> Vec3 {
        self.bounding_box_max
    }
}

fn bounding_box(vertices: &[Vec4]) -> (Vec3, Vec3) {
    let mut min = Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
    let mut max = Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for v in vertices {
        min.x = min.x.min(v.x);
        min.y = min.y.min(v.y);
        min.z = min.z.min(v.z);
        max.x = max.x.max(v.x);
        max.y = max.y.max(v.y);
        max.z = max.z.max(v.z);
    }
    if vertices.is_empty() {
        (Vec3::ZERO, Vec3::ZERO)
    } else {
        (min, max)
    }
}

/// Replace zero normals by the face normal of their triangle.
fn fill_missing_normals(vertices: &[Vec4], normals: &mut [Vec4]) {
    for tri in 0..vertices.len() / 3 {
        let base = 3 * tri;
        if normals[base..base + 3].iter().any(|n| *n != Vec4::ZERO) {
            continue;
        }
        let u = (vertices[base + 1] - vertices[base]).xyz();
        let v = (vertices[base + 2] - vertices[base]).xyz();
        let n = u.cross(v).normalize();
        let n = Vec4::direction(n.x, n.y, n.z);
        normals[base] = n;
        normals[base + 1] = n;
        normals[base + 2] = n;
    }
}
