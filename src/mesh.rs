//! OBJ mesh loading into the scene data model.
//!
//! Out-of-scope as a general-purpose parser (see crate docs); this is a
//! convenience constructor so a [`SceneData`] can be built from a file
//! without an external collaborator, via the `tobj` crate.

use std::fmt;

use crate::math::vec3::Vec3;
use crate::scene::{Polygon, SceneData, TexCoord};

#[derive(Debug)]
pub enum LoadError {
    Tobj(tobj::LoadError),
    NoModels,
    NoVertices,
    InvalidFaces,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Tobj(e) => write!(f, "failed to load OBJ: {}", e),
            LoadError::NoModels => write!(f, "OBJ file contains no models"),
            LoadError::NoVertices => write!(f, "mesh has no vertices"),
            LoadError::InvalidFaces => write!(f, "face indices not divisible by 3"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Tobj(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tobj::LoadError> for LoadError {
    fn from(e: tobj::LoadError) -> Self {
        LoadError::Tobj(e)
    }
}

/// Load the first model in a Wavefront OBJ file into a [`SceneData`].
///
/// Per-vertex normals are taken from the file when present; otherwise flat
/// per-face normals are synthesized so shading models that require normals
/// still have something to interpolate. Texture coordinates are carried
/// through when present and left empty otherwise.
pub fn load_obj(file_path: &str) -> Result<SceneData, LoadError> {
    let (models, _materials) = tobj::load_obj(file_path, &tobj::GPU_LOAD_OPTIONS)?;
    let model = models.into_iter().next().ok_or(LoadError::NoModels)?;
    let mesh = model.mesh;

    if mesh.positions.is_empty() {
        return Err(LoadError::NoVertices);
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(LoadError::InvalidFaces);
    }

    let vertices: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect();

    let vertex_textures: Vec<TexCoord> = mesh
        .texcoords
        .chunks_exact(2)
        .map(|c| TexCoord::new(c[0], c[1], 0.0))
        .collect();

    let has_normals = !mesh.normals.is_empty();
    let file_normals: Vec<Vec3> = mesh
        .normals
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect();

    let face_indices: Vec<[usize; 3]> = mesh
        .indices
        .chunks_exact(3)
        .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
        .collect();

    let (vertex_normals, polygons) = if has_normals {
        let polygons = face_indices
            .iter()
            .map(|&[a, b, c]| Polygon::new(vec![a, b, c], vec![], vec![a, b, c]))
            .collect();
        (file_normals, polygons)
    } else {
        // Synthesize one flat normal per face, indexed by face position.
        let mut normals = Vec::with_capacity(face_indices.len());
        let mut polygons = Vec::with_capacity(face_indices.len());
        for (face_idx, &[a, b, c]) in face_indices.iter().enumerate() {
            let edge_a = vertices[b] - vertices[a];
            let edge_b = vertices[c] - vertices[a];
            let normal = edge_a.cross(edge_b).normalize();
            normals.push(normal);
            polygons.push(Polygon::new(vec![a, b, c], vec![], vec![face_idx; 3]));
        }
        (normals, polygons)
    };

    Ok(SceneData::new(
        vertices,
        vertex_normals,
        vertex_textures,
        polygons,
    ))
}

pub(crate) const N_CUBE_VERTICES: usize = 8;
pub(crate) const N_CUBE_FACES: usize = 12;

pub(crate) const CUBE_VERTICES: [Vec3; N_CUBE_VERTICES] = [
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
];

pub(crate) const CUBE_FACE_INDICES: [[usize; 3]; N_CUBE_FACES] = [
    [0, 1, 2],
    [0, 2, 3],
    [3, 2, 4],
    [3, 4, 5],
    [5, 4, 6],
    [5, 6, 7],
    [7, 6, 1],
    [7, 1, 0],
    [1, 6, 4],
    [1, 4, 2],
    [5, 7, 0],
    [5, 0, 3],
];

/// Build a unit cube scene, used as a fixture for property tests and benchmarks.
pub fn cube_scene() -> SceneData {
    let vertices = CUBE_VERTICES.to_vec();
    let polygons = CUBE_FACE_INDICES
        .iter()
        .map(|&[a, b, c]| Polygon::new(vec![a, b, c], vec![], vec![a, b, c]))
        .collect();
    let vertex_normals = CUBE_VERTICES.iter().map(|v| v.normalize()).collect();

    SceneData::new(vertices, vertex_normals, vec![], polygons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_scene_has_twelve_triangles() {
        let scene = cube_scene();
        assert_eq!(scene.polygons.len(), N_CUBE_FACES);
        assert!(scene.polygons.iter().all(Polygon::is_triangle));
    }
}
