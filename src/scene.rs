//! Scene data model: vertices, normals, texture coordinates and polygons.

use crate::math::vec3::Vec3;

/// A texture coordinate; `w` is carried through but usually ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

impl TexCoord {
    pub const fn new(u: f32, v: f32, w: f32) -> Self {
        Self { u, v, w }
    }
}

/// A face: three parallel index lists into the scene's vertex, texture and
/// normal tables. Always length 3 after quad splitting.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Polygon {
    pub vertex_indices: Vec<usize>,
    pub texture_indices: Vec<usize>,
    pub normal_indices: Vec<usize>,
}

impl Polygon {
    pub fn new(
        vertex_indices: Vec<usize>,
        texture_indices: Vec<usize>,
        normal_indices: Vec<usize>,
    ) -> Self {
        Self {
            vertex_indices,
            texture_indices,
            normal_indices,
        }
    }

    pub fn is_triangle(&self) -> bool {
        self.vertex_indices.len() == 3
    }

    pub fn is_quad(&self) -> bool {
        self.vertex_indices.len() == 4
    }
}

/// Split a quad index list `[i0, i1, i2, i3]` into the two triangles
/// `[i2, i3, i0]` and `[i0, i1, i2]`, per the scene input contract.
fn split_quad_indices(indices: &[usize]) -> (Vec<usize>, Vec<usize>) {
    debug_assert_eq!(indices.len(), 4);
    let (i0, i1, i2, i3) = (indices[0], indices[1], indices[2], indices[3]);
    (vec![i2, i3, i0], vec![i0, i1, i2])
}

/// An immutable-per-frame bundle of scene tables.
#[derive(Clone, Debug, Default)]
pub struct SceneData {
    pub vertices: Vec<Vec3>,
    pub vertex_normals: Vec<Vec3>,
    pub vertex_textures: Vec<TexCoord>,
    pub polygons: Vec<Polygon>,
}

impl SceneData {
    pub fn new(
        vertices: Vec<Vec3>,
        vertex_normals: Vec<Vec3>,
        vertex_textures: Vec<TexCoord>,
        polygons: Vec<Polygon>,
    ) -> Self {
        let mut scene = Self {
            vertices,
            vertex_normals,
            vertex_textures,
            polygons,
        };
        scene.split_quads();
        scene
    }

    /// Split every length-4 polygon into two triangles in place.
    fn split_quads(&mut self) {
        let mut split = Vec::with_capacity(self.polygons.len());
        for polygon in self.polygons.drain(..) {
            if polygon.is_quad() {
                let (first_v, second_v) = split_quad_indices(&polygon.vertex_indices);
                let (first_t, second_t) = if polygon.texture_indices.len() == 4 {
                    split_quad_indices(&polygon.texture_indices)
                } else {
                    (Vec::new(), Vec::new())
                };
                let (first_n, second_n) = if polygon.normal_indices.len() == 4 {
                    split_quad_indices(&polygon.normal_indices)
                } else {
                    (Vec::new(), Vec::new())
                };
                split.push(Polygon::new(first_v, first_t, first_n));
                split.push(Polygon::new(second_v, second_t, second_n));
            } else {
                split.push(polygon);
            }
        }
        self.polygons = split;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_split_into_two_triangles_with_the_documented_reordering() {
        let scene = SceneData::new(
            vec![Vec3::ZERO; 4],
            vec![],
            vec![],
            vec![Polygon::new(vec![0, 1, 2, 3], vec![], vec![])],
        );

        assert_eq!(scene.polygons.len(), 2);
        assert_eq!(scene.polygons[0].vertex_indices, vec![2, 3, 0]);
        assert_eq!(scene.polygons[1].vertex_indices, vec![0, 1, 2]);
    }

    #[test]
    fn triangle_polygons_pass_through_unchanged() {
        let scene = SceneData::new(
            vec![Vec3::ZERO; 3],
            vec![],
            vec![],
            vec![Polygon::new(vec![0, 1, 2], vec![], vec![])],
        );

        assert_eq!(scene.polygons.len(), 1);
        assert_eq!(scene.polygons[0].vertex_indices, vec![0, 1, 2]);
    }
}
