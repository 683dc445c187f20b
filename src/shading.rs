//! Flat, Lambertian and per-pixel Phong shading over a rasterized triangle.
//!
//! The three models are a closed, tagged-variant enum rather than virtual
//! dispatch through a boxed base class; each variant's `shade_triangle`
//! requests the attribute channels it needs from the interpolator and
//! paints every fill pixel from the result.

use std::rc::Rc;

use crate::interpolation::{
    interpolate_triangle, AttributeChannel, InterpolationRequest, ShadedPixel,
    ViewportPoint,
};
use crate::light::LightSource;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::rasterizer::triangle_fill_points;
use crate::scene::{Polygon, SceneData};
use crate::texture::Texture;

const BLACK: [u8; 4] = [255, 0, 0, 0];
const AMBIENT_LIGHT_COEFF: f32 = 0.22;
const TEXTURE_AMBIENT_LIGHT_COEFF: f32 = 0.95;
const DIFFUSE_LIGHT_COEFF: f32 = 0.35;
const SPECULAR_LIGHT_COEFF: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadingModel {
    NoShading,
    Lambertian,
    Phong,
}

/// Which texturing channels are bound and enabled for the Phong model.
#[derive(Default)]
pub struct TexturingConfig {
    pub diffuse_enabled: bool,
    pub normal_enabled: bool,
    pub specular_enabled: bool,
    pub diffuse_texture: Option<Texture>,
    pub normal_texture: Option<Texture>,
    pub specular_texture: Option<Texture>,
}

impl TexturingConfig {
    fn any_enabled(&self) -> bool {
        self.diffuse_enabled || self.normal_enabled || self.specular_enabled
    }
}

fn polygon_vertices(indices: &[usize], vertices: &[Vec3]) -> [Vec3; 3] {
    [vertices[indices[0]], vertices[indices[1]], vertices[indices[2]]]
}

fn polygon_texture_coords(indices: &[usize], scene: &SceneData) -> [Vec3; 3] {
    let mut coords = [Vec3::ZERO; 3];
    for (i, &index) in indices.iter().enumerate() {
        let tex = scene.vertex_textures[index];
        coords[i] = Vec3::new(tex.u, tex.v, tex.w);
    }
    coords
}

fn byte_color_component(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

fn scale_color(color: [u8; 4], value: f32) -> [u8; 4] {
    [
        255,
        (color[1] as f32 * value) as u8,
        (color[2] as f32 * value) as u8,
        (color[3] as f32 * value) as u8,
    ]
}

fn average_material_light_color(material: [u8; 4], light: [u8; 4]) -> [u8; 4] {
    [
        255,
        ((material[1] as u16 + light[1] as u16) / 2) as u8,
        ((material[2] as u16 + light[2] as u16) / 2) as u8,
        ((material[3] as u16 + light[3] as u16) / 2) as u8,
    ]
}

/// Upper-left 3x3 of `m`, applied to a direction vector (w = 0).
fn transform_direction(m: &Mat4, v: Vec3) -> Vec3 {
    (*m * Vec4::direction(v.x, v.y, v.z)).to_vec3()
}

/// `(model_view^-1)^T`, for transforming surface normals.
///
/// The raw model-view matrix only carries normals correctly under
/// uniform scaling; the inverse-transpose is required in general.
fn normal_matrix(model_view: &Mat4) -> Mat4 {
    model_view.inverse().expect("model-view matrix is not invertible").transpose()
}

impl ShadingModel {
    #[allow(clippy::too_many_arguments)]
    pub fn shade_triangle(
        &self,
        first: &ViewportPoint,
        second: &ViewportPoint,
        third: &ViewportPoint,
        polygon: &Polygon,
        scene: &SceneData,
        material_color: [u8; 4],
        lights: &[Rc<LightSource>],
        texturing: &TexturingConfig,
        model: &Mat4,
        view: &Mat4,
    ) -> Vec<ShadedPixel> {
        match self {
            ShadingModel::NoShading => {
                let points = triangle_fill_points(first, second, third);
                let mut request = InterpolationRequest::default();
                let shaded = interpolate_triangle(&points, first, second, third, &mut request);
                shaded
                    .into_iter()
                    .map(|pixel| paint(pixel, material_color))
                    .collect()
            }
            ShadingModel::Lambertian => {
                shade_lambertian(first, second, third, polygon, scene, material_color, lights, model, view)
            }
            ShadingModel::Phong => shade_phong(
                first,
                second,
                third,
                polygon,
                scene,
                material_color,
                lights,
                texturing,
                model,
                view,
            ),
        }
    }
}

fn paint(pixel: ShadedPixel, color: [u8; 4]) -> ShadedPixel {
    if pixel.color == BLACK && pixel.point.z == f64::MAX {
        pixel
    } else {
        ShadedPixel { color, ..pixel }
    }
}

#[allow(clippy::too_many_arguments)]
fn shade_lambertian(
    first: &ViewportPoint,
    second: &ViewportPoint,
    third: &ViewportPoint,
    polygon: &Polygon,
    scene: &SceneData,
    material_color: [u8; 4],
    lights: &[Rc<LightSource>],
    model: &Mat4,
    view: &Mat4,
) -> Vec<ShadedPixel> {
    let points = triangle_fill_points(first, second, third);
    let mut request = InterpolationRequest::default();
    let shaded = interpolate_triangle(&points, first, second, third, &mut request);

    if lights.is_empty() {
        return shaded.into_iter().map(|pixel| paint(pixel, BLACK)).collect();
    }

    let vertices = polygon_vertices(&polygon.vertex_indices, &scene.vertices);
    let normals = polygon_vertices(&polygon.normal_indices, &scene.vertex_normals);
    let model_view = *view * *model;
    let normal_matrix = normal_matrix(&model_view);

    let vertices_view: Vec<Vec3> = vertices
        .iter()
        .map(|&v| (model_view * Vec4::point(v.x, v.y, v.z)).to_vec3())
        .collect();
    let normals_view: Vec<Vec3> = normals
        .iter()
        .map(|&n| transform_direction(&normal_matrix, n))
        .collect();

    let mut shade_sum = [0u32; 3];
    for light in lights {
        let light_position_view = (*view * Vec4::point(
            light.position_world().x,
            light.position_world().y,
            light.position_world().z,
        ))
        .to_vec3();

        let mut vertex_shade_sum = [0u32; 3];
        for i in 0..3 {
            let light_direction = (light_position_view - vertices_view[i]).normalize();
            let normal = normals_view[i].normalize();
            let intensity = light_direction.dot(normal).clamp(0.0, 1.0);
            let shade = scale_color(average_material_light_color(material_color, light.color()), intensity);
            vertex_shade_sum[0] += shade[1] as u32;
            vertex_shade_sum[1] += shade[2] as u32;
            vertex_shade_sum[2] += shade[3] as u32;
        }
        shade_sum[0] += vertex_shade_sum[0] / 3;
        shade_sum[1] += vertex_shade_sum[1] / 3;
        shade_sum[2] += vertex_shade_sum[2] / 3;
    }

    let final_shade = [
        255,
        (shade_sum[0] / lights.len() as u32) as u8,
        (shade_sum[1] / lights.len() as u32) as u8,
        (shade_sum[2] / lights.len() as u32) as u8,
    ];

    shaded.into_iter().map(|pixel| paint(pixel, final_shade)).collect()
}

#[allow(clippy::too_many_arguments)]
fn shade_phong(
    first: &ViewportPoint,
    second: &ViewportPoint,
    third: &ViewportPoint,
    polygon: &Polygon,
    scene: &SceneData,
    material_color: [u8; 4],
    lights: &[Rc<LightSource>],
    texturing: &TexturingConfig,
    model: &Mat4,
    view: &Mat4,
) -> Vec<ShadedPixel> {
    let points = triangle_fill_points(first, second, third);
    let pixel_count = points.len();

    let normals = polygon_vertices(&polygon.normal_indices, &scene.vertex_normals);
    let model_view = *view * *model;
    let normal_matrix = normal_matrix(&model_view);

    let camera_space_positions: [Vec3; 3] = {
        let vertices = polygon_vertices(&polygon.vertex_indices, &scene.vertices);
        [
            (model_view * Vec4::point(vertices[0].x, vertices[0].y, vertices[0].z)).to_vec3(),
            (model_view * Vec4::point(vertices[1].x, vertices[1].y, vertices[1].z)).to_vec3(),
            (model_view * Vec4::point(vertices[2].x, vertices[2].y, vertices[2].z)).to_vec3(),
        ]
    };

    let texture_coords = if !scene.vertex_textures.is_empty() {
        polygon_texture_coords(&polygon.texture_indices, scene)
    } else {
        [Vec3::ZERO; 3]
    };

    let mut interpolated_normals = vec![Vec3::ZERO; pixel_count];
    let mut interpolated_camera_space = vec![Vec3::ZERO; pixel_count];
    let mut interpolated_texture_coords = vec![Vec3::ZERO; pixel_count];

    let mut request = InterpolationRequest {
        normal: Some(AttributeChannel { source: normals, output: &mut interpolated_normals }),
        camera_space: Some(AttributeChannel {
            source: camera_space_positions,
            output: &mut interpolated_camera_space,
        }),
        texture_coord: if texturing.any_enabled() {
            Some(AttributeChannel { source: texture_coords, output: &mut interpolated_texture_coords })
        } else {
            None
        },
    };

    let shaded = interpolate_triangle(&points, first, second, third, &mut request);

    if lights.is_empty() {
        return shaded.into_iter().map(|pixel| paint(pixel, BLACK)).collect();
    }

    shaded
        .into_iter()
        .enumerate()
        .map(|(idx, pixel)| {
            if pixel.color == BLACK && pixel.point.z == f64::MAX {
                return pixel;
            }

            let interp_point_view = interpolated_camera_space[idx];
            let view_direction = interp_point_view.scale(-1.0).normalize();

            let mut r = 0.0f32;
            let mut g = 0.0f32;
            let mut b = 0.0f32;

            for light in lights {
                let normal = if texturing.normal_enabled {
                    texturing
                        .normal_texture
                        .as_ref()
                        .map(|texture| texture_normal(texture, interpolated_texture_coords[idx]))
                        .unwrap_or(interpolated_normals[idx])
                } else {
                    interpolated_normals[idx]
                };

                let light_position_view = (*view
                    * Vec4::point(light.position_world().x, light.position_world().y, light.position_world().z))
                .to_vec3();

                let light_direction_view = (light_position_view - interp_point_view).normalize();
                let surface_normal_view = transform_direction(&normal_matrix, normal).normalize();

                let diffuse_intensity = light_direction_view.dot(surface_normal_view).clamp(0.0, 1.0);
                let diffuse = scale_color(light.color(), DIFFUSE_LIGHT_COEFF * diffuse_intensity);
                r += diffuse[1] as f32 / 255.0;
                g += diffuse[2] as f32 / 255.0;
                b += diffuse[3] as f32 / 255.0;

                let reflectance = (surface_normal_view.scale(2.0 * light_direction_view.dot(surface_normal_view))
                    - light_direction_view)
                    .normalize();
                let specular_intensity = reflectance.dot(view_direction).clamp(0.0, 1.0);
                let mut specular = scale_color(
                    light.color(),
                    SPECULAR_LIGHT_COEFF * specular_intensity.powf(light.specular_power()),
                );

                if texturing.specular_enabled {
                    if let Some(texture) = texturing.specular_texture.as_ref() {
                        let coefficient = texture_specular(texture, interpolated_texture_coords[idx]);
                        specular = scale_color(specular, coefficient);
                    }
                }
                r += specular[1] as f32 / 255.0;
                g += specular[2] as f32 / 255.0;
                b += specular[3] as f32 / 255.0;
            }

            let ambient = if texturing.diffuse_enabled {
                texturing
                    .diffuse_texture
                    .as_ref()
                    .map(|texture| texture_ambient(texture, interpolated_texture_coords[idx]))
                    .unwrap_or_else(|| scale_color(material_color, AMBIENT_LIGHT_COEFF))
            } else {
                scale_color(material_color, AMBIENT_LIGHT_COEFF)
            };
            r += ambient[1] as f32 / 255.0;
            g += ambient[2] as f32 / 255.0;
            b += ambient[3] as f32 / 255.0;

            ShadedPixel {
                point: pixel.point,
                color: [255, byte_color_component(r), byte_color_component(g), byte_color_component(b)],
            }
        })
        .collect()
}

fn texture_normal(texture: &Texture, uv: Vec3) -> Vec3 {
    let texel = texture.sample(uv.x, uv.y);
    Vec3::new(texel[2] as f32, texel[1] as f32, texel[0] as f32)
}

fn texture_specular(texture: &Texture, uv: Vec3) -> f32 {
    texture.sample(uv.x, uv.y)[0] as f32 / 255.0
}

fn texture_ambient(texture: &Texture, uv: Vec3) -> [u8; 4] {
    let texel = texture.sample(uv.x, uv.y);
    scale_color([255, texel[2], texel[1], texel[0]], TEXTURE_AMBIENT_LIGHT_COEFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::TexCoord;

    fn corner(x: f64, y: f64) -> ViewportPoint {
        ViewportPoint { x, y, z: 0.0, inv_w: 1.0 }
    }

    fn flat_polygon() -> (Polygon, SceneData) {
        let scene = SceneData::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0)],
            vec![Vec3::new(0.0, 0.0, 1.0); 3],
            vec![TexCoord::new(0.0, 0.0, 0.0); 3],
            vec![Polygon::new(vec![0, 1, 2], vec![0, 1, 2], vec![0, 1, 2])],
        );
        let polygon = scene.polygons[0].clone();
        (polygon, scene)
    }

    #[test]
    fn no_shading_paints_every_fill_pixel_the_material_color() {
        let (polygon, scene) = flat_polygon();
        let texturing = TexturingConfig::default();
        let pixels = ShadingModel::NoShading.shade_triangle(
            &corner(0.0, 0.0),
            &corner(4.0, 0.0),
            &corner(0.0, 4.0),
            &polygon,
            &scene,
            [255, 10, 20, 30],
            &[],
            &texturing,
            &Mat4::identity(),
            &Mat4::identity(),
        );
        assert!(pixels.iter().any(|p| p.color == [255, 10, 20, 30]));
    }

    #[test]
    fn lambertian_with_no_lights_paints_black() {
        let (polygon, scene) = flat_polygon();
        let texturing = TexturingConfig::default();
        let pixels = ShadingModel::Lambertian.shade_triangle(
            &corner(0.0, 0.0),
            &corner(4.0, 0.0),
            &corner(0.0, 4.0),
            &polygon,
            &scene,
            [255, 10, 20, 30],
            &[],
            &texturing,
            &Mat4::identity(),
            &Mat4::identity(),
        );
        assert!(pixels.iter().any(|p| p.color == BLACK));
    }

    #[test]
    fn phong_with_a_light_produces_non_black_pixels() {
        let (polygon, scene) = flat_polygon();
        let texturing = TexturingConfig::default();
        let mut light = LightSource::new();
        light.update_position(45.0);
        let lights = vec![Rc::new(light)];
        let pixels = ShadingModel::Phong.shade_triangle(
            &corner(0.0, 0.0),
            &corner(4.0, 0.0),
            &corner(0.0, 4.0),
            &polygon,
            &scene,
            [255, 10, 20, 30],
            &lights,
            &texturing,
            &Mat4::identity(),
            &Mat4::translation(0.0, 0.0, -10.0),
        );
        assert!(pixels.iter().any(|p| p.color != BLACK));
    }
}
