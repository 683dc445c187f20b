//! Per-frame rendering orchestration: transforms scene vertices to viewport
//! space, then dispatches to mesh/fill rendering depending on the active
//! flags.

use std::rc::Rc;

use crate::animation::Animation;
use crate::camera::Camera;
use crate::framebuffer::{Argb, FrameBuffer};
use crate::interpolation::{interpolate_depth_over_line, ViewportPoint};
use crate::light::LightSource;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::rasterizer::{line_fill_points, triangle_fill_points};
use crate::scene::{Polygon, SceneData};
use crate::shading::{ShadingModel, TexturingConfig};

const W_COORDINATE_EPSILON: f32 = 0.0001;
const POLYGON_MESH_VISIBILITY_Z_OFFSET: f64 = 0.01;
const BACKFACE_CULLING_DOT_EPSILON: f32 = 0.0001;

const DEFAULT_FOVY_DEGREES: f32 = 30.0;
const DEFAULT_NEAR: f32 = 2.0;
const DEFAULT_FAR: f32 = 500.0;
const DEFAULT_MODEL_SCALE: f32 = 1.0;

const DEFAULT_PEN_COLOR: Argb = [255, 255, 255, 0];
const DEFAULT_BRUSH_COLOR: Argb = [255, 127, 127, 127];

const WORLD_AXES_SCALE: f32 = 0.65;
const AXIS_COLORS: [Argb; 3] = [[255, 255, 0, 0], [255, 0, 255, 0], [255, 0, 0, 255]];

pub struct RenderingPipeline {
    scene: SceneData,

    fovy_degrees: f32,
    near: f32,
    far: f32,
    model_scale_factor: f32,

    animation: Animation,
    shading_model: ShadingModel,
    texturing: TexturingConfig,

    camera: Camera,
    curr_model_matrix: Mat4,
    curr_view_matrix: Mat4,

    draw_polygon_mesh: bool,
    pen_color: Argb,

    rasterize_polygons: bool,
    brush_color: Argb,

    draw_world_axes: bool,
    z_buffer_enabled: bool,
    backface_culling_enabled: bool,

    light_sources: Vec<Rc<LightSource>>,

    /// Viewport points from the most recent transform pass, kept around so
    /// the z-buffered fill stage can re-test visibility per polygon.
    last_viewport_points: Option<Vec<Option<ViewportPoint>>>,
}

impl RenderingPipeline {
    pub fn new(scene: SceneData) -> Self {
        Self {
            scene,
            fovy_degrees: DEFAULT_FOVY_DEGREES,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            model_scale_factor: DEFAULT_MODEL_SCALE,
            animation: Animation::default(),
            shading_model: ShadingModel::NoShading,
            texturing: TexturingConfig::default(),
            camera: Camera::default(),
            curr_model_matrix: Mat4::identity(),
            curr_view_matrix: Mat4::identity(),
            draw_polygon_mesh: false,
            pen_color: DEFAULT_PEN_COLOR,
            rasterize_polygons: false,
            brush_color: DEFAULT_BRUSH_COLOR,
            draw_world_axes: false,
            z_buffer_enabled: false,
            backface_culling_enabled: false,
            light_sources: Vec::new(),
            last_viewport_points: None,
        }
    }

    pub fn set_near_plane_distance(&mut self, near: f32) {
        self.near = near;
    }

    pub fn set_far_plane_distance(&mut self, far: f32) {
        self.far = far;
    }

    pub fn set_fovy_degrees(&mut self, fovy_degrees: f32) {
        self.fovy_degrees = fovy_degrees;
    }

    pub fn set_model_scale_factor(&mut self, scale_factor: f32) {
        self.model_scale_factor = scale_factor;
    }

    pub fn set_animation(&mut self, animation: Animation) {
        self.animation = animation;
    }

    pub fn set_shading_model(&mut self, shading_model: ShadingModel) {
        self.shading_model = shading_model;
    }

    pub fn set_texturing(&mut self, texturing: TexturingConfig) {
        self.texturing = texturing;
    }

    pub fn set_draw_world_axes(&mut self, draw_world_axes: bool) {
        self.draw_world_axes = draw_world_axes;
    }

    pub fn set_draw_polygon_mesh(&mut self, draw_polygon_mesh: bool) {
        self.draw_polygon_mesh = draw_polygon_mesh;
    }

    pub fn set_rasterize_polygons(&mut self, rasterize_polygons: bool) {
        self.rasterize_polygons = rasterize_polygons;
    }

    pub fn set_x_camera_view(&mut self) {
        self.camera.set_view_from_x();
    }

    pub fn set_y_camera_view(&mut self) {
        self.camera.set_view_from_y();
    }

    pub fn set_z_camera_view(&mut self) {
        self.camera.set_view_from_z();
    }

    /// Advance the orbit camera by a unit step in the sign of `(delta_x, delta_y)`.
    pub fn update_camera_position(&mut self, delta_x: i32, delta_y: i32) {
        const AZIMUTH_DEGREES: f32 = 2.0;
        const INCLINATION_DEGREES: f32 = 2.0;

        let delta_x = if delta_x != 0 { delta_x / delta_x.abs() } else { 0 };
        let delta_y = if delta_y != 0 { delta_y / delta_y.abs() } else { 0 };

        self.camera.update_camera_position(
            -(delta_x as f32) * AZIMUTH_DEGREES,
            -(delta_y as f32) * INCLINATION_DEGREES,
        );
    }

    pub fn set_orbit_camera_distance(&mut self, distance: f32) {
        self.camera.set_world_origin_distance_r(distance);
    }

    pub fn set_pen_color(&mut self, color: Argb) {
        self.pen_color = color;
    }

    pub fn set_brush_color(&mut self, color: Argb) {
        self.brush_color = color;
    }

    pub fn set_enable_z_buffering(&mut self, enabled: bool) {
        self.z_buffer_enabled = enabled;
    }

    pub fn set_enable_backface_culling(&mut self, enabled: bool) {
        self.backface_culling_enabled = enabled;
    }

    pub fn set_light_sources(&mut self, light_sources: Vec<Rc<LightSource>>) {
        self.light_sources = light_sources;
    }

    fn fovy_radians(&self) -> f32 {
        self.fovy_degrees.to_radians()
    }

    fn apply_scale_factor(&self, model: &mut Mat4) {
        for row in 0..3 {
            for col in 0..3 {
                model.set(row, col, model.get(row, col) * self.model_scale_factor);
            }
        }
    }

    fn w_coordinate_is_non_zero(w: f32) -> bool {
        w.abs() > W_COORDINATE_EPSILON
    }

    fn point_is_within_canonical_view_volume(point: Vec4) -> bool {
        (-1.0..=1.0).contains(&point.x) && (-1.0..=1.0).contains(&point.y) && (0.0..=1.0).contains(&point.z)
    }

    fn point_is_within_viewport_boundaries(width: usize, height: usize, point: Vec4) -> bool {
        point.x < width as f32 && point.y < height as f32
    }

    /// Transform object-space points to viewport-space optionals, recording
    /// the model/view matrices used for this pass.
    fn viewport_points(&mut self, points: &[Vec3], aspect_ratio: f32, width: usize, height: usize) -> Vec<Option<ViewportPoint>> {
        let mut model = self.animation.model_matrix();
        self.apply_scale_factor(&mut model);
        self.curr_model_matrix = model;

        let view = self.camera.matrix().inverse().expect("camera matrix is not invertible");
        self.curr_view_matrix = view;

        let viewport_transform = Mat4::viewport_transform(width as f32, height as f32);
        let projection = Mat4::frustum_projection(self.fovy_radians(), aspect_ratio, self.near, self.far);

        let mvp = projection * view * model;

        points
            .iter()
            .map(|&object_point| {
                let homogeneous_point = Vec4::point(object_point.x, object_point.y, object_point.z);
                let clip_space_point = mvp * homogeneous_point;

                if !Self::w_coordinate_is_non_zero(clip_space_point.w) {
                    return None;
                }
                let inverse_w = 1.0 / clip_space_point.w;
                let device_space_point = clip_space_point.scale(inverse_w);

                if !Self::point_is_within_canonical_view_volume(device_space_point) {
                    return None;
                }
                let viewport_point = viewport_transform * device_space_point;

                if !Self::point_is_within_viewport_boundaries(width, height, viewport_point) {
                    return None;
                }
                Some(ViewportPoint {
                    x: viewport_point.x as f64,
                    y: viewport_point.y as f64,
                    z: viewport_point.z as f64,
                    inv_w: inverse_w as f64,
                })
            })
            .collect()
    }

    fn polygon_is_back_facing(&self, polygon: &Polygon) -> bool {
        let v = &polygon.vertex_indices;
        let to_world = |i: usize| self.curr_model_matrix * Vec4::point(self.scene.vertices[i].x, self.scene.vertices[i].y, self.scene.vertices[i].z);

        let p0 = to_world(v[0]).to_vec3();
        let p1 = to_world(v[1]).to_vec3();
        let p2 = to_world(v[2]).to_vec3();

        let normal = (p0 - p1).cross(p2 - p1);
        normal.dot(self.camera.world_view_direction()) < BACKFACE_CULLING_DOT_EPSILON
    }

    fn render_vertices(&self, frame_buffer: &mut FrameBuffer, viewport_points: &[Option<ViewportPoint>]) {
        for point in viewport_points.iter().flatten() {
            frame_buffer.draw_pixel(point.x as i64, point.y as i64, self.pen_color);
        }
    }

    fn render_polygon_mesh(&self, frame_buffer: &mut FrameBuffer, viewport_points: &[Option<ViewportPoint>]) {
        for polygon in &self.scene.polygons {
            if self.backface_culling_enabled && self.polygon_is_back_facing(polygon) {
                continue;
            }
            for (a, b) in polygon_edges(&polygon.vertex_indices) {
                if let (Some(p1), Some(p2)) = (&viewport_points[a], &viewport_points[b]) {
                    frame_buffer.draw_line(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32, self.pen_color);
                }
            }
        }
    }

    fn z_buffer_render_polygon_mesh(&self, frame_buffer: &mut FrameBuffer, viewport_points: &[Option<ViewportPoint>]) {
        for polygon in &self.scene.polygons {
            if self.backface_culling_enabled && self.polygon_is_back_facing(polygon) {
                continue;
            }
            for (a, b) in polygon_edges(&polygon.vertex_indices) {
                if let (Some(p1), Some(p2)) = (&viewport_points[a], &viewport_points[b]) {
                    let mut points = line_fill_points(p1, p2);
                    interpolate_depth_over_line(&mut points, p1, p2);
                    for point in &points {
                        frame_buffer.z_draw_pixel(
                            point.x as i64,
                            point.y as i64,
                            point.z - POLYGON_MESH_VISIBILITY_Z_OFFSET,
                            self.pen_color,
                        );
                    }
                }
            }
        }
    }

    fn render_rasterized_polygons(&self, frame_buffer: &mut FrameBuffer, viewport_points: &[Option<ViewportPoint>]) {
        for polygon in &self.scene.polygons {
            if self.backface_culling_enabled && self.polygon_is_back_facing(polygon) {
                continue;
            }
            if let Some([first, second, third]) = triangle_corners(&polygon.vertex_indices, viewport_points) {
                for point in triangle_fill_points(&first, &second, &third) {
                    frame_buffer.draw_pixel(point.x as i64, point.y as i64, self.brush_color);
                }
            }
        }
    }

    fn z_buffer_render_rasterized_polygons(&self, frame_buffer: &mut FrameBuffer) {
        for polygon in &self.scene.polygons {
            if self.backface_culling_enabled && self.polygon_is_back_facing(polygon) {
                continue;
            }
            let viewport_points = self.last_viewport_points.as_ref().expect("viewport points not computed");
            if let Some([first, second, third]) = triangle_corners(&polygon.vertex_indices, viewport_points) {
                let shaded = self.shading_model.shade_triangle(
                    &first,
                    &second,
                    &third,
                    polygon,
                    &self.scene,
                    self.brush_color,
                    &self.light_sources,
                    &self.texturing,
                    &self.curr_model_matrix,
                    &self.curr_view_matrix,
                );
                for pixel in shaded {
                    frame_buffer.z_draw_pixel(pixel.point.x as i64, pixel.point.y as i64, pixel.point.z, pixel.color);
                }
            }
        }
    }

    fn render_world_axes(&mut self, frame_buffer: &mut FrameBuffer) {
        let width = frame_buffer.width();
        let height = frame_buffer.height();

        let old_scale = self.model_scale_factor;
        let old_animation = std::mem::take(&mut self.animation);
        self.model_scale_factor = WORLD_AXES_SCALE;

        let axis_points = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::ZERO,
        ];
        let viewport_points = self.viewport_points(&axis_points, width as f32 / height as f32, width, height);

        if let Some(origin) = &viewport_points[3] {
            for (i, axis_point) in viewport_points.iter().take(3).enumerate() {
                if let Some(axis_point) = axis_point {
                    frame_buffer.draw_line(
                        origin.x as f32,
                        origin.y as f32,
                        axis_point.x as f32,
                        axis_point.y as f32,
                        AXIS_COLORS[i],
                    );
                }
            }
        }

        self.model_scale_factor = old_scale;
        self.animation = old_animation;
    }

    /// Render one frame into `out`, a byte buffer sized `width * height * 4`.
    pub fn render(&mut self, width: usize, height: usize, out: &mut [u8]) {
        self.animation.step();

        let mut frame_buffer = FrameBuffer::new(width, height);
        frame_buffer.clear(0x00);
        if self.z_buffer_enabled {
            frame_buffer.enable_depth();
            frame_buffer.clear_depth();
        }

        if !self.scene.vertices.is_empty() {
            let aspect_ratio = width as f32 / height as f32;
            let vertices = self.scene.vertices.clone();
            let viewport_points = self.viewport_points(&vertices, aspect_ratio, width, height);

            if !self.draw_polygon_mesh && !self.rasterize_polygons {
                self.render_vertices(&mut frame_buffer, &viewport_points);
            } else if self.z_buffer_enabled {
                self.last_viewport_points = Some(viewport_points.clone());
                if self.draw_polygon_mesh {
                    self.z_buffer_render_polygon_mesh(&mut frame_buffer, &viewport_points);
                }
                if self.rasterize_polygons {
                    self.z_buffer_render_rasterized_polygons(&mut frame_buffer);
                }
            } else {
                if self.rasterize_polygons {
                    self.render_rasterized_polygons(&mut frame_buffer, &viewport_points);
                }
                if self.draw_polygon_mesh {
                    self.render_polygon_mesh(&mut frame_buffer, &viewport_points);
                }
            }
        }

        if self.draw_world_axes {
            self.render_world_axes(&mut frame_buffer);
        }

        frame_buffer.copy_to_bytes(out);
    }
}

/// Consecutive index pairs closing the polygon's edge loop.
fn polygon_edges(vertex_indices: &[usize]) -> Vec<(usize, usize)> {
    let mut edges: Vec<(usize, usize)> =
        vertex_indices.windows(2).map(|w| (w[0], w[1])).collect();
    edges.push((vertex_indices[vertex_indices.len() - 1], vertex_indices[0]));
    edges
}

fn triangle_corners(
    vertex_indices: &[usize],
    viewport_points: &[Option<ViewportPoint>],
) -> Option<[ViewportPoint; 3]> {
    if vertex_indices.iter().any(|&i| viewport_points[i].is_none()) {
        return None;
    }
    Some([
        viewport_points[vertex_indices[0]].unwrap(),
        viewport_points[vertex_indices[1]].unwrap(),
        viewport_points[vertex_indices[2]].unwrap(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cube_scene;

    #[test]
    fn render_produces_a_fully_opaque_frame() {
        let mut pipeline = RenderingPipeline::new(cube_scene());
        let mut out = vec![0u8; 64 * 64 * 4];
        pipeline.render(64, 64, &mut out);
        assert!(out.iter().skip(3).step_by(4).all(|&a| a == 0xFF));
    }

    #[test]
    fn rasterizing_a_cube_paints_some_non_background_pixels() {
        let mut pipeline = RenderingPipeline::new(cube_scene());
        pipeline.set_rasterize_polygons(true);
        pipeline.set_orbit_camera_distance(6.0);
        let mut out = vec![0u8; 64 * 64 * 4];
        pipeline.render(64, 64, &mut out);
        assert!(out.chunks(4).any(|p| p != [0, 0, 0, 0xFF]));
    }

    #[test]
    fn empty_scene_renders_a_blank_frame() {
        let mut pipeline = RenderingPipeline::new(SceneData::default());
        let mut out = vec![0u8; 16 * 16 * 4];
        pipeline.render(16, 16, &mut out);
        assert!(out.chunks(4).all(|p| p == [0, 0, 0, 0xFF]));
    }
}
