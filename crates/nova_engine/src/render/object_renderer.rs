//! Draws named parts of loaded models in the top-down world view

use crate::assets::Object;
use crate::config::ObjectRenderConfig;
use crate::foundation::math::{constants::{HALF_PI, PI}, Mat4, Mat4Ext, Vec2, Vec3};
use super::backend::{RenderBackend, StateGuard};
use super::Vertex;

/// Where a model sits in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPlacement {
    /// World position
    pub position: Vec2,
    /// Heading in radians, 0 along +x
    pub heading: f32,
}

impl WorldPlacement {
    /// Create a placement
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }
}

/// Renders one part of an [`Object`] at a time.
///
/// Models are authored Y-up facing -Z; the renderer turns them to lie in the
/// screen plane, nose along the heading.
#[derive(Debug, Clone)]
pub struct ObjectRenderer {
    scale: f32,
    view_offset: Vec2,
}

impl ObjectRenderer {
    /// Create a renderer from configuration
    pub fn new(config: &ObjectRenderConfig) -> Self {
        Self {
            scale: config.scale,
            view_offset: Vec2::zeros(),
        }
    }

    /// Screen offset of the playfield, usually the HUD's `offset` section
    pub fn set_view_offset(&mut self, offset: Vec2) {
        self.view_offset = offset;
    }

    /// Current playfield offset
    pub fn view_offset(&self) -> Vec2 {
        self.view_offset
    }

    /// Draw the first mesh named `part_name` with opacity `alpha`.
    ///
    /// Returns `false` without touching the backend when no mesh has that
    /// name. Only the first match is drawn.
    pub fn render_part(
        &self,
        backend: &mut dyn RenderBackend,
        object: &Object,
        placement: &WorldPlacement,
        part_name: &str,
        alpha: f32,
    ) -> bool {
        let Some(mesh) = object.find_mesh(part_name) else {
            log::trace!("Object has no part named {}", part_name);
            return false;
        };
        let material = &object.materials()[mesh.material];

        let model = self.placement_matrix(&*backend, placement) * self.model_matrix(backend.camera_zoom());

        let mut state = StateGuard::new(backend);
        state.set_model_matrix(&model);
        state.bind_vertex_buffer(mesh.vertex_buffer, &Vertex::LAYOUT);

        let params = material.params(alpha);
        if state.lighting_enabled() {
            state.set_lighting_material(&params);
        } else {
            state.set_color(params.diffuse);
        }

        if let Some(texture) = &material.texture {
            state.bind_texture(texture.handle);
        }

        state.set_depth_test(true);
        state.draw_triangles(0, mesh.num_corners);
        true
    }

    /// Scale and reorient model space into the view plane
    fn model_matrix(&self, zoom: f32) -> Mat4 {
        let scale = self.scale * zoom;
        Mat4::new_nonuniform_scaling(&Vec3::new(scale, scale, scale))
            * Mat4::rotation_y(PI)
            * Mat4::rotation_x(HALF_PI)
    }

    /// Camera-relative translation and heading, in normalized device units
    fn placement_matrix(&self, backend: &dyn RenderBackend, placement: &WorldPlacement) -> Mat4 {
        let screen = backend.screen_size();
        let zoom = backend.camera_zoom();
        let relative = placement.position - backend.camera_position() + self.view_offset;

        let x = relative.x * zoom / screen.x * 2.0;
        let y = relative.y * zoom / screen.y * 2.0;

        Mat4::new_translation(&Vec3::new(x, y, 0.0))
            * Mat4::rotation_z(placement.heading + HALF_PI)
            * Mat4::rotation_x(HALF_PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Mesh, Material, Object};
    use crate::render::{DrawCommand, HeadlessBackend, RenderBackend, Vertex};
    use approx::assert_relative_eq;

    fn two_part_object(backend: &mut HeadlessBackend) -> Object {
        let hull = backend.create_vertex_buffer(vec![Vertex::new([0.0; 3], [0.0; 2]); 6]).unwrap();
        let engine = backend.create_vertex_buffer(vec![Vertex::new([1.0; 3], [1.0; 2]); 3]).unwrap();
        let mut paint = Material::new("paint");
        paint.diffuse = [0.5, 0.25, 1.0, 1.0];

        Object::from_parts(
            vec![
                Mesh::new("hull", hull, 6, 0),
                Mesh::new("engine", engine, 3, 0),
                Mesh::new("hull", engine, 3, 0),
            ],
            vec![paint],
        )
    }

    #[test]
    fn test_unknown_part_draws_nothing() {
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        let object = two_part_object(&mut backend);
        let renderer = ObjectRenderer::new(&ObjectRenderConfig::default());

        let placement = WorldPlacement::new(Vec2::zeros(), 0.0);
        assert!(!renderer.render_part(&mut backend, &object, &placement, "turret", 1.0));
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_first_matching_part_only() {
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        let object = two_part_object(&mut backend);
        let renderer = ObjectRenderer::new(&ObjectRenderConfig::default());

        let placement = WorldPlacement::new(Vec2::zeros(), 0.0);
        assert!(renderer.render_part(&mut backend, &object, &placement, "hull", 0.5));

        let draws: Vec<_> = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawTriangles { .. }))
            .collect();
        assert_eq!(draws, vec![&DrawCommand::DrawTriangles { first: 0, count: 6 }]);
        assert_eq!(backend.state_depth(), 0);
    }

    #[test]
    fn test_alpha_is_per_draw() {
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        let object = two_part_object(&mut backend);
        let renderer = ObjectRenderer::new(&ObjectRenderConfig::default());
        let placement = WorldPlacement::new(Vec2::zeros(), 0.0);

        renderer.render_part(&mut backend, &object, &placement, "engine", 0.25);
        renderer.render_part(&mut backend, &object, &placement, "engine", 1.0);

        let alphas: Vec<f32> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::SetLightingMaterial(params) => Some(params.diffuse[3]),
                _ => None,
            })
            .collect();
        assert_eq!(alphas, vec![0.25, 1.0]);
        assert_eq!(object.materials()[0].diffuse[3], 1.0);
    }

    #[test]
    fn test_flat_color_without_lighting() {
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        backend.set_lighting(false);
        let object = two_part_object(&mut backend);
        let renderer = ObjectRenderer::new(&ObjectRenderConfig::default());

        renderer.render_part(&mut backend, &object, &WorldPlacement::new(Vec2::zeros(), 0.0), "engine", 0.75);
        assert!(backend
            .commands()
            .contains(&DrawCommand::SetColor([0.5, 0.25, 1.0, 0.75])));
        assert!(backend.commands().contains(&DrawCommand::SetDepthTest(true)));
    }

    #[test]
    fn test_placement_relative_to_camera() {
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        backend.set_camera(Vec2::new(100.0, 100.0), 2.0);
        let object = two_part_object(&mut backend);
        let mut renderer = ObjectRenderer::new(&ObjectRenderConfig::default());
        renderer.set_view_offset(Vec2::new(-20.0, 0.0));

        let placement = WorldPlacement::new(Vec2::new(320.0, 160.0), 0.0);
        renderer.render_part(&mut backend, &object, &placement, "engine", 1.0);

        let model = backend
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::SetModelMatrix(m) => Some(*m),
                _ => None,
            })
            .unwrap();
        // (320 - 100 - 20) * 2 / 800 * 2 and (160 - 100) * 2 / 600 * 2
        let origin = model.transform_point(&nalgebra::Point3::origin());
        assert_relative_eq!(origin.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(origin.y, 0.4, epsilon = 1e-5);
        assert_relative_eq!(origin.z, 0.0, epsilon = 1e-5);
    }
}
