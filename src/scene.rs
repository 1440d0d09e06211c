// scene.rs: camera, inside-out sphere and its texture, created once per mount

use crate::app::Viewport;
use crate::camera::{Orientation, PerspectiveCamera};
use crate::config::SceneConfig;
use crate::mesh::{build_sphere, Hit, SphereMesh};
use crate::texture::{Brush, PanoramaTexture};
use glam::{Mat4, Vec2, Vec3};
use image::RgbaImage;

pub struct Scene {
    pub camera: PerspectiveCamera,
    pub orientation: Orientation,
    look_distance: f32,
    sphere: SphereMesh,
    mesh_dirty: bool,
    /// The sphere only counts as part of the scene once this is set.
    texture: Option<PanoramaTexture>,
}

impl Scene {
    pub fn new(config: &SceneConfig, sphere_scale: [f32; 3], max_latitude: f32, viewport: Viewport) -> Self {
        let mut sphere = build_sphere(config.sphere_radius, config.width_segments, config.height_segments);
        sphere.scale(Vec3::from(sphere_scale));

        let mut scene = Self {
            camera: PerspectiveCamera::new(config.fov_deg, viewport.aspect(), config.near, config.far),
            orientation: Orientation::new(max_latitude),
            look_distance: config.look_distance,
            sphere,
            mesh_dirty: true,
            texture: None,
        };
        scene.update_camera();
        scene
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.set_aspect(viewport.aspect());
    }

    /// Point the camera along the current orientation.
    pub fn update_camera(&mut self) {
        let target = self.camera.position + self.orientation.direction() * self.look_distance;
        self.camera.look_at(target);
    }

    pub fn view_proj(&self) -> Mat4 {
        self.camera.view_proj()
    }

    pub fn set_texture(&mut self, texture: PanoramaTexture) {
        let (w, h) = texture.dimensions();
        log::info!("panorama texture ready ({}x{})", w, h);
        self.texture = Some(texture);
    }

    pub fn texture(&self) -> Option<&PanoramaTexture> {
        self.texture.as_ref()
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    pub fn take_mesh_update(&mut self) -> Option<&SphereMesh> {
        if !self.mesh_dirty {
            return None;
        }
        self.mesh_dirty = false;
        Some(&self.sphere)
    }

    pub fn take_texture_update(&mut self) -> Option<&RgbaImage> {
        self.texture.as_mut().and_then(|t| t.take_update())
    }

    /// What lies under a pointer at `ndc`. Nothing until the texture arrived.
    pub fn pick(&mut self, ndc: Vec2) -> Option<Hit> {
        if self.texture.is_none() {
            return None;
        }
        self.update_camera();
        let ray = self.camera.ray_from_ndc(ndc);
        self.sphere.raycast(&ray)
    }

    /// Paint under the pointer. Returns the hit if the texture changed.
    pub fn paint_at(&mut self, ndc: Vec2, brush: &Brush) -> Option<Hit> {
        let hit = self.pick(ndc)?;
        let texture = self.texture.as_mut()?;
        texture.paint(hit.uv, brush);
        Some(hit)
    }
}
