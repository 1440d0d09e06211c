// camera.rs: look angles, drag tracking, perspective camera and picking rays

use glam::{Mat4, Vec2, Vec3};

/// Latitude limit keeping the view off the poles, where "up" degenerates.
pub const MAX_LATITUDE: f32 = 85.0;

/// Where the camera looks, in degrees. Latitude is clamped, longitude wraps freely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    longitude: f32,
    latitude: f32,
    max_latitude: f32,
}

impl Orientation {
    pub fn new(max_latitude: f32) -> Self {
        Self {
            longitude: 0.0,
            latitude: 0.0,
            max_latitude,
        }
    }

    pub fn set(&mut self, longitude: f32, latitude: f32) {
        self.longitude = longitude;
        self.latitude = latitude.clamp(-self.max_latitude, self.max_latitude);
    }

    pub fn longitude(&self) -> f32 {
        self.longitude
    }

    pub fn latitude(&self) -> f32 {
        self.latitude
    }

    pub fn reset(&mut self) {
        self.set(0.0, 0.0);
    }

    /// Unit vector for the current angles. Longitude 0 looks down +X, 90 down +Z.
    pub fn direction(&self) -> Vec3 {
        let phi = (90.0 - self.latitude).to_radians();
        let theta = self.longitude.to_radians();
        Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
    }
}

#[derive(Debug, Clone, Copy)]
struct DragAnchor {
    pointer: Vec2,
    longitude: f32,
    latitude: f32,
}

/// Pointer-down starts a drag, pointer-up ends it. Moves in between set the
/// angles relative to where the drag started.
#[derive(Debug, Clone)]
pub struct DragTracker {
    anchor: Option<DragAnchor>,
    scale: f32,
}

impl DragTracker {
    pub fn new(scale: f32) -> Self {
        Self {
            anchor: None,
            scale,
        }
    }

    pub fn begin(&mut self, pointer: Vec2, orientation: &Orientation) {
        self.anchor = Some(DragAnchor {
            pointer,
            longitude: orientation.longitude,
            latitude: orientation.latitude,
        });
    }

    /// Returns false when no drag is active.
    pub fn update(&self, pointer: Vec2, orientation: &mut Orientation) -> bool {
        let Some(anchor) = self.anchor else {
            return false;
        };
        orientation.set(
            (anchor.pointer.x - pointer.x) * self.scale + anchor.longitude,
            (pointer.y - anchor.pointer.y) * self.scale + anchor.latitude,
        );
        true
    }

    pub fn end(&mut self) {
        self.anchor = None;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_deg,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::X,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the eye through a point given in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let on_ray = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray {
            origin: self.position,
            direction: (on_ray - self.position).normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn direction_follows_longitude_and_latitude() {
        let mut o = Orientation::new(85.0);
        assert!((o.direction() - Vec3::X).length() < EPS);

        o.set(90.0, 0.0);
        assert!((o.direction() - Vec3::Z).length() < EPS);

        o.set(0.0, 45.0);
        let d = o.direction();
        assert!((d.y - 45f32.to_radians().sin()).abs() < EPS);
        assert!(d.z.abs() < EPS);
    }

    #[test]
    fn drag_cycle_moves_angles_linearly() {
        let mut o = Orientation::new(85.0);
        o.set(10.0, 5.0);
        let mut drag = DragTracker::new(0.1);

        drag.begin(Vec2::new(100.0, 100.0), &o);
        assert!(drag.update(Vec2::new(130.0, 120.0), &mut o));
        assert!(drag.update(Vec2::new(150.0, 80.0), &mut o));
        drag.end();

        assert!((o.longitude - (10.0 + (100.0 - 150.0) * 0.1)).abs() < EPS);
        assert!((o.latitude - (5.0 + (80.0 - 100.0) * 0.1)).abs() < EPS);
    }

    #[test]
    fn moves_without_drag_are_ignored() {
        let mut o = Orientation::new(85.0);
        let mut drag = DragTracker::new(0.1);
        assert!(!drag.update(Vec2::new(500.0, 500.0), &mut o));

        drag.begin(Vec2::ZERO, &o);
        drag.end();
        assert!(!drag.update(Vec2::new(500.0, 500.0), &mut o));
        assert_eq!(o.longitude, 0.0);
        assert_eq!(o.latitude, 0.0);
    }

    #[test]
    fn latitude_stays_clamped_for_any_drag() {
        let mut o = Orientation::new(85.0);
        let mut drag = DragTracker::new(0.1);
        drag.begin(Vec2::new(0.0, 0.0), &o);

        for y in [-5000.0, 10_000.0, 849.0, 851.0, -851.0, 3.0] {
            drag.update(Vec2::new(y * 0.5, y), &mut o);
            assert!(o.latitude >= -85.0 && o.latitude <= 85.0, "latitude {}", o.latitude);
        }

        drag.update(Vec2::new(0.0, 10_000.0), &mut o);
        assert_eq!(o.latitude, 85.0);
        drag.update(Vec2::new(0.0, -10_000.0), &mut o);
        assert_eq!(o.latitude, -85.0);
    }

    #[test]
    fn longitude_is_unbounded() {
        let mut o = Orientation::new(85.0);
        let mut drag = DragTracker::new(0.1);
        drag.begin(Vec2::ZERO, &o);
        drag.update(Vec2::new(-100_000.0, 0.0), &mut o);
        assert!((o.longitude - 10_000.0).abs() < 1e-2);
    }

    #[test]
    fn centre_ray_points_at_target() {
        let mut cam = PerspectiveCamera::new(75.0, 16.0 / 9.0, 1.0, 1000.0);
        let target = Vec3::new(0.0, 100.0, 500.0);
        cam.look_at(target);
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        assert_eq!(ray.origin, Vec3::ZERO);
        assert!((ray.direction - target.normalize()).length() < 1e-3);
    }

    #[test]
    fn right_edge_ray_is_half_horizontal_fov_off_axis() {
        let aspect = 2.0;
        let mut cam = PerspectiveCamera::new(75.0, aspect, 1.0, 1000.0);
        cam.look_at(Vec3::new(0.0, 0.0, -1.0));
        let ray = cam.ray_from_ndc(Vec2::new(1.0, 0.0));

        let half_h = ((75f32.to_radians() / 2.0).tan() * aspect).atan();
        let angle = ray.direction.angle_between(Vec3::new(0.0, 0.0, -1.0));
        assert!((angle - half_h).abs() < 1e-3);
        assert!(ray.direction.x > 0.0);
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut cam = PerspectiveCamera::new(75.0, 1.5, 1.0, 1000.0);
        cam.set_aspect(0.0);
        assert_eq!(cam.aspect, 1.5);
        cam.set_aspect(f32::NAN);
        assert_eq!(cam.aspect, 1.5);
    }
}
