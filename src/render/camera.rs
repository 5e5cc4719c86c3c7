//! Perspective camera and an orbit controller with damping.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_deg,
            aspect,
            near,
            far,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Orbits a camera around a target on a sphere.
///
/// Input adds to angular velocities which decay by `damping_factor` each
/// update, so motion eases out after the mouse stops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, radians.
    pub theta: f32,
    /// Angle down from +Y, radians.
    pub phi: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    theta_velocity: f32,
    phi_velocity: f32,
}

impl OrbitControls {
    /// Start from an existing camera position.
    pub fn from_position(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(1e-3);
        let theta = offset.x.atan2(offset.z);
        let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let mut controls = Self {
            target,
            radius,
            theta,
            phi,
            min_polar: 0.01,
            // stay above the ground plane
            max_polar: FRAC_PI_2 - 0.05,
            min_radius: 10.0,
            max_radius: 800.0,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            theta_velocity: 0.0,
            phi_velocity: 0.0,
        };
        controls.clamp();
        controls
    }

    /// Drag by a screen delta in pixels; `height` is the viewport height.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let per_pixel = std::f32::consts::TAU / height.max(1.0) * self.rotate_speed;
        self.theta_velocity -= dx * per_pixel;
        self.phi_velocity -= dy * per_pixel;
    }

    /// Scale the orbit radius; values below 1 move closer.
    pub fn zoom(&mut self, factor: f32) {
        if factor > 0.0 {
            self.radius *= factor;
            self.clamp();
        }
    }

    /// Apply damped motion. Returns true if the camera moved noticeably.
    pub fn update(&mut self) -> bool {
        let moved = self.theta_velocity.abs() > 1e-4 || self.phi_velocity.abs() > 1e-4;
        self.theta += self.theta_velocity * self.damping_factor;
        self.phi += self.phi_velocity * self.damping_factor;
        self.theta_velocity *= 1.0 - self.damping_factor;
        self.phi_velocity *= 1.0 - self.damping_factor;
        self.clamp();
        moved
    }

    fn clamp(&mut self) {
        self.phi = self.phi.clamp(self.min_polar, self.max_polar);
        self.radius = self.radius.clamp(self.min_radius, self.max_radius);
    }

    pub fn position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + Vec3::new(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }

    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.position();
        camera.target = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_roundtrips_start_position() {
        let start = Vec3::new(100.0, 100.0, 100.0);
        let controls = OrbitControls::from_position(start, Vec3::ZERO);
        assert!((controls.position() - start).length() < 1e-2);
    }

    #[test]
    fn test_polar_angle_never_goes_below_ground() {
        let mut controls = OrbitControls::from_position(Vec3::new(0.0, 50.0, 50.0), Vec3::ZERO);
        controls.rotate(0.0, -10_000.0, 600.0);
        for _ in 0..200 {
            controls.update();
        }
        assert!(controls.phi <= controls.max_polar + 1e-6);
        assert!(controls.position().y > 0.0);
    }

    #[test]
    fn test_damping_settles() {
        let mut controls = OrbitControls::from_position(Vec3::new(0.0, 50.0, 50.0), Vec3::ZERO);
        controls.rotate(100.0, 0.0, 600.0);
        assert!(controls.update());
        for _ in 0..400 {
            controls.update();
        }
        assert!(!controls.update());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut controls = OrbitControls::from_position(Vec3::new(0.0, 50.0, 50.0), Vec3::ZERO);
        controls.zoom(0.0001);
        assert_eq!(controls.radius, controls.min_radius);
        controls.zoom(1e6);
        assert_eq!(controls.radius, controls.max_radius);
    }

    #[test]
    fn test_view_looks_at_target() {
        let mut camera = Camera::new(60.0, 16.0 / 9.0, 1.0, 1000.0);
        camera.position = Vec3::new(0.0, 3.0, 6.0);
        camera.target = Vec3::new(0.0, 3.0, 0.0);
        let in_view = camera.view().transform_point3(Vec3::new(0.0, 3.0, -10.0));
        assert!(in_view.z < 0.0);
        assert!(in_view.x.abs() < 1e-5 && in_view.y.abs() < 1e-5);
    }
}
