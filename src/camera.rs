use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::picking::Ray;

/// A perspective camera for 3D scenes.
///
/// Provides position, orientation, field of view and clip planes, plus the
/// matrices and screen-to-ray projection that picking needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov: f32, // radians
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_2, // 90 degrees
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn looking_at(mut self, target_x: f32, target_y: f32, target_z: f32) -> Self {
        let target = Vec3::new(target_x, target_y, target_z);
        self.forward = (target - self.position).normalize_or_zero();
        self
    }

    /// Turn the camera by pitch (about its right axis) and yaw (about world up), in degrees.
    ///
    /// Negative pitch looks down.
    pub fn rotated(mut self, pitch_degrees: f32, yaw_degrees: f32) -> Self {
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            yaw_degrees.to_radians(),
            pitch_degrees.to_radians(),
            0.0,
        );
        self.forward = (rotation * self.forward).normalize_or_zero();
        self.up = (rotation * self.up).normalize_or_zero();
        self
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    pub fn clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Compute the right vector from forward and up.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or_zero()
    }

    /// Recompute up to be orthogonal to forward and right.
    pub fn orthogonal_up(&self) -> Vec3 {
        self.right().cross(self.forward).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.orthogonal_up())
    }

    /// Right-handed perspective projection with a 0..1 depth range.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Combined `projection * view`, the matrix line passes are drawn with.
    pub fn projection_view(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// World-space ray through a point of the viewport.
    ///
    /// `point` is in pixels relative to the viewport's top-left corner, y down,
    /// which is what window mouse coordinates give after subtracting the
    /// viewport origin. An empty viewport has no rays and returns `None`.
    pub fn viewport_point_to_ray(&self, point: Vec2, viewport: Viewport) -> Option<Ray> {
        if viewport.is_empty() {
            return None;
        }
        Some(Ray::from_screen(
            point.x - viewport.x,
            point.y - viewport.y,
            viewport.width,
            viewport.height,
            self.view_matrix(),
            self.projection_matrix(viewport.aspect()),
        ))
    }
}

/// Pixel rectangle the camera renders into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Viewport anchored at the window origin.
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Width over height, or 1.0 for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width / self.height
        }
    }

    /// Whether the viewport covers no pixels.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}
