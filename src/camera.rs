//! Orbit camera
//!
//! Orbits the machine at the origin. Pointer drags rotate and the wheel zooms.
//! There is no panning. Input is queued and eased in by `update`.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Initial eye position
pub const START_EYE: Vec3 = Vec3::new(25.0, 10.0, 60.0);
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

pub const MIN_DISTANCE: f32 = 25.0;
pub const MAX_DISTANCE: f32 = 100.0;
/// Never look from below the ground
pub const MAX_POLAR: f32 = FRAC_PI_2;
/// Keep the pole out of reach so look_at never degenerates
const MIN_POLAR: f32 = 1e-3;
pub const MIN_AZIMUTH: f32 = -FRAC_PI_2;
pub const MAX_AZIMUTH: f32 = FRAC_PI_2;

/// Per-notch wheel zoom factor
const ZOOM_STEP: f32 = 0.95;
/// How quickly queued input is applied (1/s)
const DAMPING: f32 = 12.0;

/// A world-space ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Angle around +y, 0 looking down -z
    pub azimuth: f32,
    /// Angle from +y
    pub polar: f32,
    pub aspect: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    /// Queued zoom as a log-scale factor
    pending_zoom: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(START_EYE, Vec3::ZERO, 16.0 / 9.0)
    }
}

impl OrbitCamera {
    /// Camera at `eye` orbiting `target`, clamped into the allowed range
    pub fn looking_from(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        let offset = eye - target;
        let distance = offset.length();
        let mut camera = Self {
            target,
            distance,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / distance.max(f32::EPSILON)).clamp(-1.0, 1.0).acos(),
            aspect,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_zoom: 0.0,
        };
        camera.clamp();
        camera
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Queue a drag of `delta` pixels on a viewport `height` pixels tall
    pub fn rotate(&mut self, delta: Vec2, height: f32) {
        if height <= 0.0 {
            return;
        }
        self.pending_azimuth -= TAU * delta.x / height * self.rotate_speed;
        self.pending_polar -= TAU * delta.y / height * self.rotate_speed;
    }

    /// Queue wheel zoom. Positive `notches` move away.
    pub fn zoom(&mut self, notches: f32) {
        self.pending_zoom -= notches * ZOOM_STEP.ln() * self.zoom_speed;
    }

    /// Ease queued input in and re-apply limits
    pub fn update(&mut self, dt: f32) {
        let blend = 1.0 - (-DAMPING * dt.max(0.0)).exp();

        let d_azimuth = self.pending_azimuth * blend;
        let d_polar = self.pending_polar * blend;
        let d_zoom = self.pending_zoom * blend;
        self.pending_azimuth -= d_azimuth;
        self.pending_polar -= d_polar;
        self.pending_zoom -= d_zoom;

        self.azimuth += d_azimuth;
        self.polar += d_polar;
        self.distance *= d_zoom.exp();
        self.clamp();
    }

    fn clamp(&mut self) {
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.polar = self.polar.clamp(MIN_POLAR, MAX_POLAR);
        self.azimuth = self.azimuth.clamp(MIN_AZIMUTH, MAX_AZIMUTH);
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        self.target + self.distance * Vec3::new(sin_p * sin_a, cos_p, sin_p * cos_a)
    }

    pub fn fov_y(&self) -> f32 {
        FOV_Y_DEGREES.to_radians()
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y(), self.aspect, NEAR, FAR)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray through a pixel (origin top-left)
    pub fn screen_ray(&self, pixel: Vec2, viewport: Vec2) -> Ray {
        let ndc = Vec2::new(
            2.0 * pixel.x / viewport.x - 1.0,
            1.0 - 2.0 * pixel.y / viewport.y,
        );
        let inverse = self.view_proj().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: self.eye(),
            dir: (far - near).normalize_or_zero(),
        }
    }

    /// Pixel a world point lands on, if it is in front of the camera
    pub fn world_to_screen(&self, point: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_proj() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        ))
    }
}
