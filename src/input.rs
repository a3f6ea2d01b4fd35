//! Spin input: keyboard and the start button
//!
//! Every input path collapses into one spin-request edge. The driver takes it
//! once per frame and the state machine ignores it unless the machine is idle.

use glam::Vec3;

use crate::camera::Ray;

/// Resting centre of the start button
pub const BUTTON_CENTER: Vec3 = Vec3::new(0.0, -14.0, 15.0);
/// Button size (width, height, depth)
pub const BUTTON_SIZE: Vec3 = Vec3::new(15.0, 2.5, 5.0);
/// How far the button sinks while held
pub const BUTTON_TRAVEL: f32 = 1.0;

/// `KeyboardEvent.key` values that pull the handle
pub fn is_spin_key(key: &str) -> bool {
    matches!(key, " " | "Spacebar" | "Enter")
}

/// Slab test. Returns the entry distance along the ray.
pub fn ray_hits_box(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray.dir.recip();
    let t0 = (min - ray.origin) * inv;
    let t1 = (max - ray.origin) * inv;
    let t_near = t0.min(t1).max_element();
    let t_far = t0.max(t1).min_element();
    if t_near <= t_far && t_far >= 0.0 {
        Some(t_near.max(0.0))
    } else {
        None
    }
}

/// The big yellow start button
#[derive(Debug, Clone, Copy, Default)]
pub struct StartButton {
    pub pressed: bool,
}

impl StartButton {
    pub fn center(&self) -> Vec3 {
        if self.pressed {
            BUTTON_CENTER - Vec3::Y * BUTTON_TRAVEL
        } else {
            BUTTON_CENTER
        }
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half = BUTTON_SIZE / 2.0;
        let center = self.center();
        (center - half, center + half)
    }

    pub fn hit(&self, ray: &Ray) -> bool {
        let (min, max) = self.bounds();
        ray_hits_box(ray, min, max).is_some()
    }
}

/// Collects keyboard and pointer input into a spin request
#[derive(Debug, Clone, Default)]
pub struct SpinControl {
    pub button: StartButton,
    spin_requested: bool,
}

impl SpinControl {
    /// Returns true if the key was a spin key
    pub fn key_down(&mut self, key: &str) -> bool {
        if !is_spin_key(key) {
            return false;
        }
        self.press();
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        if !is_spin_key(key) {
            return false;
        }
        self.button.pressed = false;
        true
    }

    /// Returns true if the pointer landed on the start button
    pub fn pointer_down(&mut self, ray: &Ray) -> bool {
        if !self.button.hit(ray) {
            return false;
        }
        self.press();
        true
    }

    pub fn pointer_up(&mut self) {
        self.button.pressed = false;
    }

    fn press(&mut self) {
        self.button.pressed = true;
        self.spin_requested = true;
    }

    /// Consume the spin edge
    pub fn take_spin_request(&mut self) -> bool {
        std::mem::take(&mut self.spin_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use glam::Vec2;

    #[test]
    fn test_spin_keys() {
        assert!(is_spin_key(" "));
        assert!(is_spin_key("Enter"));
        assert!(!is_spin_key("a"));
        assert!(!is_spin_key("Escape"));
    }

    #[test]
    fn test_ray_box() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            dir: Vec3::NEG_Z,
        };
        let hit = ray_hits_box(&ray, Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(hit, Some(9.0));

        let miss = Ray {
            origin: Vec3::new(5.0, 0.0, 10.0),
            dir: Vec3::NEG_Z,
        };
        assert_eq!(ray_hits_box(&miss, Vec3::splat(-1.0), Vec3::splat(1.0)), None);

        let behind = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            dir: Vec3::Z,
        };
        assert_eq!(ray_hits_box(&behind, Vec3::splat(-1.0), Vec3::splat(1.0)), None);
    }

    #[test]
    fn test_click_button_from_start_camera() {
        let viewport = Vec2::new(1280.0, 720.0);
        let mut camera = OrbitCamera::default();
        camera.set_viewport(viewport.x, viewport.y);
        let mut control = SpinControl::default();

        let pixel = camera.world_to_screen(BUTTON_CENTER, viewport).unwrap();
        let ray = camera.screen_ray(pixel, viewport);
        assert!(control.pointer_down(&ray));
        assert!(control.button.pressed);
        assert!(control.take_spin_request());
        assert!(!control.take_spin_request());

        control.pointer_up();
        assert!(!control.button.pressed);
    }

    #[test]
    fn test_click_sky_does_nothing() {
        let viewport = Vec2::new(1280.0, 720.0);
        let camera = OrbitCamera::default();
        let mut control = SpinControl::default();
        let ray = camera.screen_ray(Vec2::new(10.0, 10.0), viewport);
        assert!(!control.pointer_down(&ray));
        assert!(!control.take_spin_request());
    }

    #[test]
    fn test_key_press_and_release() {
        let mut control = SpinControl::default();
        assert!(control.key_down(" "));
        assert!(control.button.pressed);
        assert!(control.key_up(" "));
        assert!(!control.button.pressed);
        // Request survives the release until taken
        assert!(control.take_spin_request());
    }

    #[test]
    fn test_pressed_button_sinks() {
        let button = StartButton { pressed: true };
        assert_eq!(button.center().y, -15.0);
        assert_eq!(StartButton::default().center().y, -14.0);
    }
}
