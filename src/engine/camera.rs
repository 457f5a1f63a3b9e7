// Top-down action camera
//
// Camera model:
//   - A "target" point that follows the controlled pawn
//   - Fixed pitch (elevation angle) and yaw (horizontal rotation)
//   - Zoom by adjusting distance along the look vector
//   - Mouse wheel zooms in/out
//   - Cursor positions unproject into world rays for the cursor trace

use bevy_ecs::prelude::*;
use glam::{Mat4, Vec2, Vec3};
use super::input::InputState;
use super::trace::Ray;

#[derive(Resource, Debug, Clone)]
pub struct TopDownCamera {
    /// Point the camera orbits around; follows the pawn.
    target: Vec3,

    /// Distance from target along the look direction.
    /// Private: always clamped to [min_distance, max_distance] in update(). Use distance() to read.
    distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    /// Elevation angle in radians (0 = horizontal, PI/2 = straight down)
    pub pitch: f32,

    /// Horizontal rotation in radians (0 = looking along -Z axis)
    pub yaw: f32,

    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,

    /// Zoom change (in distance units) per scroll line
    pub zoom_speed: f32,
}

impl Default for TopDownCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 18.0,
            min_distance: 8.0,
            max_distance: 40.0,
            pitch: 50.0_f32.to_radians(),
            yaw: 0.0,
            fov: 35.0_f32.to_radians(),
            near: 0.1,
            far: 200.0,
            zoom_speed: 1.5,
        }
    }
}

impl TopDownCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32) -> Self {
        let mut camera = Self {
            pitch,
            yaw,
            ..Self::default()
        };
        camera.distance = distance.clamp(camera.min_distance, camera.max_distance);
        camera
    }

    /// Follow `focus` and apply wheel zoom. Call once per frame before rendering.
    pub fn update(&mut self, input: &InputState, focus: Vec3) {
        self.target = focus;

        // Zoom: scroll up (positive delta) zooms in (decreases distance)
        self.distance -= input.scroll_delta * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// World-space position of the camera eye.
    pub fn camera_position(&self) -> Vec3 {
        self.target + self.eye_offset()
    }

    /// View matrix: looks from the camera eye toward the target.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.camera_position(), self.target, Vec3::Y)
    }

    /// Perspective projection matrix.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix ready to upload to the GPU.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// World-space ray through a cursor position given in physical pixels
    /// (origin top-left). None if the window has no area.
    pub fn screen_ray(&self, cursor: Vec2, window_size: (u32, u32)) -> Option<Ray> {
        let (w, h) = (window_size.0 as f32, window_size.1 as f32);
        if w <= 0.0 || h <= 0.0 {
            return None;
        }

        let ndc = Vec2::new(2.0 * cursor.x / w - 1.0, 1.0 - 2.0 * cursor.y / h);
        let inv = self.view_projection(w / h).inverse();

        // wgpu clip space depth runs 0 (near) .. 1 (far)
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    /// Project a world point to physical pixel coordinates.
    /// None if the point is behind the camera or the window has no area.
    pub fn world_to_screen(&self, point: Vec3, window_size: (u32, u32)) -> Option<Vec2> {
        let (w, h) = (window_size.0 as f32, window_size.1 as f32);
        if w <= 0.0 || h <= 0.0 {
            return None;
        }

        let clip = self.view_projection(w / h) * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new((ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h))
    }

    pub fn target(&self) -> Vec3 { self.target }
    pub fn distance(&self) -> f32 { self.distance }

    /// Zoom fraction in [0, 1]: 1 = fully zoomed in (min_distance), 0 = fully zoomed out.
    pub fn zoom_fraction(&self) -> f32 {
        let range = self.max_distance - self.min_distance;
        if range > 0.0 {
            1.0 - (self.distance - self.min_distance) / range
        } else {
            0.0
        }
    }

    // Offset from target to camera eye based on pitch, yaw, and distance.
    fn eye_offset(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos() * self.distance,
            self.pitch.sin() * self.distance,
            self.yaw.cos() * self.pitch.cos() * self.distance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_target() {
        let mut camera = TopDownCamera::default();
        camera.update(&InputState::new(), Vec3::new(4.0, 0.0, -2.0));

        let ray = camera.screen_ray(Vec2::new(640.0, 360.0), (1280, 720)).unwrap();
        let to_target = (camera.target() - ray.origin).normalize();
        assert!(ray.direction.dot(to_target) > 0.999);
    }

    #[test]
    fn test_screen_ray_round_trips_world_to_screen() {
        let camera = TopDownCamera::default();
        let point = Vec3::new(1.5, 0.0, 2.0);

        let screen = camera.world_to_screen(point, (1280, 720)).unwrap();
        let ray = camera.screen_ray(screen, (1280, 720)).unwrap();

        // Closest approach of the ray to the point
        let t = (point - ray.origin).dot(ray.direction);
        assert!((ray.at(t) - point).length() < 1e-2);
    }

    #[test]
    fn test_zero_sized_window_has_no_ray() {
        let camera = TopDownCamera::default();
        assert!(camera.screen_ray(Vec2::ZERO, (0, 720)).is_none());
        assert!(camera.world_to_screen(Vec3::ZERO, (1280, 0)).is_none());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = TopDownCamera::default();
        let mut input = InputState::new();
        input.scroll_delta = 1000.0;
        camera.update(&input, Vec3::ZERO);
        assert_eq!(camera.distance(), camera.min_distance);
        assert_eq!(camera.zoom_fraction(), 1.0);

        input.scroll_delta = -1000.0;
        camera.update(&input, Vec3::ZERO);
        assert_eq!(camera.distance(), camera.max_distance);
    }
}
