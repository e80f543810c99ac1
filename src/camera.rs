//! Orthographic camera orbiting the tree.

use glam::{Mat4, Vec3};

/// Near clipping plane. Negative so geometry behind the eye is still drawn.
pub const NEAR: f32 = -100.0;
/// Far clipping plane.
pub const FAR: f32 = 100.0;
/// Zoom as a fraction of the smaller viewport side.
pub const ZOOM_FACTOR: f32 = 0.8;
/// Distance from the orbit target.
const DISTANCE: f32 = 1.0;
/// Pitch limit in radians.
const MAX_PITCH: f32 = 1.5;

/// Frustum bounds before zoom is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Orthographic camera whose bounds track the viewport in pixels.
///
/// Bounds and zoom only change through [`OrthographicCamera::set_viewport`].
/// Orbiting rotates the eye around the target and panning slides the target
/// across the view plane; neither touches bounds or zoom.
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    bounds: Bounds,
    zoom: f32,
    viewport: (u32, u32),
    /// Point the camera looks at and orbits around.
    target: Vec3,
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
}

impl OrthographicCamera {
    /// Create a camera for a viewport of `width` x `height` pixels.
    pub fn from_viewport(width: u32, height: u32) -> Self {
        let mut camera = Self {
            bounds: Bounds {
                left: 0.0,
                right: 0.0,
                top: 0.0,
                bottom: 0.0,
            },
            zoom: 1.0,
            viewport: (0, 0),
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Recompute bounds and zoom for a new viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        let half_width = width as f32 / 2.0;
        let half_height = height as f32 / 2.0;
        self.bounds = Bounds {
            left: -half_width,
            right: half_width,
            top: half_height,
            bottom: -half_height,
        };
        self.zoom = ZOOM_FACTOR * width.min(height) as f32;
        self.viewport = (width, height);
    }

    /// Frustum bounds in pixels.
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Current zoom.
    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Viewport size the bounds were derived from.
    #[inline]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Rotate around the target by a drag delta in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Slide the target by a drag delta in pixels, so the scene follows the
    /// pointer. One pixel is `1 / zoom` world units.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let view = self.view_matrix();
        let right = view.row(0).truncate();
        let up = view.row(1).truncate();
        self.target += (up * dy - right * dx) / self.zoom;
    }

    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3 {
        let x = DISTANCE * self.pitch.cos() * self.yaw.sin();
        let y = DISTANCE * self.pitch.sin();
        let z = DISTANCE * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// View matrix looking at the target.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Projection matrix with zoom applied to the bounds.
    pub fn projection_matrix(&self) -> Mat4 {
        let Bounds {
            left,
            right,
            top,
            bottom,
        } = self.bounds;
        let dx = (right - left) / (2.0 * self.zoom);
        let dy = (top - bottom) / (2.0 * self.zoom);
        let cx = (right + left) / 2.0;
        let cy = (top + bottom) / 2.0;

        Mat4::orthographic_rh(cx - dx, cx + dx, cy - dy, cy + dy, NEAR, FAR)
    }

    /// Combined view-projection matrix.
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
