//! Camera state supplied by the host application, and pointer unprojection.

use foundation::math::Vec3;

use crate::picking::Ray;

/// Canvas size in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Pixel position to normalized device coordinates in `[-1, 1]²`.
    ///
    /// Screen y grows downward, device y grows upward. Returns `None` for an
    /// empty viewport.
    pub fn ndc(&self, x_px: f64, y_px: f64) -> Option<[f64; 2]> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        Some([
            (x_px / self.width) * 2.0 - 1.0,
            -(y_px / self.height) * 2.0 + 1.0,
        ])
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    /// Vertical field of view in radians.
    Perspective { fov_y_rad: f64 },
    /// Half of the visible height in world units.
    Orthographic { half_height: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl Camera {
    pub fn perspective(eye: Vec3, target: Vec3, fov_y_deg: f64) -> Self {
        Self {
            eye,
            target,
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Projection::Perspective {
                fov_y_rad: fov_y_deg.to_radians(),
            },
        }
    }

    pub fn orthographic(eye: Vec3, target: Vec3, half_height: f64) -> Self {
        Self {
            eye,
            target,
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Projection::Orthographic { half_height },
        }
    }

    /// Orthonormal `(forward, right, up)` frame, or `None` when the view
    /// direction is zero or parallel to `up`.
    pub fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = (self.target - self.eye).normalized()?;
        let right = forward.cross(self.up).normalized()?;
        let up = right.cross(forward);
        Some((forward, right, up))
    }

    /// World-space ray through the device coordinate `ndc`.
    pub fn ray_from_ndc(&self, ndc: [f64; 2], aspect: f64) -> Option<Ray> {
        if !(aspect > 0.0 && aspect.is_finite()) {
            return None;
        }
        let (forward, right, up) = self.basis()?;

        match self.projection {
            Projection::Perspective { fov_y_rad } => {
                let tan = (0.5 * fov_y_rad).tan();
                let px = ndc[0] * tan * aspect;
                let py = ndc[1] * tan;
                let dir = (forward + right * px + up * py).normalized()?;
                Some(Ray::new(self.eye, dir))
            }
            Projection::Orthographic { half_height } => {
                let origin = self.eye
                    + right * (ndc[0] * half_height * aspect)
                    + up * (ndc[1] * half_height);
                Some(Ray::new(origin, forward))
            }
        }
    }

    /// Ray under the pointer at `(x_px, y_px)` in `viewport`.
    pub fn ray_from_pixels(&self, x_px: f64, y_px: f64, viewport: Viewport) -> Option<Ray> {
        let ndc = viewport.ndc(x_px, y_px)?;
        self.ray_from_ndc(ndc, viewport.aspect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, Viewport};
    use foundation::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn ndc_flips_vertical_axis() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.ndc(0.0, 0.0), Some([-1.0, 1.0]));
        assert_eq!(vp.ndc(400.0, 300.0), Some([0.0, 0.0]));
        assert_eq!(vp.ndc(800.0, 600.0), Some([1.0, -1.0]));
        assert_eq!(Viewport::new(0.0, 600.0).ndc(1.0, 1.0), None);
    }

    #[test]
    fn center_pixel_looks_at_target() {
        let cam = Camera::perspective(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 75.0);
        let ray = cam
            .ray_from_pixels(400.0, 300.0, Viewport::new(800.0, 600.0))
            .expect("ray");
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 10.0));
        assert_close(ray.dir.x, 0.0, 1e-12);
        assert_close(ray.dir.y, 0.0, 1e-12);
        assert_close(ray.dir.z, -1.0, 1e-12);
    }

    #[test]
    fn top_right_pixel_tilts_up_and_right() {
        let cam = Camera::perspective(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 90.0);
        let ray = cam
            .ray_from_pixels(200.0, 0.0, Viewport::new(200.0, 100.0))
            .expect("ray");
        // tan(45°) = 1 so the corner direction is (aspect, 1, -1) normalized.
        let expected = Vec3::new(2.0, 1.0, -1.0).normalized().expect("dir");
        assert_close(ray.dir.x, expected.x, 1e-12);
        assert_close(ray.dir.y, expected.y, 1e-12);
        assert_close(ray.dir.z, expected.z, 1e-12);
    }

    #[test]
    fn orthographic_rays_are_parallel() {
        let cam = Camera::orthographic(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 2.0);
        let ray = cam.ray_from_ndc([1.0, -1.0], 1.5).expect("ray");
        assert_close(ray.origin.x, 3.0, 1e-12);
        assert_close(ray.origin.y, -2.0, 1e-12);
        assert_eq!(ray.dir, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn degenerate_cameras_produce_no_ray() {
        let straight_down = Camera::perspective(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, 60.0);
        assert!(straight_down.ray_from_ndc([0.0, 0.0], 1.0).is_none());

        let cam = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0);
        assert!(cam.ray_from_ndc([0.0, 0.0], 0.0).is_none());
    }
}
