//! Thin-lens camera for ray generation.

use serde::{Deserialize, Serialize};
use strata_math::{Ray, Vec3};

use crate::sampler::Sampler;

/// User-facing camera placement and lens parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub look_from: Vec3,
    pub look_at: Vec3,
    /// Up in the world; the top image row always shows the +vup side of the view
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Lens diameter; 0 disables depth of field
    pub aperture: f32,
    /// Distance from the camera to the plane of perfect focus
    pub focus_dist: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 20.0,
            aperture: 0.1,
            focus_dist: 10.0,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }
}

/// Camera with its derived basis and viewport, read-only once built.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Derive the camera for an image with the given width / height ratio.
    pub fn new(settings: &CameraSettings, aspect_ratio: f32) -> Self {
        let theta = settings.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = aspect_ratio * half_height;

        // Right-handed basis: w points backward, u right, v up
        let w = (settings.look_from - settings.look_at).normalize();
        let u = settings.vup.cross(w).normalize();
        let v = w.cross(u);

        let focus = settings.focus_dist;
        let origin = settings.look_from;
        let horizontal = 2.0 * half_width * focus * u;
        let vertical = 2.0 * half_height * focus * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - focus * w;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: settings.aperture / 2.0,
        }
    }

    /// Generate a ray through normalized image-plane coordinates `(s, t)`.
    ///
    /// `(0, 0)` is the lower-left corner of the image plane, `(1, 1)` the
    /// upper-right. The origin is jittered across the lens disk.
    pub fn get_ray(&self, s: f32, t: f32, sampler: &mut Sampler) -> Ray {
        let rd = self.lens_radius * sampler.in_unit_disk();
        let offset = self.u * rd.x + self.v * rd.y;

        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(self.origin + offset, target - self.origin - offset)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }

    /// Unit vector pointing from the scene back toward the camera.
    pub fn backward(&self) -> Vec3 {
        self.w
    }
}
