//! Random sampling for the path tracer.
//!
//! Every pixel gets its own [`Sampler`] derived from the render seed and the
//! pixel index, so no generator state is shared between worker threads and a
//! fixed seed reproduces the same image no matter how the work was split.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use strata_math::Vec3;

use crate::Color;

/// Odd 64-bit constant used to spread consecutive pixel indices apart.
const PIXEL_STREAM_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seeded random source used by the camera, materials and scene builder.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: Xoshiro256PlusPlus,
}

impl Sampler {
    /// Create a sampler from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Create the sampler owned by one pixel of a render.
    pub fn for_pixel(seed: u64, pixel_index: usize) -> Self {
        let stream = (pixel_index as u64).wrapping_add(1).wrapping_mul(PIXEL_STREAM_MIX);
        Self::new(seed ^ stream)
    }

    /// Uniform f32 in `[0, 1)`.
    #[inline]
    pub fn gen_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform f32 in `[min, max)`.
    #[inline]
    pub fn gen_range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.gen_f32()
    }

    /// Color with each channel uniform in `[0, 1)`.
    pub fn color(&mut self) -> Color {
        Color::new(self.gen_f32(), self.gen_f32(), self.gen_f32())
    }

    /// Random point strictly inside the unit sphere (rejection sampling).
    pub fn in_unit_sphere(&mut self) -> Vec3 {
        loop {
            let p = Vec3::new(
                self.gen_range(-1.0, 1.0),
                self.gen_range(-1.0, 1.0),
                self.gen_range(-1.0, 1.0),
            );
            if p.length_squared() < 1.0 {
                return p;
            }
        }
    }

    /// Random unit vector, uniform on the sphere.
    pub fn unit_vector(&mut self) -> Vec3 {
        loop {
            let p = self.in_unit_sphere();
            let len_sq = p.length_squared();
            if len_sq > 1e-6 {
                return p / len_sq.sqrt();
            }
        }
    }

    /// Random point strictly inside the unit disk in the xy plane.
    pub fn in_unit_disk(&mut self) -> Vec3 {
        loop {
            let p = Vec3::new(self.gen_range(-1.0, 1.0), self.gen_range(-1.0, 1.0), 0.0);
            if p.length_squared() < 1.0 {
                return p;
            }
        }
    }
}
