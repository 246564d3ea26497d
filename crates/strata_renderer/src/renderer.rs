//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a fixed bounce cap
//! - Gamma correction
//! - Anti-aliasing via multi-sampling
//! - Parallel rendering through the job scheduler

use std::time::Instant;

use strata_math::{Interval, Ray};

use crate::buffer::ImageBuffer;
use crate::config::{ExecutionModel, RenderConfig};
use crate::error::RenderResult;
use crate::hittable::Hittable;
use crate::job::{generate_pixel_jobs, generate_row_jobs, Job, RenderContext};
use crate::material::Scatter;
use crate::sampler::Sampler;
use crate::scheduler::Scheduler;
use crate::{Camera, Color};

/// Closest hit distance accepted, avoids self-intersection acne.
const T_MIN: f32 = 0.001;

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It follows the ray through the
/// scene, multiplying in each bounce's attenuation, until the ray escapes to
/// the sky, is absorbed, or reaches `config.max_depth` bounces.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    sampler: &mut Sampler,
) -> Color {
    // Bounce cap reached: the path carries no more energy
    if depth >= config.max_depth {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f32::INFINITY)) else {
        return config.sky.color(ray);
    };

    match rec.material.scatter(ray, &rec, sampler) {
        Some(result) => {
            result.attenuation * ray_color(&result.scattered, world, depth + 1, config, sampler)
        }
        None => Color::ZERO,
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-correct each channel of a linear color.
#[inline]
pub fn gamma_correct(color: Color) -> Color {
    Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    )
}

/// Render a single pixel of `job` with multi-sampling.
///
/// `(x, y)` is measured from the top-left of the image; the job supplies the
/// image size and sample count. Row 0 is the top of the camera's image plane,
/// whatever `vup` is set to. The pixel draws from its own sampler, so the
/// result only depends on `seed` and the pixel position. Returns the
/// gamma-corrected average of the samples.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    job: &Job,
    x: u32,
    y: u32,
    config: &RenderConfig,
    seed: u64,
) -> Color {
    let mut sampler = Sampler::for_pixel(seed, job.pixel_index(x, y));

    // The camera's image plane grows upward, the buffer grows downward
    let row_from_bottom = (job.image_height - 1 - y) as f32;
    let width = job.image_width as f32;
    let height = job.image_height as f32;
    let samples = job.samples_per_pixel;

    let mut pixel_color = Color::ZERO;
    for _ in 0..samples {
        let u = (x as f32 + sampler.gen_f32()) / width;
        let v = (row_from_bottom + sampler.gen_f32()) / height;
        let ray = camera.get_ray(u, v, &mut sampler);
        pixel_color += ray_color(&ray, world, 0, config, &mut sampler);
    }

    gamma_correct(pixel_color / samples.max(1) as f32)
}

/// Render the entire scene to an image buffer.
///
/// Partitions the image according to `config.scheduler`, runs the jobs on
/// worker threads and merges their results once every job has reported.
pub fn render(world: &dyn Hittable, camera: &Camera, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    config.validate()?;

    let seed = match config.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random();
            log::info!("No sampling seed configured, using {}", seed);
            seed
        }
    };

    let jobs = match config.scheduler.model {
        ExecutionModel::TaskPerPixel => generate_pixel_jobs(config.width, config.height, config.samples_per_pixel),
        ExecutionModel::WorkerPool | ExecutionModel::TaskPerBlock => generate_row_jobs(
            config.width,
            config.height,
            config.scheduler.rows_per_job,
            config.samples_per_pixel,
        ),
    };

    let scheduler = Scheduler::new(config.scheduler);
    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}, {} jobs via {} on {} workers",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth,
        jobs.len(),
        config.scheduler.model.label(),
        scheduler.workers()
    );

    let ctx = RenderContext {
        world,
        camera,
        config,
        seed,
    };

    let start = Instant::now();
    let results = scheduler.run(jobs, &ctx)?;
    log::debug!("All jobs reported after {:.2?}", start.elapsed());

    let image = ImageBuffer::from_results(config.width, config.height, results)?;
    log::info!("Merged {} pixels in {:.2?}", image.pixels.len(), start.elapsed());

    Ok(image)
}
