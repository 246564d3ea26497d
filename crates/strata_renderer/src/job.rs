//! Units of schedulable work.
//!
//! A job is a rectangle of the image: a full-width block of rows for the
//! block-based execution models, or a single pixel for per-pixel tasks.
//! Jobs never overlap, and together they cover every pixel exactly once.

use std::ops::Range;

use crate::config::RenderConfig;
use crate::hittable::Hittable;
use crate::renderer::render_pixel;
use crate::{Camera, Color};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Position of this job in the generated list
    pub index: usize,
    /// Rows `[start, end)`, top row is 0
    pub rows: Range<u32>,
    /// Columns `[start, end)`
    pub cols: Range<u32>,
    /// Full image size; pixel indices and the image plane derive from it
    pub image_width: u32,
    pub image_height: u32,
    pub samples_per_pixel: u32,
}

impl Job {
    /// Number of pixels this job covers.
    pub fn pixel_count(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    /// Flat buffer index of pixel `(x, y)`.
    #[inline]
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.image_width as usize + x as usize
    }

    /// Flat buffer indices of every pixel in the job, row-major.
    pub fn pixel_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .clone()
            .flat_map(move |y| self.cols.clone().map(move |x| self.pixel_index(x, y)))
    }
}

/// Split the image into full-width blocks of `rows_per_job` rows.
///
/// The last block absorbs any remainder, so the row ranges cover
/// `[0, height)` with no gap and no overlap. An image shorter than one
/// block becomes a single job.
pub fn generate_row_jobs(width: u32, height: u32, rows_per_job: u32, samples_per_pixel: u32) -> Vec<Job> {
    if height == 0 {
        return Vec::new();
    }

    let rows_per_job = rows_per_job.max(1);
    let job_count = (height / rows_per_job).max(1);

    (0..job_count)
        .map(|i| {
            let row_start = i * rows_per_job;
            let row_end = if i == job_count - 1 {
                height
            } else {
                row_start + rows_per_job
            };
            Job {
                index: i as usize,
                rows: row_start..row_end,
                cols: 0..width,
                image_width: width,
                image_height: height,
                samples_per_pixel,
            }
        })
        .collect()
}

/// One 1x1 job per pixel, in row-major order.
pub fn generate_pixel_jobs(width: u32, height: u32, samples_per_pixel: u32) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            jobs.push(Job {
                index: jobs.len(),
                rows: y..y + 1,
                cols: x..x + 1,
                image_width: width,
                image_height: height,
                samples_per_pixel,
            });
        }
    }
    jobs
}

/// Read-only state shared by every job of a render.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub world: &'a dyn Hittable,
    pub camera: &'a Camera,
    pub config: &'a RenderConfig,
    /// Sampling seed every pixel sampler is derived from
    pub seed: u64,
}

/// Pixels produced by one job, owned by it until the merge.
#[derive(Debug, Clone)]
pub struct JobResult {
    /// The job that was rendered
    pub job: Job,
    /// Flat pixel indices, parallel to `colors`
    pub indices: Vec<usize>,
    /// Gamma-corrected colors
    pub colors: Vec<Color>,
}

impl JobResult {
    /// Iterate `(pixel_index, color)` pairs.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, Color)> + '_ {
        self.indices.iter().copied().zip(self.colors.iter().copied())
    }
}

/// Render every pixel of a job.
pub fn render_job(job: Job, ctx: &RenderContext<'_>) -> JobResult {
    let mut indices = Vec::with_capacity(job.pixel_count());
    let mut colors = Vec::with_capacity(job.pixel_count());

    for y in job.rows.clone() {
        for x in job.cols.clone() {
            let color = render_pixel(ctx.camera, ctx.world, &job, x, y, ctx.config, ctx.seed);
            indices.push(job.pixel_index(x, y));
            colors.push(color);
        }
    }

    JobResult { job, indices, colors }
}
