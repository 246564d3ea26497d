//! Strata Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for a procedural sphere scene, split into
//! independent render jobs that run under one of several execution models.
//!
//! Named "Strata" after the row bands the image is cut into.

mod buffer;
mod camera;
mod config;
mod error;
mod hittable;
mod job;
mod material;
mod output;
mod renderer;
mod sampler;
mod scene;
mod scheduler;
mod sphere;

pub use buffer::{color_to_rgb8, ImageBuffer};
pub use camera::{Camera, CameraSettings};
pub use config::{ExecutionModel, RenderConfig, SchedulerSettings, SkyGradient};
pub use error::{OutputError, OutputResult, RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use job::{generate_pixel_jobs, generate_row_jobs, render_job, Job, JobResult, RenderContext};
pub use material::{reflect, refract, Color, Dielectric, Lambertian, Material, Metal, Scatter, ScatterResult};
pub use output::{save_image, write_ppm};
pub use renderer::{gamma_correct, linear_to_gamma, ray_color, render, render_pixel};
pub use sampler::Sampler;
pub use scene::{random_scene, random_spheres};
pub use scheduler::{JobQueue, ResultCollector, Scheduler};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from strata_math
pub use strata_math::{Interval, Ray, Vec3};
