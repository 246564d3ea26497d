//! Render configuration.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it changes.

use serde::{Deserialize, Serialize};
use strata_math::Ray;

use crate::camera::CameraSettings;
use crate::error::{RenderError, RenderResult};
use crate::Color;

/// How jobs are spread over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionModel {
    /// One rayon task per pixel
    TaskPerPixel,
    /// Fixed set of worker threads pulling row blocks from a shared queue
    #[default]
    WorkerPool,
    /// One rayon task per row block
    TaskPerBlock,
}

impl ExecutionModel {
    /// Short name used in logs and default output file names.
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionModel::TaskPerPixel => "pixel-tasks",
            ExecutionModel::WorkerPool => "block-jobq",
            ExecutionModel::TaskPerBlock => "block-tasks",
        }
    }
}

/// Work partitioning and thread count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub model: ExecutionModel,
    /// Rows per job for the block-based models
    pub rows_per_job: u32,
    /// Worker thread count; `None` uses the available hardware parallelism
    pub workers: Option<usize>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            model: ExecutionModel::WorkerPool,
            rows_per_job: 16,
            workers: None,
        }
    }
}

impl SchedulerSettings {
    /// Worker count after resolving the hardware default.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Vertical background gradient seen by rays that escape the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyGradient {
    /// Color for rays pointing straight down
    pub horizon: Color,
    /// Color for rays pointing straight up
    pub zenith: Color,
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            horizon: Color::new(1.0, 1.0, 1.0),
            zenith: Color::new(0.5, 0.7, 1.0),
        }
    }
}

impl SkyGradient {
    /// Background radiance along `ray`.
    pub fn color(&self, ray: &Ray) -> Color {
        let unit_direction = ray.direction().normalize();
        let a = 0.5 * (unit_direction.y + 1.0);
        (1.0 - a) * self.horizon + a * self.zenith
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Bounce cap: paths reaching this depth contribute black
    pub max_depth: u32,
    pub sky: SkyGradient,
    pub camera: CameraSettings,
    pub scheduler: SchedulerSettings,
    /// Seed for pixel sampling; random when absent
    pub seed: Option<u64>,
    /// Seed for the procedural scene; random when absent
    pub scene_seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            samples_per_pixel: 10,
            max_depth: 50,
            sky: SkyGradient::default(),
            camera: CameraSettings::default(),
            scheduler: SchedulerSettings::default(),
            seed: None,
            scene_seed: None,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reject settings the renderer cannot honor.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig("samples_per_pixel must be at least 1".into()));
        }
        if self.max_depth == 0 {
            return Err(RenderError::InvalidConfig("max_depth must be at least 1".into()));
        }
        if self.scheduler.rows_per_job == 0 {
            return Err(RenderError::InvalidConfig("rows_per_job must be at least 1".into()));
        }
        if self.scheduler.workers == Some(0) {
            return Err(RenderError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.camera.focus_dist <= 0.0 || self.camera.aperture < 0.0 {
            return Err(RenderError::InvalidConfig(
                "focus_dist must be positive and aperture non-negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_math::Vec3;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!((config.width, config.height), (1200, 800));
        assert_eq!(config.samples_per_pixel, 10);
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.scheduler.model, ExecutionModel::WorkerPool);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sky_straight_up_is_zenith() {
        let sky = SkyGradient::default();
        let up = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(sky.color(&up), sky.zenith);
    }

    #[test]
    fn test_sky_straight_down_is_horizon() {
        let sky = SkyGradient::default();
        let down = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(sky.color(&down), sky.horizon);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "width": 64,
            "height": 32,
            "scheduler": { "model": "task_per_block", "workers": 3 },
            "camera": { "vfov": 40.0 },
            "seed": 11
        }"#;
        let config: RenderConfig = serde_json::from_str(json).unwrap();

        assert_eq!((config.width, config.height), (64, 32));
        assert_eq!(config.samples_per_pixel, 10);
        assert_eq!(config.scheduler.model, ExecutionModel::TaskPerBlock);
        assert_eq!(config.scheduler.rows_per_job, 16);
        assert_eq!(config.scheduler.worker_count(), 3);
        assert_eq!(config.camera.vfov, 40.0);
        assert_eq!(config.camera.focus_dist, 10.0);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.scene_seed, None);
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let cases = [
            RenderConfig { width: 0, ..Default::default() },
            RenderConfig { samples_per_pixel: 0, ..Default::default() },
            RenderConfig { max_depth: 0, ..Default::default() },
            RenderConfig {
                scheduler: SchedulerSettings { rows_per_job: 0, ..Default::default() },
                ..Default::default()
            },
            RenderConfig {
                scheduler: SchedulerSettings { workers: Some(0), ..Default::default() },
                ..Default::default()
            },
        ];

        for config in cases {
            assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
        }
    }
}
