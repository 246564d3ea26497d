//! Command-line configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use strata_renderer::RenderConfig;

/// Everything the binary needs: render settings plus where to put the image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub render: RenderConfig,
    /// Output file; `.ppm` or `.png`. Named after the render when absent.
    pub output: Option<PathBuf>,
}

impl AppConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.render.validate()?;
        Ok(config)
    }

    /// Output path, or the default name built from the render settings.
    pub fn output_path(&self, elapsed_secs: u64) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => PathBuf::from(default_output_name(&self.render, elapsed_secs)),
        }
    }
}

/// `<model>-x<width>-y<height>-s<spp>-<secs>sec.ppm`
pub fn default_output_name(render: &RenderConfig, elapsed_secs: u64) -> String {
    format!(
        "{}-x{}-y{}-s{}-{}sec.ppm",
        render.scheduler.model.label(),
        render.width,
        render.height,
        render.samples_per_pixel,
        elapsed_secs
    )
}
