use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use strata_renderer::{random_scene, render, save_image, Camera, ImageBuffer, Sampler};

mod config;

use config::AppConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Strata");

    let app = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            AppConfig::load(&path)?
        }
        None => AppConfig::default(),
    };
    let config = &app.render;

    let scene_seed = match config.scene_seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random();
            log::info!("No scene seed configured, using {}", seed);
            seed
        }
    };

    let world = random_scene(&mut Sampler::new(scene_seed));
    log::info!("Scene ready: {} spheres", world.len());

    let camera = Camera::new(&config.camera, config.aspect_ratio());

    let start = Instant::now();
    let image = render(&world, &camera, config).context("Render failed")?;
    let elapsed = start.elapsed();
    log::info!("Render finished in {:.2}s", elapsed.as_secs_f64());

    let output = app.output_path(elapsed.as_secs());
    write_output(&image, &output)
}

/// Save the finished image; the error carries the path and is reported once by `main`.
fn write_output(image: &ImageBuffer, output: &Path) -> Result<()> {
    save_image(image, output).with_context(|| format!("Failed to save image to {}", output.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_renderer::OutputError;

    #[test]
    fn test_write_output_error_names_path() {
        let path = std::env::temp_dir().join("strata_missing_dir").join("out.ppm");
        let err = write_output(&ImageBuffer::new(2, 2), &path).unwrap_err();

        assert_eq!(err.to_string(), format!("Failed to save image to {}", path.display()));
        assert!(matches!(err.downcast_ref::<OutputError>(), Some(OutputError::Io(_))));
    }
}
