//! Final image storage.

use crate::error::{RenderError, RenderResult};
use crate::job::JobResult;
use crate::Color;

/// Convert a gamma-corrected color to 8-bit RGB.
///
/// Each channel maps to `floor(255.99 * c)` after clamping to `[0, 1]`.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (255.99 * c.clamp(0.0, 1.0)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Row-major image buffer, row 0 is the top scanline.
///
/// Colors are stored gamma-corrected with channels in RGB order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Merge job results into a new buffer.
    ///
    /// Results may arrive in any order. Every pixel must be written by
    /// exactly one result; duplicates, gaps and out-of-range indices are
    /// reported as [`RenderError::Coverage`].
    pub fn from_results(width: u32, height: u32, results: Vec<JobResult>) -> RenderResult<Self> {
        let mut image = Self::new(width, height);
        let mut written = vec![false; image.pixels.len()];

        for result in &results {
            if result.indices.len() != result.colors.len() {
                return Err(RenderError::Coverage(format!(
                    "job {} reported {} indices for {} colors",
                    result.job.index,
                    result.indices.len(),
                    result.colors.len()
                )));
            }

            for (index, color) in result.pixels() {
                match written.get_mut(index) {
                    None => {
                        return Err(RenderError::Coverage(format!(
                            "job {} wrote pixel {} outside a {}x{} image",
                            result.job.index, index, width, height
                        )));
                    }
                    Some(true) => {
                        return Err(RenderError::Coverage(format!(
                            "pixel {} written twice (again by job {})",
                            index, result.job.index
                        )));
                    }
                    Some(seen) => {
                        *seen = true;
                        image.pixels[index] = color;
                    }
                }
            }
        }

        if let Some(missing) = written.iter().position(|seen| !seen) {
            let total = written.iter().filter(|seen| !**seen).count();
            return Err(RenderError::Coverage(format!(
                "{} pixels never written, first is {}",
                total, missing
            )));
        }

        Ok(image)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Convert to packed 8-bit RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgb8(*c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{generate_row_jobs, Job};

    fn result_for(job: Job, color: Color) -> JobResult {
        let indices: Vec<usize> = job.pixel_indices().collect();
        let colors = vec![color; indices.len()];
        JobResult { job, indices, colors }
    }

    #[test]
    fn test_merge_out_of_order() {
        let mut results: Vec<JobResult> = generate_row_jobs(3, 4, 1, 1)
            .into_iter()
            .map(|job| {
                let shade = job.rows.start as f32 / 4.0;
                result_for(job, Color::splat(shade))
            })
            .collect();
        results.reverse();

        let image = ImageBuffer::from_results(3, 4, results).unwrap();
        assert_eq!(image.get(0, 0), Color::splat(0.0));
        assert_eq!(image.get(2, 3), Color::splat(0.75));
        assert_eq!(image.get(1, 2), Color::splat(0.5));
    }

    #[test]
    fn test_merge_rejects_duplicates() {
        let jobs = generate_row_jobs(2, 2, 1, 1);
        let results = vec![
            result_for(jobs[0].clone(), Color::ONE),
            result_for(jobs[1].clone(), Color::ONE),
            result_for(jobs[0].clone(), Color::ONE),
        ];

        assert!(matches!(
            ImageBuffer::from_results(2, 2, results),
            Err(RenderError::Coverage(_))
        ));
    }

    #[test]
    fn test_merge_rejects_gaps() {
        let jobs = generate_row_jobs(2, 2, 1, 1);
        let results = vec![result_for(jobs[0].clone(), Color::ONE)];

        assert!(matches!(
            ImageBuffer::from_results(2, 2, results),
            Err(RenderError::Coverage(_))
        ));
    }

    #[test]
    fn test_merge_rejects_out_of_range() {
        let job = generate_row_jobs(2, 2, 2, 1).remove(0);
        let results = vec![JobResult {
            job,
            indices: vec![0, 1, 2, 3, 4],
            colors: vec![Color::ONE; 5],
        }];

        assert!(ImageBuffer::from_results(2, 2, results).is_err());
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.5, 0.25, 2.0)), [127, 63, 255]);
        assert_eq!(color_to_rgb8(Color::new(-1.0, 0.1, 0.999)), [0, 25, 255]);
    }

    #[test]
    fn test_to_rgb8_layout() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(1, 0, Color::new(1.0, 0.0, 0.5));

        assert_eq!(image.to_rgb8(), vec![0, 0, 0, 255, 0, 127]);
    }
}
