// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Median background modelling and subtraction.
//
// The model is built once from a set of clean sample CAPTCHAs: for each pixel
// coordinate, the median of the sample values brighter than a threshold. Dark
// (foreground) samples are excluded so glyph strokes do not leak into the
// background. A target is then cleaned by taking the absolute difference to
// the model and stretching the result to the full 0..=255 range.

use std::path::{Path, PathBuf};

use decaptcha_core::error::{DecaptchaError, Result};
use image::{GrayImage, Luma};
use tracing::{debug, info, instrument, warn};

use crate::loader::CaptchaImage;

/// Value used where no sample passed the brightness threshold.
pub const BLANK_BACKGROUND: u8 = u8::MAX;

/// Default brightness threshold for sample masking.
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Builds a [`BackgroundModel`] from sample images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundModeler {
    /// Samples must be strictly greater than this to count as background.
    pub threshold: u8,
}

impl Default for BackgroundModeler {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl BackgroundModeler {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Load every path and build the model from the ones that decode.
    ///
    /// Undecodable files, and files whose dimensions differ from the first
    /// decoded sample, are skipped with a warning.
    #[instrument(skip_all, fields(samples = paths.len(), threshold = self.threshold))]
    pub fn build_from_paths(&self, paths: &[PathBuf]) -> Result<BackgroundModel> {
        let mut samples: Vec<GrayImage> = Vec::with_capacity(paths.len());

        for path in paths {
            let gray = match CaptchaImage::open(path) {
                Ok(image) => image.to_gray(),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable sample");
                    continue;
                }
            };

            if let Some(first) = samples.first() {
                if first.dimensions() != gray.dimensions() {
                    warn!(
                        path = %path.display(),
                        expected = ?first.dimensions(),
                        actual = ?gray.dimensions(),
                        "Skipping sample with mismatched dimensions"
                    );
                    continue;
                }
            }
            samples.push(gray);
        }

        if samples.is_empty() {
            return Err(DecaptchaError::NoValidSamples {
                attempted: paths.len(),
            });
        }

        info!(
            used = samples.len(),
            skipped = paths.len() - samples.len(),
            "Sample images loaded"
        );
        self.build(&samples)
    }

    /// Compute the per-pixel masked median over `samples`.
    ///
    /// All samples must share the dimensions of the first one.
    #[instrument(skip_all, fields(samples = samples.len(), threshold = self.threshold))]
    pub fn build(&self, samples: &[GrayImage]) -> Result<BackgroundModel> {
        let (width, height) = samples
            .first()
            .ok_or(DecaptchaError::NoValidSamples { attempted: 0 })?
            .dimensions();

        if let Some(odd) = samples.iter().find(|s| s.dimensions() != (width, height)) {
            return Err(DecaptchaError::DimensionMismatch {
                expected: (width, height),
                actual: odd.dimensions(),
            });
        }

        debug!(width, height, "Computing masked median background");

        let threshold = self.threshold;
        let mut valid: Vec<u8> = Vec::with_capacity(samples.len());
        let mut blank_pixels = 0usize;

        let background = GrayImage::from_fn(width, height, |x, y| {
            valid.clear();
            valid.extend(
                samples
                    .iter()
                    .map(|sample| sample.get_pixel(x, y).0[0])
                    .filter(|&value| value > threshold),
            );
            let value = median(&mut valid).unwrap_or_else(|| {
                blank_pixels += 1;
                BLANK_BACKGROUND
            });
            Luma([value])
        });

        debug!(blank_pixels, "Background model complete");
        Ok(BackgroundModel { image: background })
    }
}

/// Median of `values` (sorted in place). Even-length sets take the mean of
/// the two middle values, truncated.
fn median(values: &mut [u8]) -> Option<u8> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        let sum = u16::from(values[mid - 1]) + u16::from(values[mid]);
        Some((sum / 2) as u8)
    }
}

/// Estimated static background of a CAPTCHA family, one intensity per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundModel {
    image: GrayImage,
}

impl BackgroundModel {
    /// Wrap an existing grayscale image as a model.
    pub fn from_gray(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    /// Load `path` and subtract the model from it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn subtract_path(&self, path: impl AsRef<Path>) -> Result<GrayImage> {
        let image = CaptchaImage::open(path)?;
        self.subtract(&image)
    }

    /// `stretch(|gray(target) - model|)`.
    ///
    /// Fails with [`DecaptchaError::DimensionMismatch`] if the target does not
    /// have the model's dimensions.
    pub fn subtract(&self, target: &CaptchaImage) -> Result<GrayImage> {
        if target.dimensions() != self.dimensions() {
            return Err(DecaptchaError::DimensionMismatch {
                expected: self.dimensions(),
                actual: target.dimensions(),
            });
        }

        let gray = target.to_gray();
        let diff = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let target = gray.get_pixel(x, y).0[0];
            let background = self.image.get_pixel(x, y).0[0];
            Luma([target.abs_diff(background)])
        });
        Ok(stretch_min_max(&diff))
    }
}

/// Linearly rescale so the darkest pixel becomes 0 and the brightest 255.
///
/// Each sample maps to `v * scale + shift` in double precision, rounded half to
/// even, with `scale = 255 / (max - min)` and `shift = -min * scale`. A flat
/// image (zero range) maps to all zeros.
pub fn stretch_min_max(image: &GrayImage) -> GrayImage {
    let (min, max) = image
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    debug!(min, max, "Min-max stretch");

    if image.is_empty() || min >= max {
        return GrayImage::new(image.width(), image.height());
    }

    let scale = 255.0 / f64::from(max - min);
    let shift = -f64::from(min) * scale;
    let mut out = image.clone();
    for sample in out.iter_mut() {
        let stretched = (f64::from(*sample) * scale + shift).round_ties_even();
        *sample = stretched.clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gray(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [7]), Some(7));
        assert_eq!(median(&mut [200, 100, 150]), Some(150));
        assert_eq!(median(&mut [100, 101]), Some(100));
        assert_eq!(median(&mut [255, 255, 90, 91]), Some(173));
    }

    #[test]
    fn identical_bright_samples_reproduce_the_sample() {
        let mut sample = gray(6, 4, 120);
        sample.put_pixel(2, 1, Luma([250]));
        sample.put_pixel(5, 3, Luma([81]));
        let samples = vec![sample.clone(); 5];

        let model = BackgroundModeler::default().build(&samples).expect("build");
        assert_eq!(model.as_gray(), &sample);
    }

    #[test]
    fn all_dark_coordinate_is_blank() {
        let mut a = gray(3, 3, 200);
        let mut b = gray(3, 3, 210);
        a.put_pixel(1, 1, Luma([10]));
        b.put_pixel(1, 1, Luma([80]));

        let model = BackgroundModeler::new(80).build(&[a, b]).expect("build");
        assert_eq!(model.as_gray().get_pixel(1, 1).0[0], BLANK_BACKGROUND);
        assert_eq!(model.as_gray().get_pixel(0, 0).0[0], 205);
    }

    #[test]
    fn colour_samples_are_masked_on_rec601_luma() {
        let dir = tempfile::tempdir().expect("tempdir");
        let red = dir.path().join("red.png");
        RgbImage::from_pixel(2, 2, Rgb([255, 20, 20]))
            .save(&red)
            .expect("save");

        // Rec.601 luma of this red is 90, above the default threshold of 80.
        let model = BackgroundModeler::default()
            .build_from_paths(&[red])
            .expect("build");
        assert!(model.as_gray().pixels().all(|p| p.0[0] == 90));
    }

    #[test]
    fn colour_target_is_subtracted_on_rec601_luma() {
        let model = BackgroundModel::from_gray(gray(2, 1, 90));
        let mut target = RgbImage::from_pixel(2, 1, Rgb([255, 20, 20]));
        target.put_pixel(1, 0, Rgb([0, 0, 0]));

        let target = CaptchaImage::from_dynamic(image::DynamicImage::ImageRgb8(target));
        let cleaned = model.subtract(&target).expect("subtract");
        assert_eq!(cleaned.as_raw(), &vec![0, 255]);
    }

    #[test]
    fn dark_samples_are_excluded_from_median() {
        let mut samples = vec![gray(1, 1, 180), gray(1, 1, 190), gray(1, 1, 200)];
        // Glyph strokes at this pixel in two samples.
        samples.push(gray(1, 1, 5));
        samples.push(gray(1, 1, 12));

        let model = BackgroundModeler::default().build(&samples).expect("build");
        assert_eq!(model.as_gray().get_pixel(0, 0).0[0], 190);
    }

    #[test]
    fn build_rejects_mismatched_dimensions() {
        let err = BackgroundModeler::default()
            .build(&[gray(4, 4, 100), gray(5, 4, 100)])
            .unwrap_err();
        assert!(matches!(
            err,
            DecaptchaError::DimensionMismatch {
                expected: (4, 4),
                actual: (5, 4)
            }
        ));
    }

    #[test]
    fn build_with_no_samples_fails() {
        let err = BackgroundModeler::default().build(&[]).unwrap_err();
        assert!(matches!(err, DecaptchaError::NoValidSamples { .. }));
    }

    #[test]
    fn build_from_paths_skips_bad_and_mismatched_samples() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good_a = dir.path().join("a.png");
        let good_b = dir.path().join("b.png");
        let broken = dir.path().join("c.png");
        let wide = dir.path().join("d.png");
        gray(8, 4, 100).save(&good_a).expect("save");
        gray(8, 4, 140).save(&good_b).expect("save");
        std::fs::write(&broken, b"garbage").expect("write");
        gray(16, 4, 0).save(&wide).expect("save");

        let model = BackgroundModeler::default()
            .build_from_paths(&[good_a, good_b, broken, wide])
            .expect("build");
        assert_eq!(model.dimensions(), (8, 4));
        assert!(model.as_gray().pixels().all(|p| p.0[0] == 120));
    }

    #[test]
    fn build_from_paths_with_nothing_decodable_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broken = dir.path().join("broken.jpg");
        std::fs::write(&broken, b"garbage").expect("write");

        let err = BackgroundModeler::default()
            .build_from_paths(&[broken, dir.path().join("missing.png")])
            .unwrap_err();
        assert!(matches!(err, DecaptchaError::NoValidSamples { attempted: 2 }));
    }

    #[test]
    fn subtracting_a_constituent_sample_is_all_zero() {
        let mut sample = gray(10, 6, 150);
        sample.put_pixel(3, 3, Luma([220]));
        let model = BackgroundModeler::default()
            .build(&vec![sample.clone(); 3])
            .expect("build");

        let target = CaptchaImage::from_dynamic(image::DynamicImage::ImageLuma8(sample));
        let cleaned = model.subtract(&target).expect("subtract");
        assert_eq!(cleaned.dimensions(), (10, 6));
        assert!(cleaned.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn subtraction_stretches_to_full_range() {
        let model = BackgroundModel::from_gray(gray(3, 1, 200));
        let mut target = gray(3, 1, 200);
        target.put_pixel(0, 0, Luma([150])); // diff 50
        target.put_pixel(1, 0, Luma([100])); // diff 100
        // (2, 0) diff 0

        let target = CaptchaImage::from_dynamic(image::DynamicImage::ImageLuma8(target));
        let cleaned = model.subtract(&target).expect("subtract");
        // 50 * (255 / 100) lands just below 127.5
        assert_eq!(cleaned.as_raw(), &vec![127, 255, 0]);
    }

    #[test]
    fn subtract_rejects_mismatched_target() {
        let model = BackgroundModel::from_gray(gray(4, 4, 200));
        let target = CaptchaImage::from_dynamic(image::DynamicImage::ImageLuma8(gray(4, 5, 0)));

        let err = model.subtract(&target).unwrap_err();
        assert!(matches!(
            err,
            DecaptchaError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 5)
            }
        ));
    }

    #[test]
    fn subtract_path_missing_file_is_load_error() {
        let model = BackgroundModel::from_gray(gray(4, 4, 200));
        let err = model.subtract_path("/nonexistent/target.png").unwrap_err();
        assert!(matches!(err, DecaptchaError::Load { .. }));
    }

    #[test]
    fn stretch_of_flat_image_is_zero() {
        let out = stretch_min_max(&gray(5, 5, 42));
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }
}
