// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Affine contrast enhancement: every sample `v` becomes
// `clamp(round(alpha * v + beta), 0, 255)`, channel by channel.

use decaptcha_core::config::ContrastSettings;
use image::{DynamicImage, GrayImage, RgbImage};
use tracing::{debug, instrument};

use crate::loader::CaptchaImage;

/// Per-sample gain and offset applied before OCR.
///
/// Colour inputs come out as 8-bit RGB (the channel order the OCR engine
/// consumes); single-channel inputs stay grayscale. Alpha is dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastEnhancer {
    alpha: f32,
    beta: f32,
}

impl Default for ContrastEnhancer {
    fn default() -> Self {
        Self::from_settings(&ContrastSettings::default())
    }
}

impl ContrastEnhancer {
    pub fn new(alpha: f32, beta: f32) -> Self {
        Self { alpha, beta }
    }

    pub fn from_settings(settings: &ContrastSettings) -> Self {
        Self::new(settings.alpha, settings.beta)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn beta(&self) -> f32 {
        self.beta
    }

    /// Map a single 8-bit sample. Ties round to even.
    pub fn map_sample(&self, value: u8) -> u8 {
        let scaled = (self.alpha * f32::from(value) + self.beta).round_ties_even();
        // NaN falls through to 0 on the saturating cast.
        scaled.clamp(0.0, 255.0) as u8
    }

    /// Enhance an image, returning a new buffer.
    #[instrument(skip_all, fields(alpha = self.alpha, beta = self.beta, width = image.width(), height = image.height()))]
    pub fn apply(&self, image: &CaptchaImage) -> DynamicImage {
        // 256-entry lookup table; every pixel is then a single index.
        let lut: [u8; 256] = std::array::from_fn(|v| self.map_sample(v as u8));

        if image.is_grayscale() {
            let mut gray: GrayImage = image.to_gray();
            for sample in gray.iter_mut() {
                *sample = lut[usize::from(*sample)];
            }
            debug!("Enhanced grayscale image");
            DynamicImage::ImageLuma8(gray)
        } else {
            let mut rgb: RgbImage = image.as_dynamic().to_rgb8();
            for sample in rgb.iter_mut() {
                *sample = lut[usize::from(*sample)];
            }
            debug!("Enhanced colour image");
            DynamicImage::ImageRgb8(rgb)
        }
    }
}
