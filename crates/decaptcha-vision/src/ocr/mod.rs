// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition seam.
//
// The pipeline only needs "pixels in, text fragments out". The `ocrs`-backed
// engine lives in `engine` behind the `ocr` feature; tests and other callers
// can supply their own recognizer.

#[cfg(feature = "ocr")]
pub mod engine;

use decaptcha_core::error::Result;
use image::DynamicImage;

/// Anything that can read text out of an image.
///
/// Implementations are constructed once per run and shared by reference, so
/// `recognize` takes `&self`. Confidence scores and bounding boxes are not part
/// of the contract.
pub trait TextRecognizer {
    /// Recognise text in `image`, returning fragments in reading order.
    ///
    /// Failures are reported as [`DecaptchaError::Recognition`](decaptcha_core::DecaptchaError::Recognition).
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>>;
}

impl<R: TextRecognizer + ?Sized> TextRecognizer for &R {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>> {
        (**self).recognize(image)
    }
}

impl<R: TextRecognizer + ?Sized> TextRecognizer for Box<R> {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>> {
        (**self).recognize(image)
    }
}
