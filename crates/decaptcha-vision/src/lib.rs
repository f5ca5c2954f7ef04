// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// decaptcha-vision — Pixel-level work for the decaptcha pipeline.
//
// Provides image loading and directory enumeration, the two pre-OCR transforms
// (contrast enhancement and median background subtraction), and the text
// recognition seam with its `ocrs`-backed implementation.

pub mod loader;
pub mod ocr;
pub mod transform;

// Re-export the primary items so callers can use `decaptcha_vision::CaptchaImage` etc.
pub use loader::{CaptchaImage, list_images};
pub use ocr::TextRecognizer;
pub use transform::background::{BackgroundModel, BackgroundModeler};
pub use transform::contrast::ContrastEnhancer;

#[cfg(feature = "ocr")]
pub use ocr::engine::{ModelKind, OcrModels, OcrsRecognizer};
