// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles shared by the unit tests in this crate.

use std::cell::RefCell;
use std::path::Path;

use decaptcha_core::error::{DecaptchaError, Result};
use decaptcha_vision::TextRecognizer;
use image::{DynamicImage, GrayImage, Luma};

/// Returns the same fragments for every image and remembers what it was shown.
pub struct FixedRecognizer {
    fragments: Vec<String>,
    pub seen: RefCell<Vec<DynamicImage>>,
}

impl FixedRecognizer {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl TextRecognizer for FixedRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>> {
        self.seen.borrow_mut().push(image.clone());
        Ok(self.fragments.clone())
    }
}

/// Always fails.
pub struct BrokenRecognizer;

impl TextRecognizer for BrokenRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<String>> {
        Err(DecaptchaError::Recognition("engine unavailable".into()))
    }
}

/// Save a uniform grayscale PNG.
pub fn save_gray(path: &Path, width: u32, height: u32, value: u8) {
    GrayImage::from_pixel(width, height, Luma([value]))
        .save(path)
        .expect("save test image");
}
