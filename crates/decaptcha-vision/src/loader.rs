// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image loading and directory enumeration. Images are decoded with the `image`
// crate on every call; nothing is cached.

use std::path::{Path, PathBuf};

use decaptcha_core::error::{DecaptchaError, Result};
use image::{DynamicImage, GrayImage, Luma, Rgb};
use tracing::{debug, info, instrument};

/// File extensions accepted as CAPTCHA images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// A decoded CAPTCHA image.
///
/// Transforms never mutate the wrapped image; they borrow it and return a new
/// buffer.
#[derive(Debug, Clone)]
pub struct CaptchaImage {
    image: DynamicImage,
}

impl CaptchaImage {
    // -- Construction ---------------------------------------------------------

    /// Decode an image file.
    ///
    /// A missing path and undecodable content both surface as
    /// [`DecaptchaError::Load`].
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|err| DecaptchaError::load(path, err))?;
        info!(
            width = image.width(),
            height = image.height(),
            "Image loaded"
        );
        Ok(Self { image })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Whether the decoded image has a single luminance channel (with or
    /// without alpha).
    pub fn is_grayscale(&self) -> bool {
        !self.image.color().has_color()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Luminance copy of the image.
    ///
    /// Colour images use the Rec.601 weights `0.299 R + 0.587 G + 0.114 B`,
    /// rounded to nearest; the brightness threshold is calibrated on that
    /// scale. Single-channel images keep their stored luminance.
    pub fn to_gray(&self) -> GrayImage {
        if self.is_grayscale() {
            return self.image.to_luma8();
        }
        let rgb = self.image.to_rgb8();
        GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
            Luma([rec601_luma(r, g, b)])
        })
    }
}

fn rec601_luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    ((weighted + 500) / 1000) as u8
}

/// Whether `path` carries one of [`IMAGE_EXTENSIONS`].
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// List the image files directly inside `dir`, sorted by path.
///
/// Sub-directories and files with other extensions are skipped silently.
#[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub fn list_images(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DecaptchaError::MissingDirectory(dir.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_file(&path) {
            images.push(path);
        }
    }
    images.sort();

    debug!(count = images.len(), "Image files found");
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbImage, RgbaImage};

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_image_file(Path::new("a.PNG")));
        assert!(is_image_file(Path::new("b.Jpeg")));
        assert!(is_image_file(Path::new("c.jpg")));
        assert!(!is_image_file(Path::new("d.txt")));
        assert!(!is_image_file(Path::new("e.webp")));
        assert!(!is_image_file(Path::new("png")));
    }

    #[test]
    fn list_images_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let img = GrayImage::from_pixel(4, 4, Luma([255u8]));
        img.save(dir.path().join("b.png")).expect("save");
        img.save(dir.path().join("a.PNG")).expect("save");
        std::fs::write(dir.path().join("notes.txt"), "ignore me").expect("write");
        std::fs::create_dir(dir.path().join("nested.png")).expect("mkdir");

        let found = list_images(dir.path()).expect("list");
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
    }

    #[test]
    fn list_images_missing_directory() {
        let err = list_images("/nonexistent/decaptcha/input").unwrap_err();
        assert!(matches!(err, DecaptchaError::MissingDirectory(_)));
    }

    #[test]
    fn open_missing_file_is_load_error() {
        let err = CaptchaImage::open("/nonexistent/captcha.png").unwrap_err();
        assert!(matches!(err, DecaptchaError::Load { .. }));
    }

    #[test]
    fn open_garbage_is_load_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").expect("write");

        let err = CaptchaImage::open(&path).unwrap_err();
        assert!(matches!(err, DecaptchaError::Load { .. }));
    }

    #[test]
    fn colour_luma_uses_rec601_weights() {
        assert_eq!(rec601_luma(255, 20, 20), 90);
        assert_eq!(rec601_luma(0, 255, 0), 150);
        assert_eq!(rec601_luma(0, 0, 255), 29);
        assert_eq!(rec601_luma(255, 255, 255), 255);
        assert_eq!(rec601_luma(0, 0, 0), 0);

        let red = CaptchaImage::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            2,
            Rgba([255, 20, 20, 255]),
        )));
        assert!(red.to_gray().pixels().all(|p| p.0[0] == 90));
    }

    #[test]
    fn single_channel_luma_is_kept() {
        let gray = CaptchaImage::from_dynamic(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            3,
            1,
            Luma([77u8]),
        )));
        assert!(gray.to_gray().pixels().all(|p| p.0[0] == 77));
    }

    #[test]
    fn color_and_gray_detection() {
        let color = CaptchaImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            2,
            2,
            Rgb([10, 20, 30]),
        )));
        let gray = CaptchaImage::from_dynamic(DynamicImage::ImageLuma8(GrayImage::new(2, 2)));
        assert!(!color.is_grayscale());
        assert!(gray.is_grayscale());
        assert_eq!(color.dimensions(), (2, 2));
    }
}
