// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Solver strategies. Each one is Load -> Transform -> Recognize -> Write for a
// single image; they differ only in the transform.

use std::path::{Path, PathBuf};

use decaptcha_core::config::{BackgroundSettings, ContrastSettings};
use decaptcha_core::error::Result;
use decaptcha_core::types::{Prediction, StrategyKind};
use decaptcha_vision::{
    BackgroundModel, BackgroundModeler, CaptchaImage, ContrastEnhancer, TextRecognizer,
    list_images,
};
use image::DynamicImage;
use tracing::{info, instrument};

use crate::writer::ResultWriter;

/// Turns one CAPTCHA image file into one prediction file.
pub trait Solver {
    fn kind(&self) -> StrategyKind;

    /// Suffix appended to the image stem when naming the result file.
    fn output_suffix(&self) -> &str {
        ""
    }

    /// `<output_dir>/<stem><suffix>.txt`
    fn output_path(&self, image_path: &Path, output_dir: &Path) -> PathBuf {
        let stem = image_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        output_dir.join(format!("{stem}{}.txt", self.output_suffix()))
    }

    /// Run the full pipeline for `image_path` and write the prediction to
    /// `output_path`.
    fn process(&self, image_path: &Path, output_path: &Path) -> Result<Prediction>;
}

/// Affine contrast enhancement before OCR.
pub struct ContrastSolver<'r> {
    recognizer: &'r dyn TextRecognizer,
    enhancer: ContrastEnhancer,
    writer: ResultWriter,
}

impl<'r> ContrastSolver<'r> {
    pub fn new(
        recognizer: &'r dyn TextRecognizer,
        enhancer: ContrastEnhancer,
        writer: ResultWriter,
    ) -> Self {
        Self {
            recognizer,
            enhancer,
            writer,
        }
    }

    pub fn from_settings(
        recognizer: &'r dyn TextRecognizer,
        settings: &ContrastSettings,
        writer: ResultWriter,
    ) -> Self {
        Self::new(recognizer, ContrastEnhancer::from_settings(settings), writer)
    }
}

impl Solver for ContrastSolver<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Contrast
    }

    #[instrument(skip_all, fields(strategy = "contrast", image = %image_path.display()))]
    fn process(&self, image_path: &Path, output_path: &Path) -> Result<Prediction> {
        let image = CaptchaImage::open(image_path)?;
        let enhanced = self.enhancer.apply(&image);
        let fragments = self.recognizer.recognize(&enhanced)?;
        let prediction = self.writer.write(&fragments, output_path)?;
        info!(prediction = %prediction, "Image solved");
        Ok(prediction)
    }
}

/// Median background subtraction before OCR.
///
/// The background model is built once, when the solver is constructed, and
/// reused for every image.
pub struct BackgroundSolver<'r> {
    recognizer: &'r dyn TextRecognizer,
    model: BackgroundModel,
    writer: ResultWriter,
    output_suffix: String,
}

impl<'r> BackgroundSolver<'r> {
    pub fn new(
        recognizer: &'r dyn TextRecognizer,
        model: BackgroundModel,
        writer: ResultWriter,
        output_suffix: impl Into<String>,
    ) -> Self {
        Self {
            recognizer,
            model,
            writer,
            output_suffix: output_suffix.into(),
        }
    }

    /// Build the background model from `settings.sample_dir` and wrap it.
    #[instrument(skip_all, fields(samples = %settings.sample_dir.display(), threshold = settings.threshold))]
    pub fn from_settings(
        recognizer: &'r dyn TextRecognizer,
        settings: &BackgroundSettings,
        writer: ResultWriter,
    ) -> Result<Self> {
        let sample_paths = list_images(&settings.sample_dir)?;
        let model = BackgroundModeler::new(settings.threshold).build_from_paths(&sample_paths)?;
        info!(dimensions = ?model.dimensions(), "Background model ready");
        Ok(Self::new(
            recognizer,
            model,
            writer,
            settings.output_suffix.clone(),
        ))
    }

    pub fn model(&self) -> &BackgroundModel {
        &self.model
    }
}

impl Solver for BackgroundSolver<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Background
    }

    fn output_suffix(&self) -> &str {
        &self.output_suffix
    }

    #[instrument(skip_all, fields(strategy = "background", image = %image_path.display()))]
    fn process(&self, image_path: &Path, output_path: &Path) -> Result<Prediction> {
        let cleaned = self.model.subtract_path(image_path)?;
        let fragments = self
            .recognizer
            .recognize(&DynamicImage::ImageLuma8(cleaned))?;
        let prediction = self.writer.write(&fragments, output_path)?;
        info!(prediction = %prediction, "Image solved");
        Ok(prediction)
    }
}
