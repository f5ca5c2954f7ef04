// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `ocrs`-backed text recognizer (`ocr` feature). Both `.rten` models live in
// one directory, by default the cache that `ocrs-cli` downloads into.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use decaptcha_core::error::{DecaptchaError, Result};
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

use super::TextRecognizer;

/// The two networks the engine runs, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Detection,
    Recognition,
}

impl ModelKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ModelKind::Detection => "text-detection.rten",
            ModelKind::Recognition => "text-recognition.rten",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Detection => f.write_str("detection"),
            ModelKind::Recognition => f.write_str("recognition"),
        }
    }
}

/// `<cache>/ocrs`, where `<cache>` is `$XDG_CACHE_HOME` or `$HOME/.cache`.
/// Empty variables count as unset.
fn cache_model_dir(xdg_cache_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let present = |value: &OsString| !value.is_empty();
    xdg_cache_home
        .filter(present)
        .map(PathBuf::from)
        .or_else(|| home.filter(present).map(|home| Path::new(&home).join(".cache")))
        .map(|cache| cache.join("ocrs"))
        .unwrap_or_else(|| PathBuf::from("ocrs"))
}

pub fn default_model_dir() -> PathBuf {
    cache_model_dir(std::env::var_os("XDG_CACHE_HOME"), std::env::var_os("HOME"))
}

/// Directory holding both model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrModels {
    dir: PathBuf,
}

impl OcrModels {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `dir` if configured, [`default_model_dir`] otherwise.
    pub fn locate(dir: Option<&Path>) -> Self {
        Self::in_dir(dir.map_or_else(default_model_dir, Path::to_path_buf))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, kind: ModelKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Read one model, failing with a hint when the file is absent.
    fn load(&self, kind: ModelKind) -> Result<Model> {
        let path = self.path(kind);
        if !path.is_file() {
            return Err(DecaptchaError::Recognition(format!(
                "{kind} model not found at {}; run `ocrs-cli` once to download models",
                path.display()
            )));
        }

        info!(%kind, path = %path.display(), "Loading OCR model");
        Model::load_file(&path).map_err(|err| {
            DecaptchaError::Recognition(format!(
                "{kind} model at {} is unusable: {err}",
                path.display()
            ))
        })
    }
}

/// Wrap an `ocrs` failure at `stage` as a recognition error.
fn failed<E: fmt::Display>(stage: &'static str) -> impl FnOnce(E) -> DecaptchaError {
    move |err| DecaptchaError::Recognition(format!("{stage} failed: {err}"))
}

/// Text recognizer backed by the pure-Rust `ocrs` engine. Model loading
/// dominates start-up, so one instance serves the whole run.
pub struct OcrsRecognizer {
    engine: OcrsEngine,
}

impl OcrsRecognizer {
    #[instrument(skip_all, fields(models = %models.dir().display()))]
    pub fn new(models: &OcrModels) -> Result<Self> {
        let params = OcrEngineParams {
            detection_model: Some(models.load(ModelKind::Detection)?),
            recognition_model: Some(models.load(ModelKind::Recognition)?),
            ..Default::default()
        };
        let engine = OcrsEngine::new(params).map_err(failed("OCR engine initialisation"))?;

        info!("OCR engine ready");
        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    /// Detect words, group them into lines and return one fragment per
    /// non-empty line.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height))
            .map_err(failed("image conversion"))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(failed("preprocessing"))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(failed("word detection"))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        debug!(
            words = word_rects.len(),
            lines = line_rects.len(),
            "Text regions found"
        );

        let line_texts = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(failed("line recognition"))?;

        let fragments: Vec<String> = line_texts
            .iter()
            .flatten()
            .map(|line| line.to_string())
            .filter(|text| !text.trim().is_empty())
            .collect();

        debug!(fragments = fragments.len(), "OCR complete");
        Ok(fragments)
    }
}
