// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Solver configuration. Every field has a default so a partial TOML file (or
// none at all) is valid; command-line flags are layered on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DecaptchaError, Result};
use crate::types::{EmptyPolicy, StrategyKind, WhitespaceMode};

/// Parameters of the contrast-enhancement transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastSettings {
    /// Gain applied to every sample.
    pub alpha: f32,
    /// Offset added after the gain.
    pub beta: f32,
}

impl Default for ContrastSettings {
    fn default() -> Self {
        Self {
            alpha: 2.5,
            beta: 0.0,
        }
    }
}

/// Parameters of the background-subtraction transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    /// Directory of clean sample CAPTCHAs used to build the background model.
    pub sample_dir: PathBuf,
    /// Samples at or below this intensity are treated as foreground.
    pub threshold: u8,
    /// Appended to the image stem when naming the result file.
    pub output_suffix: String,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            sample_dir: PathBuf::from("sample_captchas"),
            threshold: 80,
            output_suffix: "_exp".into(),
        }
    }
}

/// How predictions are normalised before they hit disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub whitespace: WhitespaceMode,
    pub empty: EmptyPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Directory holding `text-detection.rten` and `text-recognition.rten`.
    /// `None` means the engine's default cache directory.
    pub model_dir: Option<PathBuf>,
}

/// Complete settings for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Directory of CAPTCHA images to read.
    pub input_dir: PathBuf,
    /// Directory that receives one `.txt` file per image.
    pub output_dir: PathBuf,
    pub strategy: StrategyKind,
    /// Stop after the first image (in sorted order).
    pub first_only: bool,
    pub contrast: ContrastSettings,
    pub background: BackgroundSettings,
    pub output: OutputSettings,
    pub ocr: OcrSettings,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("images_to_test"),
            output_dir: PathBuf::from("output"),
            strategy: StrategyKind::default(),
            first_only: false,
            contrast: ContrastSettings::default(),
            background: BackgroundSettings::default(),
            output: OutputSettings::default(),
            ocr: OcrSettings::default(),
        }
    }
}

impl SolverConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|err| DecaptchaError::Config(format!("malformed TOML: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            DecaptchaError::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject parameter values the transforms cannot honour.
    pub fn validate(&self) -> Result<()> {
        let ContrastSettings { alpha, beta } = self.contrast;
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(DecaptchaError::Config(format!(
                "contrast alpha must be a finite non-negative number, got {alpha}"
            )));
        }
        if !beta.is_finite() {
            return Err(DecaptchaError::Config(format!(
                "contrast beta must be finite, got {beta}"
            )));
        }
        if self.background.output_suffix.contains(['/', '\\']) {
            return Err(DecaptchaError::Config(format!(
                "output suffix may not contain path separators: {:?}",
                self.background.output_suffix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SolverConfig::default();
        assert_eq!(config.contrast.alpha, 2.5);
        assert_eq!(config.contrast.beta, 0.0);
        assert_eq!(config.background.threshold, 80);
        assert_eq!(config.strategy, StrategyKind::Contrast);
        assert_eq!(config.output.whitespace, WhitespaceMode::StripAll);
        assert_eq!(config.output.empty, EmptyPolicy::Blank);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SolverConfig::from_toml_str(
            r#"
            strategy = "background"

            [background]
            threshold = 100

            [output]
            empty = "sentinel"
            "#,
        )
        .expect("parse");

        assert_eq!(config.strategy, StrategyKind::Background);
        assert_eq!(config.background.threshold, 100);
        assert_eq!(config.background.output_suffix, "_exp");
        assert_eq!(config.output.empty, EmptyPolicy::Sentinel);
        assert_eq!(config.contrast.alpha, 2.5);
    }

    #[test]
    fn negative_alpha_is_rejected() {
        let err = SolverConfig::from_toml_str("[contrast]\nalpha = -1.0\n").unwrap_err();
        assert!(matches!(err, DecaptchaError::Config(_)));
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = SolverConfig::from_toml_str("strategy = \"magic\"\n").unwrap_err();
        assert!(matches!(err, DecaptchaError::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("decaptcha.toml");
        std::fs::write(&path, "input_dir = \"captchas\"\n").expect("write");

        let config = SolverConfig::load(&path).expect("load");
        assert_eq!(config.input_dir, PathBuf::from("captchas"));
    }
}
