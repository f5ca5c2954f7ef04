// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the decaptcha pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Text content written for a single CAPTCHA image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction(pub String);

impl Prediction {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which pixel transform runs before OCR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Affine intensity rescale (`alpha * v + beta`).
    #[default]
    Contrast,
    /// Median background model, absolute difference, min-max stretch.
    Background,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contrast => f.write_str("contrast"),
            Self::Background => f.write_str("background"),
        }
    }
}

/// How recognised fragments are cleaned before writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitespaceMode {
    /// Remove every whitespace character, including internal spaces and newlines.
    #[default]
    StripAll,
    /// Only trim leading and trailing whitespace.
    Trim,
}

/// What to write when nothing was recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPolicy {
    /// Write an empty file.
    #[default]
    Blank,
    /// Write [`EMPTY_SENTINEL`].
    Sentinel,
}

/// Placeholder written under [`EmptyPolicy::Sentinel`].
pub const EMPTY_SENTINEL: &str = "No text detected";

/// Result of processing one image in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageOutcome {
    Succeeded {
        file: PathBuf,
        output: PathBuf,
        prediction: Prediction,
    },
    Failed {
        file: PathBuf,
        /// One-line diagnostic for the failure.
        error: String,
    },
}

impl ImageOutcome {
    pub fn file(&self) -> &std::path::Path {
        match self {
            Self::Succeeded { file, .. } | Self::Failed { file, .. } => file,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// End-of-run report produced by the batch driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub strategy: StrategyKind,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<ImageOutcome>,
}

impl RunSummary {
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Append an outcome and update the counters.
    pub fn record(&mut self, outcome: ImageOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Serialise the summary as pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
