// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Prediction text files.

use std::path::Path;

use decaptcha_core::config::OutputSettings;
use decaptcha_core::error::{DecaptchaError, Result};
use decaptcha_core::types::{EMPTY_SENTINEL, EmptyPolicy, Prediction, WhitespaceMode};
use tracing::{debug, instrument};

/// Joins OCR fragments into a [`Prediction`] and writes it as the sole content
/// of a text file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultWriter {
    whitespace: WhitespaceMode,
    empty: EmptyPolicy,
}

impl ResultWriter {
    pub fn new(whitespace: WhitespaceMode, empty: EmptyPolicy) -> Self {
        Self { whitespace, empty }
    }

    pub fn from_settings(settings: &OutputSettings) -> Self {
        Self::new(settings.whitespace, settings.empty)
    }

    /// Concatenate `fragments` and apply the whitespace and empty-result
    /// policies.
    pub fn compose<S: AsRef<str>>(&self, fragments: &[S]) -> Prediction {
        let joined: String = fragments.iter().map(|fragment| fragment.as_ref()).collect();

        let text = match self.whitespace {
            WhitespaceMode::StripAll => joined.chars().filter(|c| !c.is_whitespace()).collect(),
            WhitespaceMode::Trim => joined.trim().to_owned(),
        };

        match (text.is_empty(), self.empty) {
            (true, EmptyPolicy::Sentinel) => Prediction(EMPTY_SENTINEL.to_owned()),
            _ => Prediction(text),
        }
    }

    /// Compose the prediction and write it to `path`, replacing any existing
    /// content.
    #[instrument(skip_all, fields(path = %path.display(), fragments = fragments.len()))]
    pub fn write<S: AsRef<str>>(&self, fragments: &[S], path: &Path) -> Result<Prediction> {
        let prediction = self.compose(fragments);
        std::fs::write(path, prediction.as_str()).map_err(|source| DecaptchaError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(chars = prediction.as_str().chars().count(), "Prediction written");
        Ok(prediction)
    }
}
