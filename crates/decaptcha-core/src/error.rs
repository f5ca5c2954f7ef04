// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for decaptcha.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all decaptcha operations.
#[derive(Debug, Error)]
pub enum DecaptchaError {
    // -- Input discovery --
    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    // -- Image errors --
    #[error("failed to load image {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("no usable sample images for background modelling ({attempted} tried)")]
    NoValidSamples { attempted: usize },

    #[error("image is {}x{} but the background model is {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    // -- OCR --
    #[error("text recognition failed: {0}")]
    Recognition(String),

    // -- Output --
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DecaptchaError {
    /// Shorthand for a [`DecaptchaError::Load`] built from any displayable cause.
    pub fn load(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DecaptchaError>;
