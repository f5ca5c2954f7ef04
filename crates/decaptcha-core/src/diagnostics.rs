// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-line diagnostics for terminal output.
//
// Every error kind maps to a single summary line plus a short hint. The batch
// driver records image-scoped errors and moves on; a run-scoped error raised
// mid-batch stops the run.

use std::io::ErrorKind;

use crate::error::DecaptchaError;

/// How far an error reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only the current image is lost; the batch continues.
    Image,
    /// Nothing further can be processed.
    Run,
}

/// A concise, user-facing rendering of a [`DecaptchaError`].
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Summary line.
    pub message: String,
    /// What to try next.
    pub hint: String,
    pub scope: Scope,
}

impl Diagnostic {
    /// Render as `message (hint)` on a single line.
    pub fn one_line(&self) -> String {
        format!("{} ({})", self.message, self.hint)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.one_line())
    }
}

/// Convert an error into a [`Diagnostic`].
pub fn describe(err: &DecaptchaError) -> Diagnostic {
    match err {
        DecaptchaError::MissingDirectory(path) => Diagnostic {
            message: format!("directory {} does not exist", path.display()),
            hint: "check the --input / --samples paths".into(),
            scope: Scope::Run,
        },

        DecaptchaError::Load { path, reason } => Diagnostic {
            message: format!("could not decode {}: {reason}", file_name(path)),
            hint: "the file may be truncated or not a JPEG/PNG".into(),
            scope: Scope::Image,
        },

        DecaptchaError::NoValidSamples { attempted } => Diagnostic {
            message: format!("none of the {attempted} sample images could be used"),
            hint: "provide decodable samples that all share the same dimensions".into(),
            scope: Scope::Run,
        },

        DecaptchaError::DimensionMismatch { expected, actual } => Diagnostic {
            message: format!(
                "image is {}x{}, background model is {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            hint: "background subtraction needs images the same size as the samples".into(),
            scope: Scope::Image,
        },

        DecaptchaError::Recognition(detail) => Diagnostic {
            message: format!("text recognition failed: {detail}"),
            hint: "check that the OCR models are present and readable".into(),
            scope: Scope::Image,
        },

        DecaptchaError::Write { path, source } => Diagnostic {
            message: format!("could not write {}: {source}", path.display()),
            hint: "check that the output directory is writable".into(),
            scope: Scope::Image,
        },

        DecaptchaError::Config(detail) => Diagnostic {
            message: format!("invalid configuration: {detail}"),
            hint: "fix the flag or config file value".into(),
            scope: Scope::Run,
        },

        DecaptchaError::Io(io_err) => match io_err.kind() {
            ErrorKind::NotFound => Diagnostic {
                message: format!("file not found: {io_err}"),
                hint: "it may have been moved while the batch was running".into(),
                scope: Scope::Image,
            },
            ErrorKind::PermissionDenied => Diagnostic {
                message: format!("permission denied: {io_err}"),
                hint: "check file permissions".into(),
                scope: Scope::Image,
            },
            _ => Diagnostic {
                message: format!("I/O error: {io_err}"),
                hint: "the disk may be full".into(),
                scope: Scope::Image,
            },
        },

        DecaptchaError::Serialization(detail) => Diagnostic {
            message: format!("could not serialise run summary: {detail}"),
            hint: "please report this".into(),
            scope: Scope::Run,
        },
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
