// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch driver — runs a solver over every image in a directory.
//
// Failures are isolated per image: a file that cannot be decoded or read is
// recorded in the summary and the batch moves on. Problems with the
// directories themselves, or any run-scoped error a solver raises, abort the
// run.

use std::path::Path;

use decaptcha_core::diagnostics::{Scope, describe};
use decaptcha_core::error::Result;
use decaptcha_core::types::{ImageOutcome, RunSummary};
use decaptcha_vision::list_images;
use tracing::{error, info, instrument, warn};

use crate::solver::Solver;

/// Sequentially applies one [`Solver`] to a directory of images.
pub struct BatchDriver<'s> {
    solver: &'s dyn Solver,
    first_only: bool,
}

impl<'s> BatchDriver<'s> {
    pub fn new(solver: &'s dyn Solver) -> Self {
        Self {
            solver,
            first_only: false,
        }
    }

    /// Process only the first image in sorted order.
    pub fn first_only(mut self, first_only: bool) -> Self {
        self.first_only = first_only;
        self
    }

    /// Process every image in `input_dir`, writing results to `output_dir`
    /// (created if missing).
    ///
    /// Returns `Err` when the input directory is missing, the output
    /// directory cannot be created, or the solver raises a run-scoped error.
    /// Image-scoped failures are recorded in the summary.
    #[instrument(skip_all, fields(
        strategy = %self.solver.kind(),
        input = %input_dir.display(),
        output = %output_dir.display(),
    ))]
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<RunSummary> {
        let mut images = list_images(input_dir)?;
        std::fs::create_dir_all(output_dir)?;

        if self.first_only {
            images.truncate(1);
        }
        info!(count = images.len(), "Starting batch");

        let mut summary = RunSummary::new(self.solver.kind());
        for image_path in images {
            let output_path = self.solver.output_path(&image_path, output_dir);
            let name = display_name(&image_path);

            match self.solver.process(&image_path, &output_path) {
                Ok(prediction) => {
                    info!(file = %name, prediction = %prediction, "Processed");
                    summary.record(ImageOutcome::Succeeded {
                        file: image_path,
                        output: output_path,
                        prediction,
                    });
                }
                Err(err) => {
                    let diagnostic = describe(&err);
                    if diagnostic.scope == Scope::Run {
                        error!(
                            file = %name,
                            error = %diagnostic.message,
                            processed = summary.total(),
                            "Aborting batch"
                        );
                        return Err(err);
                    }
                    warn!(file = %name, error = %diagnostic.message, "Failed");
                    summary.record(ImageOutcome::Failed {
                        file: image_path,
                        error: diagnostic.one_line(),
                    });
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch complete"
        );
        Ok(summary)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
