// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// decaptcha — batch CAPTCHA reader.
//
// Entry point. Initialises logging, resolves configuration, builds the OCR
// engine and the selected solver once, then hands them to the batch driver.
//
// Exit codes: 0 every image succeeded, 1 the run could not start or was
// aborted, 2 the run finished but some images failed.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use decaptcha_batch::{BackgroundSolver, BatchDriver, ContrastSolver, ResultWriter, Solver};
use decaptcha_core::config::SolverConfig;
use decaptcha_core::diagnostics::describe;
use decaptcha_core::error::{DecaptchaError, Result};
use decaptcha_core::types::{ImageOutcome, RunSummary, StrategyKind};
use decaptcha_vision::TextRecognizer;

use cli::Args;

const EXIT_FATAL: u8 = 1;
const EXIT_PARTIAL: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let summary_path = args.summary.clone();

    let summary = match args.into_config().and_then(|config| run(&config)) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("error: {}", describe(&err));
            return ExitCode::from(EXIT_FATAL);
        }
    };

    for outcome in &summary.outcomes {
        if let ImageOutcome::Failed { file, error } = outcome {
            eprintln!("failed: {}: {error}", file.display());
        }
    }

    if let Some(path) = summary_path {
        let written = summary.to_json().and_then(|json| {
            std::fs::write(&path, json).map_err(|source| DecaptchaError::Write {
                path: path.clone(),
                source,
            })
        });
        if let Err(err) = written {
            eprintln!("error: {}", describe(&err));
            return ExitCode::from(EXIT_FATAL);
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "decaptcha finished"
    );

    if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_PARTIAL)
    }
}

/// Build the recognizer and solver once, then run the batch.
fn run(config: &SolverConfig) -> Result<RunSummary> {
    tracing::info!(strategy = %config.strategy, "decaptcha starting");

    // Fail fast before the OCR models are loaded.
    if !config.input_dir.is_dir() {
        return Err(DecaptchaError::MissingDirectory(config.input_dir.clone()));
    }

    let recognizer = build_recognizer(config)?;
    let writer = ResultWriter::from_settings(&config.output);

    match config.strategy {
        StrategyKind::Contrast => {
            let solver = ContrastSolver::from_settings(&*recognizer, &config.contrast, writer);
            drive(&solver, config)
        }
        StrategyKind::Background => {
            let solver =
                BackgroundSolver::from_settings(&*recognizer, &config.background, writer)?;
            drive(&solver, config)
        }
    }
}

fn drive(solver: &dyn Solver, config: &SolverConfig) -> Result<RunSummary> {
    BatchDriver::new(solver)
        .first_only(config.first_only)
        .run(&config.input_dir, &config.output_dir)
}

#[cfg(feature = "ocr")]
fn build_recognizer(config: &SolverConfig) -> Result<Box<dyn TextRecognizer>> {
    use decaptcha_vision::{OcrModels, OcrsRecognizer};

    let models = OcrModels::locate(config.ocr.model_dir.as_deref());
    Ok(Box::new(OcrsRecognizer::new(&models)?))
}

#[cfg(not(feature = "ocr"))]
fn build_recognizer(_config: &SolverConfig) -> Result<Box<dyn TextRecognizer>> {
    Err(DecaptchaError::Recognition(
        "this build has no OCR engine; rebuild with `--features ocr`".into(),
    ))
}
