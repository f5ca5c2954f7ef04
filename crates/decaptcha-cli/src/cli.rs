// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and their merge onto `SolverConfig`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use decaptcha_core::config::SolverConfig;
use decaptcha_core::error::Result;
use decaptcha_core::types::StrategyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Contrast,
    Background,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Contrast => StrategyKind::Contrast,
            StrategyArg::Background => StrategyKind::Background,
        }
    }
}

/// Read CAPTCHA images, clean them up, run OCR and write one prediction file per image.
#[derive(Parser, Debug)]
#[command(name = "decaptcha", author, version, about, long_about = None)]
pub struct Args {
    /// Folder containing CAPTCHA images [default: images_to_test]
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Folder to store prediction text files [default: output]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Pixel transform applied before OCR [default: contrast]
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Folder of clean sample CAPTCHAs for the background strategy [default: sample_captchas]
    #[arg(long)]
    pub samples: Option<PathBuf>,

    /// Contrast gain [default: 2.5]
    #[arg(long)]
    pub alpha: Option<f32>,

    /// Contrast offset [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    pub beta: Option<f32>,

    /// Brightness threshold for background sample masking [default: 80]
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Directory containing the OCR detection and recognition models
    #[arg(long)]
    pub models: Option<PathBuf>,

    /// TOML configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Only process the first image (sorted by name)
    #[arg(long)]
    pub first_only: bool,
}

impl Args {
    /// Load the config file (if any) and apply the flags on top.
    pub fn into_config(self) -> Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::load(path)?,
            None => SolverConfig::default(),
        };

        if let Some(input) = self.input {
            config.input_dir = input;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy.into();
        }
        if let Some(samples) = self.samples {
            config.background.sample_dir = samples;
        }
        if let Some(alpha) = self.alpha {
            config.contrast.alpha = alpha;
        }
        if let Some(beta) = self.beta {
            config.contrast.beta = beta;
        }
        if let Some(threshold) = self.threshold {
            config.background.threshold = threshold;
        }
        if let Some(models) = self.models {
            config.ocr.model_dir = Some(models);
        }
        if self.first_only {
            config.first_only = true;
        }

        config.validate()?;
        Ok(config)
    }
}
