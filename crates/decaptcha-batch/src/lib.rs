// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// decaptcha-batch — Per-image solving and directory-level batch runs.
//
// A `Solver` turns one image file into one prediction file. Two strategies
// exist (contrast enhancement and background subtraction); the `BatchDriver`
// runs whichever one it is handed over a directory and collects a summary.

pub mod driver;
pub mod solver;
pub mod writer;

pub use driver::BatchDriver;
pub use solver::{BackgroundSolver, ContrastSolver, Solver};
pub use writer::ResultWriter;

#[cfg(test)]
pub(crate) mod testing;
