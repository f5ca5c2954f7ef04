// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pre-OCR pixel transforms — affine contrast enhancement, and median
// background modelling with subtraction and min-max stretch.

pub mod background;
pub mod contrast;

pub use background::{BackgroundModel, BackgroundModeler};
pub use contrast::ContrastEnhancer;
