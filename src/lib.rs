//! Core library for the quizfix command line application.
//!
//! The library repairs a spreadsheet-backed multiple-choice question bank:
//! option cells that were collapsed onto one line or split one word per
//! line are rebuilt, and recorded answers are aligned with the options. The
//! repair pipeline lives under [`repair`] and is a pure function of the
//! table and the [`config::RepairConfig`]. Workbook adapters live under
//! [`io`], row types in [`model`], and the cleaned-file orchestration in
//! [`materialize`].

pub mod config;
pub mod error;
pub mod io;
pub mod materialize;
pub mod model;
pub mod repair;

pub use config::RepairConfig;
pub use error::{RepairError, Result};
pub use repair::{process, process_with_report, validate};
