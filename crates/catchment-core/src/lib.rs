//! Core types for catchment measurement analysis.
//!
//! Holds the [`table::Table`] data model, the raw record and statistic types,
//! timestamp handling, output formatting and the command-line settings shared
//! by the data and binary crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod table;
pub mod time_utils;

pub use error::{CatchmentError, Result};
pub use table::{Cell, DailyTable, Table, TimeTable};
