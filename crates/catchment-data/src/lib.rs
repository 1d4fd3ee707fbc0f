//! Data layer for catchment analysis.
//!
//! Reads site export files, reshapes their records into a timestamp-indexed
//! table, and derives daily summaries and normalised tables from it.

pub mod aggregator;
pub mod analysis;
pub mod builder;
pub mod normalise;
pub mod reader;

pub use catchment_core as core;
