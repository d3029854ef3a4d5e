//! moodtrail: inspect and normalize emotion timelines from the family
//! monitoring dashboard's local data store.
//!
//! This crate re-exports [`moodtrail_core`] so integration tests and the CLI
//! share one import path, and adds plain-text rendering for the terminal.
//!
//! # Architecture
//!
//! ```text
//! Store ──► Normalizer ──► View ──► Summary ──► report
//! ```

pub mod report;

pub use moodtrail_core::*;
