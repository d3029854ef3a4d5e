//! moodtrail-core: emotion-timeline normalization for the family monitoring
//! dashboard.
//!
//! # Architecture
//!
//! ```text
//! Store ──► Normalizer ──► View ──► Summary
//!  (raw JSON)   (EmotionTimeline + corrections)
//! ```
//!
//! The normalizer is pure and synchronous. Everything upstream of it hands
//! over untrusted JSON; everything downstream may rely on the
//! [`EmotionTimeline`] invariants.

pub mod config;
pub mod normalizer;
pub mod store;
pub mod summary;
pub mod types;
pub mod view;

pub use normalizer::{build_fallback, normalize, Normalization, NormalizationError, Normalizer, Outcome};
pub use types::{Correction, CorrectionReason, EmotionChange, EmotionTimeline};
