//! Core types for moodtrail-core.
//!
//! This module defines the normalized [`EmotionTimeline`] handed to the
//! dashboard, its [`EmotionChange`] events, and the [`Correction`] records the
//! normalizer emits for every repair it makes to an upstream payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Recognized payload keys
// ---------------------------------------------------------------------------

pub const TIME_POINTS: &str = "timePoints";
pub const EMOTION_SCORES: &str = "emotionScores";
pub const AVERAGE_SCORE: &str = "averageScore";
pub const POSITIVE_HOURS: &str = "positiveHours";
pub const NEGATIVE_HOURS: &str = "negativeHours";
pub const NEUTRAL_HOURS: &str = "neutralHours";
pub const INSIGHTS: &str = "insights";
pub const EMOTION_CHANGES: &str = "emotionChanges";
pub const DATE: &str = "date";

/// The nine keys that survive key projection, in output order.
pub const RECOGNIZED_KEYS: [&str; 9] = [
    TIME_POINTS,
    EMOTION_SCORES,
    AVERAGE_SCORE,
    POSITIVE_HOURS,
    NEGATIVE_HOURS,
    NEUTRAL_HOURS,
    INSIGHTS,
    EMOTION_CHANGES,
    DATE,
];

// ---------------------------------------------------------------------------
// Normalized timeline
// ---------------------------------------------------------------------------

/// A validated, internally consistent emotion timeline for one device and day.
///
/// Invariants upheld by the normalizer:
///
/// - `time_points.len() == emotion_scores.len()`, index-aligned.
/// - every score is `None` (no measurement) or an integer within the
///   configured score range.
/// - `average_score` is finite and rounded to one decimal place.
/// - `insights` is non-empty and holds no blank strings.
/// - `date` is non-empty.
///
/// Serializes with the same camelCase keys the dashboard reads, so a
/// normalized timeline can be fed back through the normalizer unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionTimeline {
    /// Categorical x-axis labels, nominally `HH:MM` at a 30-minute cadence.
    pub time_points: Vec<String>,
    /// Affect score per time point. `None` renders as a gap in the line.
    pub emotion_scores: Vec<Option<i32>>,
    pub average_score: f64,
    pub positive_hours: f64,
    pub negative_hours: f64,
    pub neutral_hours: f64,
    pub insights: Vec<String>,
    pub emotion_changes: Vec<EmotionChange>,
    /// Calendar day in `YYYY-MM-DD`.
    pub date: String,
}

impl EmotionTimeline {
    /// Number of time slots in the timeline.
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    /// Number of slots carrying an actual measurement.
    pub fn measured(&self) -> usize {
        self.emotion_scores.iter().filter(|s| s.is_some()).count()
    }

    /// Sum of the three hour buckets.
    pub fn hours_total(&self) -> f64 {
        self.positive_hours + self.negative_hours + self.neutral_hours
    }
}

/// A notable shift in mood during the day (e.g. a crying episode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionChange {
    pub time: String,
    pub event: String,
    pub score: i64,
}

// ---------------------------------------------------------------------------
// Corrections
// ---------------------------------------------------------------------------

/// One automatic repair applied to an upstream payload.
///
/// `field` names the repaired key, with an index suffix for sequence elements
/// (`emotionScores[3]`). `original` is the value as received (`null` when the
/// key was absent); `corrected` is what the normalizer substituted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub field: String,
    pub original: Value,
    pub corrected: Value,
    pub reason: CorrectionReason,
}

impl std::fmt::Display for Correction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} -> {} ({})",
            self.field, self.original, self.corrected, self.reason
        )
    }
}

/// Why a [`Correction`] was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionReason {
    /// The literal string `"NaN"` was coerced to zero.
    NanString,
    /// A numeric value was NaN and was coerced to zero.
    NanValue,
    /// A string had no numeric prefix and was coerced to zero.
    Unparseable,
    /// A numeric string was converted to a number.
    StringParsed,
    /// A boolean, array or object stood in for a score.
    NonNumeric,
    /// A fractional score was rounded to the nearest integer.
    FloatRounded,
    /// A score fell outside the allowed range and was clamped.
    RangeClamp,
    /// A non-string time label was converted to a string.
    TimeLabelCoerced,
    /// `timePoints` and `emotionScores` disagreed in length.
    LengthTruncated,
    /// `averageScore` was absent or non-numeric; the computed mean was used.
    AverageAdopted,
    /// `averageScore` diverged too far from the computed mean.
    AverageOverridden,
    /// `averageScore` carried more than one decimal place.
    AverageRounded,
    /// An hour bucket was absent or non-numeric.
    HourDefaulted,
    /// The hour buckets did not sum to a day; neutral absorbed the remainder.
    HourRebalanced,
    /// No usable insight remained; the placeholder was substituted.
    InsightsReplaced,
    /// Non-string or blank insights were removed.
    InsightDropped,
    /// `emotionChanges` was absent or not a sequence.
    ChangesReplaced,
    /// A malformed emotion-change entry was removed.
    ChangeDropped,
    /// An emotion-change score was converted to an integer.
    ChangeScoreRounded,
    /// `date` was absent or blank; today's date was used.
    DateDefaulted,
}

impl std::fmt::Display for CorrectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            CorrectionReason::NanString => "NaN string",
            CorrectionReason::NanValue => "NaN value",
            CorrectionReason::Unparseable => "unparseable string",
            CorrectionReason::StringParsed => "numeric string",
            CorrectionReason::NonNumeric => "non-numeric value",
            CorrectionReason::FloatRounded => "float rounded",
            CorrectionReason::RangeClamp => "range clamp",
            CorrectionReason::TimeLabelCoerced => "time label coerced",
            CorrectionReason::LengthTruncated => "length mismatch",
            CorrectionReason::AverageAdopted => "average computed",
            CorrectionReason::AverageOverridden => "average overridden",
            CorrectionReason::AverageRounded => "average rounded",
            CorrectionReason::HourDefaulted => "hour default",
            CorrectionReason::HourRebalanced => "hour rebalance",
            CorrectionReason::InsightsReplaced => "insights placeholder",
            CorrectionReason::InsightDropped => "insight dropped",
            CorrectionReason::ChangesReplaced => "changes replaced",
            CorrectionReason::ChangeDropped => "change dropped",
            CorrectionReason::ChangeScoreRounded => "change score rounded",
            CorrectionReason::DateDefaulted => "date default",
        };
        f.write_str(text)
    }
}
