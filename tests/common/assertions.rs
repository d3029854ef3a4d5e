//! Domain-specific assertions for moodtrail harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* timeline invariant was violated.

use moodtrail::config::NormalizerConfig;
use moodtrail::normalizer::round_one_decimal;
use moodtrail::EmotionTimeline;
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Correction assertions
// ---------------------------------------------------------------------------

/// Assert that a normalization recorded a correction for `field` with the
/// given reason.
///
/// ```rust
/// assert_corrected!(n, "emotionScores[0]", CorrectionReason::RangeClamp);
/// ```
#[macro_export]
macro_rules! assert_corrected {
    ($normalization:expr, $field:expr, $reason:expr) => {{
        let n: &moodtrail::Normalization = &$normalization;
        let field: &str = $field;
        let reason: moodtrail::CorrectionReason = $reason;
        if !n
            .corrections
            .iter()
            .any(|c| c.field == field && c.reason == reason)
        {
            panic!(
                "assert_corrected! failed: no {:?} correction for {:?}\n  recorded: {:#?}",
                reason, field, n.corrections
            );
        }
    }};
}

/// Assert that a normalization recorded no corrections at all.
#[macro_export]
macro_rules! assert_untouched {
    ($normalization:expr) => {{
        let n: &moodtrail::Normalization = &$normalization;
        if !n.corrections.is_empty() {
            panic!(
                "assert_untouched! failed: {} corrections recorded\n  {:#?}",
                n.corrections.len(),
                n.corrections
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Timeline invariants
// ---------------------------------------------------------------------------

/// Assert every output invariant of a normalized timeline.
pub fn assert_timeline_invariants(t: &EmotionTimeline, cfg: &NormalizerConfig) {
    assert_eq!(
        t.time_points.len(),
        t.emotion_scores.len(),
        "timePoints and emotionScores must be index-aligned: {t:?}"
    );
    for (i, score) in t.emotion_scores.iter().enumerate() {
        if let Some(s) = score {
            assert!(
                (cfg.score_min..=cfg.score_max).contains(s),
                "emotionScores[{i}] = {s} outside [{}, {}]",
                cfg.score_min,
                cfg.score_max
            );
        }
    }
    assert!(
        t.average_score.is_finite() && round_one_decimal(t.average_score) == t.average_score,
        "averageScore must be finite with one decimal: {}",
        t.average_score
    );
    let total = t.hours_total();
    assert!(
        (total - cfg.day_hours).abs() <= cfg.hour_tolerance + 1e-9 || t.neutral_hours == 0.0,
        "hour buckets must sum to a day unless neutral is exhausted: {} + {} + {}",
        t.positive_hours,
        t.negative_hours,
        t.neutral_hours
    );
    assert!(!t.insights.is_empty(), "insights must not be empty");
    assert!(
        t.insights.iter().all(|s| !s.trim().is_empty()),
        "insights must not contain blanks: {:?}",
        t.insights
    );
    assert!(!t.date.trim().is_empty(), "date must not be empty");
}
