//! Dashboard derivations computed from a normalized [`EmotionTimeline`].
//!
//! None of this feeds back into normalization. The statistics panel reads
//! [`Summary`]; the chart draws one line piece per [`segments`] entry and
//! leaves gaps between them.

use serde::Serialize;

use crate::config::SummaryConfig;
use crate::normalizer::round_one_decimal;
use crate::types::EmotionTimeline;

/// Measurement coverage bucket shown next to the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Excellent,
    Good,
    Fair,
    Poor,
    NoData,
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Excellent => write!(f, "excellent"),
            Quality::Good => write!(f, "good"),
            Quality::Fair => write!(f, "fair"),
            Quality::Poor => write!(f, "poor"),
            Quality::NoData => write!(f, "no data"),
        }
    }
}

/// Which hour bucket dominated the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mood::Positive => write!(f, "positive"),
            Mood::Negative => write!(f, "negative"),
            Mood::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub slots: usize,
    pub measured: usize,
    /// Share of the expected day that carries a score, in percent.
    pub coverage_pct: f64,
    pub quality: Quality,
    pub average_score: f64,
    pub dominant_mood: Mood,
    pub segments: Vec<(usize, usize)>,
}

impl Summary {
    pub fn from_timeline(timeline: &EmotionTimeline, config: &SummaryConfig) -> Self {
        let measured = timeline.measured();
        let coverage_pct = coverage_pct(measured, config.expected_slots);
        Self {
            slots: timeline.len(),
            measured,
            coverage_pct,
            quality: quality(measured, coverage_pct, config),
            average_score: timeline.average_score,
            dominant_mood: dominant_mood(timeline),
            segments: segments(&timeline.emotion_scores),
        }
    }
}

pub fn coverage_pct(measured: usize, expected_slots: usize) -> f64 {
    if expected_slots == 0 {
        return 0.0;
    }
    round_one_decimal((measured as f64 / expected_slots as f64 * 100.0).min(100.0))
}

pub fn quality(measured: usize, coverage_pct: f64, config: &SummaryConfig) -> Quality {
    match coverage_pct {
        _ if measured == 0 => Quality::NoData,
        c if c >= config.excellent_pct => Quality::Excellent,
        c if c >= config.good_pct => Quality::Good,
        c if c >= config.fair_pct => Quality::Fair,
        _ => Quality::Poor,
    }
}

/// Ties go to neutral, then positive.
pub fn dominant_mood(timeline: &EmotionTimeline) -> Mood {
    let (p, n, u) = (
        timeline.positive_hours,
        timeline.negative_hours,
        timeline.neutral_hours,
    );
    if u >= p && u >= n {
        Mood::Neutral
    } else if p >= n {
        Mood::Positive
    } else {
        Mood::Negative
    }
}

/// Maximal runs of measured slots as inclusive `(start, end)` index pairs.
pub fn segments(scores: &[Option<i32>]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, score) in scores.iter().enumerate() {
        match (score, start) {
            (Some(_), None) => start = Some(i),
            (None, Some(s)) => {
                out.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, scores.len() - 1));
    }
    out
}
