//! Normalizer: turns an untrusted emotion-timeline payload into an
//! [`EmotionTimeline`] the dashboard can render.
//!
//! Stages run in a fixed order:
//!
//! ```text
//! project keys ─► required fields ─► scores ─► lengths ─► average
//!      ─► hours ─► insights ─► changes ─► date ─► EmotionTimeline
//! ```
//!
//! Only a strictly absent `timePoints` or `emotionScores` rejects the payload.
//! Every other anomaly is repaired in place and recorded as a [`Correction`].
//! A payload the stages cannot process at all (for example `timePoints` given
//! as a string) is routed to [`Normalizer::build_fallback`], so the caller
//! always gets either no data or a timeline that satisfies every invariant.
//!
//! Normalization is pure: the raw value is only borrowed and every output is
//! freshly allocated.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::config::NormalizerConfig;
use crate::types::{
    Correction, CorrectionReason, EmotionChange, EmotionTimeline, AVERAGE_SCORE, DATE,
    EMOTION_CHANGES, EMOTION_SCORES, INSIGHTS, NEGATIVE_HOURS, NEUTRAL_HOURS, POSITIVE_HOURS,
    TIME_POINTS,
};

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// Why a payload could not be normalized by the regular stages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    /// A required sequence is absent. The payload carries no usable data.
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
    /// A required sequence is present but is not a sequence.
    #[error("field `{field}` must be a sequence, found {found}")]
    NotASequence {
        field: &'static str,
        found: &'static str,
    },
}

impl NormalizationError {
    /// `true` for the one designed rejection path; everything else is an
    /// internal failure that the fallback absorbs.
    pub fn is_rejection(&self) -> bool {
        matches!(self, NormalizationError::MissingField(_))
    }
}

/// A successfully normalized timeline plus the trail of repairs made to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    pub timeline: EmotionTimeline,
    pub corrections: Vec<Correction>,
}

/// Result of [`Normalizer::normalize`]. Never an error from the caller's
/// point of view: either there is a timeline to render or there is no data.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// All stages completed.
    Normalized(Normalization),
    /// The stages failed unexpectedly; `timeline` is the degraded fallback.
    Fallback {
        timeline: EmotionTimeline,
        cause: NormalizationError,
    },
    /// Required data is absent; render the "no data" state.
    Rejected(NormalizationError),
}

impl Outcome {
    pub fn timeline(&self) -> Option<&EmotionTimeline> {
        match self {
            Outcome::Normalized(n) => Some(&n.timeline),
            Outcome::Fallback { timeline, .. } => Some(timeline),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn into_timeline(self) -> Option<EmotionTimeline> {
        match self {
            Outcome::Normalized(n) => Some(n.timeline),
            Outcome::Fallback { timeline, .. } => Some(timeline),
            Outcome::Rejected(_) => None,
        }
    }

    /// Corrections recorded by the regular stages. Empty for fallback and
    /// rejected outcomes.
    pub fn corrections(&self) -> &[Correction] {
        match self {
            Outcome::Normalized(n) => &n.corrections,
            _ => &[],
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Normalize with the default configuration and the system date.
///
/// Returns `None` when `timePoints` or `emotionScores` is absent.
pub fn normalize(raw: &Value) -> Option<EmotionTimeline> {
    Normalizer::default().normalize(raw).into_timeline()
}

/// Build the minimal fallback timeline with the default configuration.
pub fn build_fallback(raw: &Value) -> EmotionTimeline {
    Normalizer::default().build_fallback(raw)
}

/// Stateless timeline normalizer. Cheap to clone; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
    today: Option<NaiveDate>,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config, today: None }
    }

    /// Pin the date substituted for a missing `date` instead of reading the
    /// system clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Run every stage, falling back on internal failure. Total: never panics
    /// and never returns an error.
    pub fn normalize(&self, raw: &Value) -> Outcome {
        match self.run(raw) {
            Ok(normalization) => Outcome::Normalized(normalization),
            Err(err) if err.is_rejection() => {
                tracing::info!(error = %err, "rejected emotion timeline");
                Outcome::Rejected(err)
            }
            Err(err) => {
                tracing::warn!(error = %err, "emotion timeline normalization failed, using fallback");
                Outcome::Fallback {
                    timeline: self.build_fallback(raw),
                    cause: err,
                }
            }
        }
    }

    /// Run the stages without the fallback safety net.
    pub fn run(&self, raw: &Value) -> Result<Normalization, NormalizationError> {
        let fields = RawFields::project(raw);
        let mut trail = Trail::default();

        let time_points = require_sequence(TIME_POINTS, fields.time_points)?;
        let emotion_scores = require_sequence(EMOTION_SCORES, fields.emotion_scores)?;

        let mut time_points = coerce_labels(time_points, &mut trail);
        let mut emotion_scores = self.coerce_scores(emotion_scores, &mut trail);
        reconcile_lengths(&mut time_points, &mut emotion_scores, Some(&mut trail));

        let average_score = self.repair_average(&emotion_scores, fields.average_score, &mut trail);
        let (positive_hours, negative_hours, neutral_hours) = self.repair_hours(&fields, &mut trail);
        let insights = self.repair_insights(fields.insights, &mut trail);
        let emotion_changes = repair_changes(fields.emotion_changes, &mut trail);
        let date = self.repair_date(fields.date, &mut trail);

        Ok(Normalization {
            timeline: EmotionTimeline {
                time_points,
                emotion_scores,
                average_score,
                positive_hours,
                negative_hours,
                neutral_hours,
                insights,
                emotion_changes,
                date,
            },
            corrections: trail.corrections,
        })
    }

    /// Minimal but consistent timeline used when the regular stages fail.
    ///
    /// Reuses `timePoints`/`emotionScores` when both are sequences, otherwise
    /// a single `12:00` slot scored `0`. Hour buckets take their defaults,
    /// insights the placeholder, and emotion changes are dropped.
    pub fn build_fallback(&self, raw: &Value) -> EmotionTimeline {
        let fields = RawFields::project(raw);
        let mut scratch = Trail::default();

        let sequences = match (
            fields.time_points.and_then(Value::as_array),
            fields.emotion_scores.and_then(Value::as_array),
        ) {
            (Some(labels), Some(scores)) => Some((
                coerce_labels(labels, &mut scratch),
                self.coerce_scores(scores, &mut scratch),
            )),
            _ => None,
        };
        let (mut time_points, mut emotion_scores) = sequences
            .unwrap_or_else(|| (vec![self.config.fallback_time_label.clone()], vec![Some(0)]));
        reconcile_lengths(&mut time_points, &mut emotion_scores, None);

        let date = match fields.date {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => self.today(),
        };

        EmotionTimeline {
            average_score: mean_one_decimal(&emotion_scores),
            time_points,
            emotion_scores,
            positive_hours: self.config.default_positive_hours,
            negative_hours: self.config.default_negative_hours,
            neutral_hours: self.config.default_neutral_hours,
            insights: vec![self.config.placeholder_insight.clone()],
            emotion_changes: Vec::new(),
            date,
        }
    }

    fn today(&self) -> String {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
            .format("%Y-%m-%d")
            .to_string()
    }

    // -----------------------------------------------------------------------
    // Scores
    // -----------------------------------------------------------------------

    fn coerce_scores(&self, values: &[Value], trail: &mut Trail) -> Vec<Option<i32>> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| self.coerce_score(i, value, trail))
            .collect()
    }

    fn coerce_score(&self, index: usize, value: &Value, trail: &mut Trail) -> Option<i32> {
        let field = || format!("{EMOTION_SCORES}[{index}]");
        let number = match value {
            Value::Null => return None,
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) if s.eq_ignore_ascii_case("nan") => {
                trail.record(field(), value.clone(), 0, CorrectionReason::NanString);
                return Some(0);
            }
            Value::String(s) => match parse_float_prefix(s) {
                Some(parsed) if !parsed.is_nan() => {
                    trail.record(field(), value.clone(), number_value(parsed), CorrectionReason::StringParsed);
                    parsed
                }
                _ => {
                    trail.record(field(), value.clone(), 0, CorrectionReason::Unparseable);
                    return Some(0);
                }
            },
            _ => {
                trail.record(field(), value.clone(), 0, CorrectionReason::NonNumeric);
                return Some(0);
            }
        };

        if number.is_nan() {
            trail.record(field(), value.clone(), 0, CorrectionReason::NanValue);
            return Some(0);
        }

        let mut score = number;
        if score.is_finite() && score.fract() != 0.0 {
            let rounded = js_round(score);
            trail.record(field(), number_value(score), number_value(rounded), CorrectionReason::FloatRounded);
            score = rounded;
        }

        let clamped = score
            .max(f64::from(self.config.score_min))
            .min(f64::from(self.config.score_max));
        if clamped != score {
            trail.record(field(), number_value(score), number_value(clamped), CorrectionReason::RangeClamp);
        }
        Some(clamped as i32)
    }

    // -----------------------------------------------------------------------
    // Derived statistics
    // -----------------------------------------------------------------------

    fn repair_average(&self, scores: &[Option<i32>], raw: Option<&Value>, trail: &mut Trail) -> f64 {
        let candidate = mean_one_decimal(scores);
        let original = || raw.cloned().unwrap_or(Value::Null);

        match raw.and_then(Value::as_f64).filter(|x| x.is_finite()) {
            None => {
                trail.record(AVERAGE_SCORE, original(), number_value(candidate), CorrectionReason::AverageAdopted);
                candidate
            }
            Some(input) if self.exceeds_threshold(input, candidate) => {
                trail.record(AVERAGE_SCORE, original(), number_value(candidate), CorrectionReason::AverageOverridden);
                candidate
            }
            Some(input) => {
                let rounded = round_one_decimal(input);
                if rounded != input {
                    trail.record(AVERAGE_SCORE, original(), number_value(rounded), CorrectionReason::AverageRounded);
                }
                rounded
            }
        }
    }

    /// `|input - candidate| > threshold`. An input already at one decimal is
    /// compared at one-decimal precision, so binary noise in the subtraction
    /// cannot push a kept average over the threshold when it is re-normalized.
    fn exceeds_threshold(&self, input: f64, candidate: f64) -> bool {
        let diff = input - candidate;
        let diff = if round_one_decimal(input) == input {
            round_one_decimal(diff)
        } else {
            diff
        };
        diff.abs() > self.config.average_override_threshold
    }

    fn repair_hours(&self, fields: &RawFields<'_>, trail: &mut Trail) -> (f64, f64, f64) {
        let cfg = &self.config;
        let positive = hour_or_default(POSITIVE_HOURS, fields.positive_hours, cfg.default_positive_hours, trail);
        let negative = hour_or_default(NEGATIVE_HOURS, fields.negative_hours, cfg.default_negative_hours, trail);
        let mut neutral = hour_or_default(NEUTRAL_HOURS, fields.neutral_hours, cfg.default_neutral_hours, trail);

        // Neutral absorbs the remainder even when positive/negative are the
        // corrupt buckets; downstream labels depend on this exact policy.
        let total = positive + negative + neutral;
        if (total - cfg.day_hours).abs() > cfg.hour_tolerance {
            let adjusted = (cfg.day_hours - positive - negative).max(0.0);
            if adjusted != neutral {
                trail.record(NEUTRAL_HOURS, number_value(neutral), number_value(adjusted), CorrectionReason::HourRebalanced);
                neutral = adjusted;
            }
        }

        (positive, negative, neutral)
    }

    // -----------------------------------------------------------------------
    // Text fields
    // -----------------------------------------------------------------------

    fn repair_insights(&self, raw: Option<&Value>, trail: &mut Trail) -> Vec<String> {
        let kept: Vec<String> = match raw {
            Some(Value::Array(items)) => {
                let kept: Vec<String> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_owned)
                    .collect();
                if !kept.is_empty() && kept.len() != items.len() {
                    trail.record(INSIGHTS, Value::from(items.len()), Value::from(kept.len()), CorrectionReason::InsightDropped);
                }
                kept
            }
            _ => Vec::new(),
        };

        if kept.is_empty() {
            let placeholder = self.config.placeholder_insight.clone();
            trail.record(
                INSIGHTS,
                raw.cloned().unwrap_or(Value::Null),
                Value::from(vec![placeholder.clone()]),
                CorrectionReason::InsightsReplaced,
            );
            return vec![placeholder];
        }
        kept
    }

    fn repair_date(&self, raw: Option<&Value>, trail: &mut Trail) -> String {
        match raw {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => {
                let today = self.today();
                trail.record(DATE, raw.cloned().unwrap_or(Value::Null), today.as_str(), CorrectionReason::DateDefaulted);
                today
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Key projection
// ---------------------------------------------------------------------------

/// Borrowed view of the recognized keys of a raw payload. `null` counts as
/// absent.
#[derive(Debug, Default)]
struct RawFields<'a> {
    time_points: Option<&'a Value>,
    emotion_scores: Option<&'a Value>,
    average_score: Option<&'a Value>,
    positive_hours: Option<&'a Value>,
    negative_hours: Option<&'a Value>,
    neutral_hours: Option<&'a Value>,
    insights: Option<&'a Value>,
    emotion_changes: Option<&'a Value>,
    date: Option<&'a Value>,
}

impl<'a> RawFields<'a> {
    fn project(raw: &'a Value) -> Self {
        let mut fields = RawFields::default();
        let Some(map) = raw.as_object() else {
            tracing::debug!(kind = value_kind(raw), "raw emotion timeline is not an object");
            return fields;
        };

        for (key, value) in map {
            let present = (!value.is_null()).then_some(value);
            match key.as_str() {
                TIME_POINTS => fields.time_points = present,
                EMOTION_SCORES => fields.emotion_scores = present,
                AVERAGE_SCORE => fields.average_score = present,
                POSITIVE_HOURS => fields.positive_hours = present,
                NEGATIVE_HOURS => fields.negative_hours = present,
                NEUTRAL_HOURS => fields.neutral_hours = present,
                INSIGHTS => fields.insights = present,
                EMOTION_CHANGES => fields.emotion_changes = present,
                DATE => fields.date = present,
                other => tracing::debug!(key = other, "ignored unrecognized timeline key"),
            }
        }
        fields
    }
}

fn require_sequence<'a>(
    field: &'static str,
    value: Option<&'a Value>,
) -> Result<&'a [Value], NormalizationError> {
    match value {
        None => Err(NormalizationError::MissingField(field)),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(NormalizationError::NotASequence {
            field,
            found: value_kind(other),
        }),
    }
}

// ---------------------------------------------------------------------------
// Stage helpers
// ---------------------------------------------------------------------------

fn coerce_labels(values: &[Value], trail: &mut Trail) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::String(s) => s.clone(),
            other => {
                let label = match other {
                    Value::Number(_) | Value::Bool(_) => other.to_string(),
                    _ => String::new(),
                };
                trail.record(
                    format!("{TIME_POINTS}[{i}]"),
                    other.clone(),
                    label.as_str(),
                    CorrectionReason::TimeLabelCoerced,
                );
                label
            }
        })
        .collect()
}

/// Truncate both sequences to the shorter length. Never pads.
fn reconcile_lengths(labels: &mut Vec<String>, scores: &mut Vec<Option<i32>>, trail: Option<&mut Trail>) {
    if labels.len() == scores.len() {
        return;
    }
    let len = labels.len().min(scores.len());
    if let Some(trail) = trail {
        trail.record(
            EMOTION_SCORES,
            serde_json::json!({ TIME_POINTS: labels.len(), EMOTION_SCORES: scores.len() }),
            len,
            CorrectionReason::LengthTruncated,
        );
    }
    labels.truncate(len);
    scores.truncate(len);
}

fn hour_or_default(field: &'static str, raw: Option<&Value>, default: f64, trail: &mut Trail) -> f64 {
    match raw.and_then(Value::as_f64).filter(|x| x.is_finite()) {
        Some(hours) => hours,
        None => {
            trail.record(field, raw.cloned().unwrap_or(Value::Null), number_value(default), CorrectionReason::HourDefaulted);
            default
        }
    }
}

fn repair_changes(raw: Option<&Value>, trail: &mut Trail) -> Vec<EmotionChange> {
    let Some(Value::Array(items)) = raw else {
        trail.record(
            EMOTION_CHANGES,
            raw.cloned().unwrap_or(Value::Null),
            Value::Array(Vec::new()),
            CorrectionReason::ChangesReplaced,
        );
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let field = format!("{EMOTION_CHANGES}[{i}]");
            let Some((time, event, score)) = change_parts(item) else {
                trail.record(field, item.clone(), Value::Null, CorrectionReason::ChangeDropped);
                return None;
            };
            if item["score"].as_i64() != Some(score) {
                trail.record(format!("{field}.score"), item["score"].clone(), score, CorrectionReason::ChangeScoreRounded);
            }
            Some(EmotionChange {
                time: time.to_owned(),
                event: event.to_owned(),
                score,
            })
        })
        .collect()
}

/// `time`, `event` and the score rounded to an integer. `None` when a part is
/// missing or the score is not a finite number within `i64`.
fn change_parts(item: &Value) -> Option<(&str, &str, i64)> {
    let obj = item.as_object()?;
    let time = obj.get("time")?.as_str()?;
    let event = obj.get("event")?.as_str()?;
    let score = match obj.get("score")? {
        Value::Number(n) => match n.as_i64() {
            Some(exact) => return Some((time, event, exact)),
            None => n.as_f64()?,
        },
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    // i64::MAX is not representable; 2^63 is the first value past it.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    let rounded = js_round(score);
    (rounded.is_finite() && rounded >= -I64_BOUND && rounded < I64_BOUND)
        .then_some((time, event, rounded as i64))
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Round half toward positive infinity: `12.5 → 13`, `-12.5 → -12`.
///
/// Matches the rounding the dashboard's stored analytics were produced with;
/// `f64::round` would send `-12.5` to `-13`.
pub fn js_round(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Round to one decimal place with [`js_round`] semantics.
pub fn round_one_decimal(x: f64) -> f64 {
    js_round(x * 10.0) / 10.0
}

/// Mean of the measured scores rounded to one decimal, `0.0` when there are
/// none.
pub fn mean_one_decimal(scores: &[Option<i32>]) -> f64 {
    let (sum, count) = scores
        .iter()
        .flatten()
        .fold((0.0f64, 0usize), |(sum, count), s| (sum + f64::from(*s), count + 1));
    if count == 0 {
        0.0
    } else {
        round_one_decimal(sum / count as f64)
    }
}

/// Parse the longest numeric prefix of `s`, the way `parseFloat` does:
/// leading whitespace is skipped, trailing garbage ignored, and `Infinity`
/// accepted. `None` when no prefix is numeric.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("numeric prefix pattern is valid")
    });

    let m = re.find(s.trim_start())?;
    match m.as_str().trim_start_matches(['+', '-']) {
        "Infinity" if m.as_str().starts_with('-') => Some(f64::NEG_INFINITY),
        "Infinity" => Some(f64::INFINITY),
        _ => m.as_str().parse().ok(),
    }
}

/// JSON form of a number: integral values print without a fraction.
fn number_value(x: f64) -> Value {
    if x.fract() == 0.0 && x.abs() < 9.0e15 {
        Value::from(x as i64)
    } else {
        Value::from(x)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Correction trail
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Trail {
    corrections: Vec<Correction>,
}

impl Trail {
    fn record(
        &mut self,
        field: impl Into<String>,
        original: Value,
        corrected: impl Into<Value>,
        reason: CorrectionReason,
    ) {
        let correction = Correction {
            field: field.into(),
            original,
            corrected: corrected.into(),
            reason,
        };
        tracing::warn!(
            field = %correction.field,
            original = %correction.original,
            corrected = %correction.corrected,
            %reason,
            "corrected emotion timeline field"
        );
        self.corrections.push(correction);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
