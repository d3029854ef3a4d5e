//! Test builders: ergonomic constructors for raw timeline payloads.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They build `serde_json::Value` payloads so a test can put
//! any shape, well-formed or not, under any key.

use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// RawTimelineBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for raw emotion-timeline payloads.
///
/// # Example
///
/// ```rust
/// let raw = RawTimelineBuilder::new()
///     .time_points(["09:00", "09:30"])
///     .scores(json!([55.4, "NaN"]))
///     .date("2025-03-01")
///     .build();
/// ```
#[derive(Debug, Default, Clone)]
pub struct RawTimelineBuilder {
    fields: Map<String, Value>,
}

impl RawTimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A day of `n` half-hour slots starting at midnight, all scored `score`.
    pub fn day(n: usize, score: i32) -> Self {
        Self::new()
            .time_points(half_hour_labels(n))
            .scores(Value::from(vec![score; n]))
    }

    pub fn time_points<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<Value> = labels.into_iter().map(|s| Value::String(s.into())).collect();
        self.field("timePoints", Value::Array(labels))
    }

    pub fn scores(self, scores: Value) -> Self {
        self.field("emotionScores", scores)
    }

    pub fn average(self, average: impl Into<Value>) -> Self {
        self.field("averageScore", average.into())
    }

    pub fn hours(self, positive: f64, negative: f64, neutral: f64) -> Self {
        self.field("positiveHours", json!(positive))
            .field("negativeHours", json!(negative))
            .field("neutralHours", json!(neutral))
    }

    pub fn insights<I, S>(self, insights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<Value> = insights.into_iter().map(|s| Value::String(s.into())).collect();
        self.field("insights", Value::Array(items))
    }

    pub fn change(mut self, time: &str, event: &str, score: impl Into<Value>) -> Self {
        let entry = json!({ "time": time, "event": event, "score": score.into() });
        match self.fields.get_mut("emotionChanges") {
            Some(Value::Array(items)) => items.push(entry),
            _ => {
                self.fields.insert("emotionChanges".into(), Value::Array(vec![entry]));
            }
        }
        self
    }

    pub fn date(self, date: &str) -> Self {
        self.field("date", Value::String(date.into()))
    }

    /// Set any key, recognized or not, to any value.
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.fields.remove(key);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// `n` labels at a 30-minute cadence: `00:00`, `00:30`, `01:00`, …
pub fn half_hour_labels(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("{:02}:{:02}", (i / 2) % 24, (i % 2) * 30))
        .collect()
}

/// A well-formed payload with `n` slots that needs no correction.
pub fn clean_payload(n: usize) -> Value {
    let scores: Vec<i32> = (0..n).map(|i| (i as i32 * 7) % 201 - 100).collect();
    let mean = if n == 0 {
        0.0
    } else {
        moodtrail::normalizer::mean_one_decimal(
            &scores.iter().copied().map(Some).collect::<Vec<_>>(),
        )
    };
    RawTimelineBuilder::new()
        .time_points(half_hour_labels(n))
        .scores(Value::from(scores))
        .average(mean)
        .hours(9.0, 3.0, 12.0)
        .insights(["steady day"])
        .field("emotionChanges", json!([]))
        .date("2025-03-01")
        .build()
}
