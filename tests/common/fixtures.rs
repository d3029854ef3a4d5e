//! Static payload corpora used across harnesses.
//!
//! Each corpus is a `&'static [&'static str]` of JSON payloads shaped like
//! what the device pipeline actually writes to the local data store,
//! including the malformed variants seen in the wild.

use serde_json::Value;

/// Payloads that are already well-formed.
pub const CORPUS_CLEAN: &[&str] = &[
    r#"{"timePoints":[],"emotionScores":[],"averageScore":0,"positiveHours":8,"negativeHours":4,"neutralHours":12,"insights":["no activity"],"emotionChanges":[],"date":"2025-03-01"}"#,
    r#"{"timePoints":["09:00","09:30","10:00"],"emotionScores":[40,null,20],"averageScore":30,"positiveHours":10,"negativeHours":2,"neutralHours":12,"insights":["happy after breakfast"],"emotionChanges":[{"time":"09:30","event":"laugh","score":60}],"date":"2025-03-02"}"#,
    r#"{"timePoints":["20:00","20:30"],"emotionScores":[-35,-45],"averageScore":-40,"positiveHours":2,"negativeHours":6,"neutralHours":16,"insights":["fussy before bed","settled by 21:00"],"emotionChanges":[],"date":"2025-03-03"}"#,
];

/// Payloads with every kind of correctable anomaly.
pub const CORPUS_DIRTY: &[&str] = &[
    r#"{"timePoints":["09:00","09:30"],"emotionScores":[55.4,"NaN"],"date":"2025-03-01"}"#,
    r#"{"timePoints":["00:00","00:30","01:00","01:30","02:00"],"emotionScores":[150,-999,"12"],"averageScore":"high"}"#,
    r#"{"timePoints":["06:00"],"emotionScores":[null],"positiveHours":20,"negativeHours":20,"insights":["",42],"emotionChanges":"none"}"#,
    r#"{"timePoints":[600,"06:30",null],"emotionScores":[true,{"v":1},"  7.5 dB"],"averageScore":95,"date":""}"#,
    r#"{"timePoints":["07:00","07:30"],"emotionScores":[-12.5,12.5],"emotionChanges":[{"time":"07:00","event":"cry"},{"time":"07:10","event":"cry","score":"-80.2"}],"deviceId":"cam-01","soundEvents":{"cry":3}}"#,
];

/// Payloads the regular stages cannot process; the fallback takes over.
pub const CORPUS_BROKEN: &[&str] = &[
    r#"{"timePoints":"09:00","emotionScores":[1]}"#,
    r#"{"timePoints":["09:00"],"emotionScores":{"0":1},"date":"2025-03-04"}"#,
    r#"{"timePoints":42,"emotionScores":"NaN"}"#,
];

/// Payloads with no usable data at all.
pub const CORPUS_EMPTY: &[&str] = &[
    r#"{}"#,
    r#"{"timePoints":[]}"#,
    r#"{"emotionScores":[1,2,3]}"#,
    r#"{"timePoints":null,"emotionScores":[]}"#,
    r#"[]"#,
    r#"null"#,
    r#""timeline""#,
];

/// Parse a corpus entry. Panics on invalid JSON, which would be a fixture bug.
pub fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| panic!("fixture is not JSON ({e}): {raw}"))
}

/// A full day at 30-minute cadence with gaps every few hours and some noise,
/// for benchmark-sized inputs.
pub fn noisy_day(slots: usize) -> Value {
    let labels = super::half_hour_labels(slots);
    let scores: Vec<Value> = (0..slots)
        .map(|i| match i % 11 {
            0 => Value::Null,
            3 => Value::from("NaN"),
            5 => Value::from(format!("{}", i % 90)),
            7 => Value::from(i as f64 * 1.7 - 40.25),
            9 => Value::from(250),
            _ => Value::from((i as i64 * 13) % 120 - 60),
        })
        .collect();
    serde_json::json!({
        "timePoints": labels,
        "emotionScores": scores,
        "averageScore": 3,
        "positiveHours": 9,
        "negativeHours": 9,
        "insights": ["woke twice", ""],
        "emotionChanges": [
            { "time": "03:00", "event": "cry", "score": -70 },
            { "time": "07:00", "event": "laugh" },
        ],
        "date": "2025-03-05",
    })
}
