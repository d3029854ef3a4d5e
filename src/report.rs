//! Plain-text rendering of a normalized timeline for the terminal.

use std::fmt::Write;

use moodtrail_core::summary::Summary;
use moodtrail_core::{Correction, EmotionTimeline};

/// Render a timeline, its derived summary and the corrections applied to it.
pub fn render(
    title: &str,
    timeline: &EmotionTimeline,
    summary: &Summary,
    corrections: &[Correction],
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{title} · {}", timeline.date)?;
    writeln!(
        out,
        "slots {}  measured {}  coverage {:.1}% ({})",
        summary.slots, summary.measured, summary.coverage_pct, summary.quality
    )?;
    writeln!(
        out,
        "average {:.1}  mood {}",
        timeline.average_score, summary.dominant_mood
    )?;
    writeln!(
        out,
        "hours   positive {:.1} / negative {:.1} / neutral {:.1}",
        timeline.positive_hours, timeline.negative_hours, timeline.neutral_hours
    )?;
    writeln!(out, "line    {}", sparkline(&timeline.emotion_scores))?;

    if !summary.segments.is_empty() {
        let spans: Vec<String> = summary
            .segments
            .iter()
            .map(|(start, end)| {
                let from = &timeline.time_points[*start];
                let to = &timeline.time_points[*end];
                if start == end {
                    from.clone()
                } else {
                    format!("{from}–{to}")
                }
            })
            .collect();
        writeln!(out, "spans   {}", spans.join(", "))?;
    }

    writeln!(out, "insights")?;
    for insight in &timeline.insights {
        writeln!(out, "  - {insight}")?;
    }

    if !timeline.emotion_changes.is_empty() {
        writeln!(out, "changes")?;
        for change in &timeline.emotion_changes {
            writeln!(out, "  {} {} ({:+})", change.time, change.event, change.score)?;
        }
    }

    if !corrections.is_empty() {
        writeln!(out, "corrections {}", corrections.len())?;
        for correction in corrections {
            writeln!(out, "  {correction}")?;
        }
    }
    Ok(out)
}

/// One glyph per slot, low to high across the score range; gaps are spaces.
pub fn sparkline(scores: &[Option<i32>]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    scores
        .iter()
        .map(|score| match score {
            None => ' ',
            Some(s) => {
                let idx = ((i64::from(*s).clamp(-100, 100) + 100) * 7 / 200) as usize;
                BARS[idx]
            }
        })
        .collect()
}
