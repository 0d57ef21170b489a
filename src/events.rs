// src/events.rs

use crate::types::{ClickEvent, FrameResult};
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Collapse the corrected sequence into one event per maximal click run.
pub fn extract_click_events(results: &[FrameResult], fps: f64) -> Vec<ClickEvent> {
    let mut events = Vec::new();
    let mut run_start: Option<usize> = None;

    for (pos, record) in results.iter().enumerate() {
        match (record.is_click, run_start) {
            (true, None) => run_start = Some(pos),
            (false, Some(start)) => {
                events.push(build_event(&results[start..pos], fps));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        events.push(build_event(&results[start..], fps));
    }

    events
}

fn build_event(run: &[FrameResult], fps: f64) -> ClickEvent {
    let start_frame = run[0].frame_index;
    let end_frame = run[run.len() - 1].frame_index;
    ClickEvent {
        start_frame,
        end_frame,
        start_time_ms: frame_time_ms(start_frame, fps),
        end_time_ms: frame_time_ms(end_frame, fps),
        center: run.iter().find_map(|r| r.center),
    }
}

pub fn frame_time_ms(frame_index: usize, fps: f64) -> f64 {
    if fps <= 0.0 {
        return 0.0;
    }
    frame_index as f64 / fps * 1000.0
}

/// One JSON object per line, the artifact downstream tooling consumes.
pub fn save_events(events: &[ClickEvent], path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    for event in events {
        let line = serde_json::to_string(event)?;
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    info!("💾 {} click event(s) saved to {}", events.len(), path.display());
    Ok(())
}
