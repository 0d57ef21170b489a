// src/annotator.rs
//
// Second pass over the source video: frames classified as pressed get a
// solid rectangle over the marker's bounding box, everything else passes
// through untouched. The corrected sequence is consumed strictly
// index-by-index, so any disagreement with the video's frame count is a
// fatal consistency failure.

use crate::types::FrameResult;
use crate::video::{create_writer, VideoReader};
use anyhow::Result;
use opencv::{
    core::{Rect, Scalar},
    imgproc,
    prelude::*,
};
use std::path::Path;
use tracing::info;

/// Axis-aligned box covering the marker: center ± radius on both axes.
pub fn click_bounding_box(cx: i32, cy: i32, radius: i32) -> Rect {
    Rect::new(cx - radius, cy - radius, radius * 2, radius * 2)
}

/// Render the annotated copy of `video_path` at `output_path`. Returns the
/// number of frames written.
pub fn export_annotated(
    video_path: &Path,
    output_path: &Path,
    results: &[FrameResult],
) -> Result<u64> {
    let mut reader = VideoReader::open(video_path)?;

    if results.len() as i64 != reader.total_frames {
        anyhow::bail!(
            "frame sequence length {} does not match video frame count {}",
            results.len(),
            reader.total_frames
        );
    }

    let mut writer = create_writer(output_path, reader.width, reader.height, reader.fps)?;

    let highlight = Scalar::new(0.0, 255.0, 255.0, 0.0);
    let mut frames_written: u64 = 0;

    while let Some(mut frame) = reader.read_frame()? {
        let Some(record) = results.get(frames_written as usize) else {
            anyhow::bail!(
                "video yielded more frames than the {} analyzed records",
                results.len()
            );
        };

        if record.is_click {
            if let (Some((cx, cy)), Some(radius)) = (record.center, record.radius) {
                imgproc::rectangle(
                    &mut frame,
                    click_bounding_box(cx, cy, radius),
                    highlight,
                    -1,
                    imgproc::LINE_8,
                    0,
                )?;
            }
        }

        writer.write(&frame)?;
        frames_written += 1;
    }

    if frames_written as usize != results.len() {
        anyhow::bail!(
            "video ended after {} frame(s) but {} records were expected",
            frames_written,
            results.len()
        );
    }

    info!(
        "Annotated video written: {} ({} frames)",
        output_path.display(),
        frames_written
    );
    Ok(frames_written)
}
