// src/video.rs

use anyhow::Result;
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

pub struct VideoReader {
    cap: VideoCapture,
    pub fps: f64,
    pub total_frames: i64,
    pub current_frame: i64,
    pub width: i32,
    pub height: i32,
}

impl VideoReader {
    pub fn open(path: &Path) -> Result<Self> {
        let cap = VideoCapture::from_file(path.to_string_lossy().as_ref(), videoio::CAP_ANY)?;

        if !cap.is_opened()? {
            anyhow::bail!("failed to open video file {}", path.display());
        }

        let fps = cap.get(videoio::CAP_PROP_FPS)?;
        let total_frames = cap.get(videoio::CAP_PROP_FRAME_COUNT)? as i64;
        let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;

        info!(
            "Video properties: {}x{} @ {:.1} FPS, {} frames",
            width, height, fps, total_frames
        );

        Ok(Self {
            cap,
            fps,
            total_frames,
            current_frame: 0,
            width,
            height,
        })
    }

    /// Read the next frame. A decode failure mid-stream reads as end of
    /// stream; whatever was produced so far stays valid.
    pub fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut mat = Mat::default();
        if !self.cap.read(&mut mat)? || mat.empty() {
            return Ok(None);
        }
        self.current_frame += 1;
        Ok(Some(mat))
    }

    pub fn progress(&self) -> f32 {
        if self.total_frames == 0 {
            return 0.0;
        }
        (self.current_frame as f32 / self.total_frames as f32) * 100.0
    }
}

pub fn create_writer(path: &Path, width: i32, height: i32, fps: f64) -> Result<VideoWriter> {
    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
    let writer = VideoWriter::new(
        path.to_string_lossy().as_ref(),
        fourcc,
        fps,
        Size::new(width, height),
        true,
    )?;

    if !writer.is_opened()? {
        anyhow::bail!("failed to create video writer for {}", path.display());
    }

    Ok(writer)
}

pub fn find_video_files(dir: &str) -> Result<Vec<PathBuf>> {
    let mut videos = Vec::new();

    let video_extensions = ["mp4", "avi", "mov", "mkv", "MP4", "AVI", "MOV", "MKV"];

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if video_extensions.contains(&ext.to_str().unwrap_or("")) {
                videos.push(path.to_path_buf());
            }
        }
    }

    videos.sort();
    info!("Found {} video files", videos.len());
    Ok(videos)
}

/// Wall-clock position of a frame as `mm:ss.mmm`, for per-frame diagnostics.
pub fn format_timestamp(timestamp_ms: f64) -> String {
    let total_seconds = (timestamp_ms / 1000.0) as u64;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let milliseconds = (timestamp_ms as u64) % 1000;
    format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
}
