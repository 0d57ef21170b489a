// src/main.rs

mod annotator;
mod classifier;
mod config;
mod corrector;
mod detector;
mod events;
mod refiner;
mod tracker;
mod types;
mod video;

use anyhow::Result;
use classifier::ClickClassifier;
use corrector::close_click_gaps;
use detector::RingDetector;
use events::{extract_click_events, frame_time_ms, save_events};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracker::RingTracker;
use types::{Config, FrameResult};
use video::{find_video_files, format_timestamp, VideoReader};

fn main() -> Result<()> {
    let config = Config::load("config.yaml")?;

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.clone())
        .init();

    info!("🖱️  Cursor Click Detection Starting");
    info!("✓ Configuration loaded");
    info!(
        "Detection thresholds: radius=[{}, {}], baseline={:.1}, shrink={:.1}",
        config.detection.radius_min,
        config.detection.radius_max,
        config.classifier.baseline_radius,
        config.classifier.shrink_threshold
    );

    let video_files = find_video_files(&config.video.input_dir)?;
    if video_files.is_empty() {
        error!("No video files found in {}", config.video.input_dir);
        return Ok(());
    }

    info!("Found {} video file(s) to process", video_files.len());
    std::fs::create_dir_all(&config.video.output_dir)?;

    for (idx, video_path) in video_files.iter().enumerate() {
        let output_path =
            Path::new(&config.video.output_dir).join(video_path.file_name().unwrap());

        // Re-runs over the same directory leave finished outputs untouched.
        if config.video.skip_existing && output_path.exists() {
            info!(
                "⏭️  Skipping {} (output already exists)",
                video_path.display()
            );
            continue;
        }

        info!("\n========================================");
        info!(
            "Processing video {}/{}: {}",
            idx + 1,
            video_files.len(),
            video_path.display()
        );
        info!("========================================\n");

        match process_video(video_path, &output_path, &config) {
            Ok(stats) => {
                info!("\n✓ Video processed successfully!");
                info!("  Total frames: {}", stats.total_frames);
                info!(
                    "  Detected frames: {} ({:.1}%)",
                    stats.detected_frames,
                    100.0 * stats.detected_frames as f64 / stats.total_frames.max(1) as f64
                );
                info!("  🖱️  Click frames: {}", stats.click_frames);
                info!("  🖱️  Click events: {}", stats.click_events);
                info!("  Processing Speed: {:.1} FPS", stats.avg_fps);
            }
            Err(e) => {
                error!("Failed to process video: {}", e);
            }
        }
    }

    Ok(())
}

struct ProcessingStats {
    total_frames: u64,
    detected_frames: u64,
    click_frames: u64,
    click_events: usize,
    avg_fps: f64,
}

fn process_video(
    video_path: &Path,
    output_path: &Path,
    config: &Config,
) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    // ── Pass 1: analyze ──────────────────────────────────────────────────
    let mut reader = VideoReader::open(video_path)?;
    let fps = reader.fps;

    let detector = RingDetector::new(config.detection.clone());
    let mut tracker = RingTracker::new(&config.detection);
    let classifier = ClickClassifier::new(config.classifier.clone());

    let mut results: Vec<FrameResult> = Vec::new();

    while let Some(frame) = reader.read_frame()? {
        let frame_index = results.len();
        let timestamp_ms = frame_time_ms(frame_index, fps);

        let record = match tracker.process_frame(&detector, &frame)? {
            Some(obs) => {
                let measurement = classifier.classify(&frame, &obs)?;
                debug!(
                    "[{}] radius: {}, cx: {}, cy: {}, center_std_dev: {:.2}{}",
                    format_timestamp(timestamp_ms),
                    obs.radius,
                    obs.cx,
                    obs.cy,
                    measurement.center_std_dev,
                    if measurement.is_click { " → CLICK" } else { "" }
                );
                FrameResult::observed(frame_index, obs, measurement.is_click)
            }
            None => {
                debug!("[{}] marker not detected", format_timestamp(timestamp_ms));
                FrameResult::missed(frame_index)
            }
        };
        results.push(record);

        if results.len() % 50 == 0 {
            info!(
                "Progress: {:.1}% ({}/{}) | Tracking: {}",
                reader.progress(),
                reader.current_frame,
                reader.total_frames,
                if tracker.is_locked() { "YES" } else { "NO" }
            );
        }
    }

    if results.len() as i64 != reader.total_frames {
        warn!(
            "Decoded {} frame(s) but the container reported {}",
            results.len(),
            reader.total_frames
        );
    }

    // ── Correction ───────────────────────────────────────────────────────
    let corrected = close_click_gaps(&results, classifier.baseline_radius());

    let events = extract_click_events(&corrected, fps);
    if config.video.save_events {
        let video_name = video_path.file_stem().unwrap().to_str().unwrap();
        let events_path = output_path.with_file_name(format!("{}_clicks.jsonl", video_name));
        save_events(&events, &events_path)?;
    }

    // ── Pass 2: render ───────────────────────────────────────────────────
    annotator::export_annotated(video_path, output_path, &corrected)?;

    let duration = start_time.elapsed();
    let total_frames = corrected.len() as u64;

    Ok(ProcessingStats {
        total_frames,
        detected_frames: corrected.iter().filter(|r| r.detected).count() as u64,
        click_frames: corrected.iter().filter(|r| r.is_click).count() as u64,
        click_events: events.len(),
        avg_fps: total_frames as f64 / duration.as_secs_f64().max(f64::EPSILON),
    })
}
