use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub video: VideoConfig,
    pub detection: DetectionConfig,
    pub classifier: ClassifierConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub skip_existing: bool,
    pub save_events: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Narrow HSV band calibrated to the marker color (H stable near 0).
    pub lower_hsv: [u8; 3],
    pub upper_hsv: [u8; 3],
    /// Side of the square structuring element for open/close cleanup.
    pub kernel_size: i32,
    pub hough_dp: f64,
    pub hough_param1: f64,
    pub hough_param2: f64,
    pub hough_min_radius: i32,
    pub hough_max_radius: i32,
    /// Acceptance gate on the refined radius; outside it the tracker unlocks.
    pub radius_min: i32,
    pub radius_max: i32,
    /// ROI side length as a multiple of the last known radius.
    pub roi_scale: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            lower_hsv: [0, 240, 170],
            upper_hsv: [2, 255, 185],
            kernel_size: 5,
            hough_dp: 1.2,
            hough_param1: 100.0,
            hough_param2: 25.0,
            hough_min_radius: 15,
            hough_max_radius: 80,
            radius_min: 21,
            radius_max: 30,
            roi_scale: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Marker radius when the pointer is idle.
    pub baseline_radius: f64,
    pub shrink_threshold: f64,
    pub std_dev_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            baseline_radius: 27.0,
            shrink_threshold: 1.0,
            std_dev_threshold: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// A refined ring fix in full-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingObservation {
    pub cx: i32,
    pub cy: i32,
    pub radius: i32,
}

/// Per-frame output record. The ordered sequence of these is the artifact
/// passed from the analysis pass to the corrector and then to the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameResult {
    pub frame_index: usize,
    pub detected: bool,
    pub radius: Option<i32>,
    pub center: Option<(i32, i32)>,
    pub is_click: bool,
}

impl FrameResult {
    pub fn missed(frame_index: usize) -> Self {
        Self {
            frame_index,
            detected: false,
            radius: None,
            center: None,
            is_click: false,
        }
    }

    pub fn observed(frame_index: usize, obs: RingObservation, is_click: bool) -> Self {
        Self {
            frame_index,
            detected: true,
            radius: Some(obs.radius),
            center: Some((obs.cx, obs.cy)),
            is_click,
        }
    }
}

/// A contiguous run of pressed frames, as written to the per-video JSONL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickEvent {
    pub start_frame: usize,
    pub end_frame: usize,
    pub start_time_ms: f64,
    pub end_time_ms: f64,
    pub center: Option<(i32, i32)>,
}
