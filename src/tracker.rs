// src/tracker.rs
//
// Cross-frame track state for the cursor marker. While locked, the search is
// restricted to a small window around the last fix; a miss there falls back
// to a full-frame search before the track is declared lost. ROI-first search
// is both cheaper and resistant to same-colored clutter elsewhere in the
// frame.

use crate::types::{DetectionConfig, RingObservation};
use anyhow::Result;
use opencv::{
    core::{Mat, Rect},
    prelude::*,
};
use tracing::debug;

/// Seam between the tracker and the detector/refiner pair, so the state
/// machine can be exercised without running the circle transform.
pub trait RingLocator {
    fn locate(&self, frame: &Mat, roi: Option<Rect>) -> Result<Option<RingObservation>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Unlocked,
    Locked(RingObservation),
}

pub struct RingTracker {
    radius_min: i32,
    radius_max: i32,
    roi_scale: f64,
    state: TrackState,
}

impl RingTracker {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            radius_min: config.radius_min,
            radius_max: config.radius_max,
            roi_scale: config.roi_scale,
            state: TrackState::Unlocked,
        }
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, TrackState::Locked(_))
    }

    /// Search window for the next frame: a square of side roi_scale × radius
    /// centered on the last fix, clipped to frame bounds. `None` while
    /// unlocked, meaning "search the full frame".
    pub fn search_region(&self, frame_width: i32, frame_height: i32) -> Option<Rect> {
        let TrackState::Locked(last) = self.state else {
            return None;
        };
        let size = (last.radius as f64 * self.roi_scale) as i32;
        let x = (last.cx - size / 2).max(0);
        let y = (last.cy - size / 2).max(0);
        let width = size.min(frame_width - x);
        let height = size.min(frame_height - y);
        Some(Rect::new(x, y, width, height))
    }

    fn accepts(&self, radius: i32) -> bool {
        radius >= self.radius_min && radius <= self.radius_max
    }

    /// Advance the track by one frame. Returns the accepted observation, or
    /// `None` when the marker could not be (re)acquired — in which case the
    /// tracker is unlocked and the next frame searches the full frame.
    pub fn process_frame(
        &mut self,
        locator: &dyn RingLocator,
        frame: &Mat,
    ) -> Result<Option<RingObservation>> {
        if let Some(rect) = self.search_region(frame.cols(), frame.rows()) {
            if let Some(obs) = locator.locate(frame, Some(rect))? {
                if self.accepts(obs.radius) {
                    self.state = TrackState::Locked(obs);
                    return Ok(Some(obs));
                }
            }
            debug!("ROI search missed, retrying over the full frame");
        }

        match locator.locate(frame, None)? {
            Some(obs) if self.accepts(obs.radius) => {
                self.state = TrackState::Locked(obs);
                Ok(Some(obs))
            }
            _ => {
                self.state = TrackState::Unlocked;
                Ok(None)
            }
        }
    }
}
