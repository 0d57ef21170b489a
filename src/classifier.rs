// src/classifier.rs
//
// Per-frame press decision. The marker contracts when the pointer is
// pressed, so the trigger is radius shrink below the calibrated baseline.
// The interior intensity spread ("opacity") is measured and reported for
// diagnostics, but it does not participate in the decision.

use crate::types::{ClassifierConfig, RingObservation};
use anyhow::Result;
use opencv::{
    core::{self, Mat, Point, Scalar},
    imgproc,
    prelude::*,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickMeasurement {
    pub is_click: bool,
    pub is_shrunk: bool,
    pub is_opaque: bool,
    pub center_std_dev: f64,
}

pub struct ClickClassifier {
    config: ClassifierConfig,
}

impl ClickClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn baseline_radius(&self) -> f64 {
        self.config.baseline_radius
    }

    /// Measure the marker interior on the original (unmasked) frame and
    /// decide whether this frame is a press.
    pub fn classify(&self, frame: &Mat, obs: &RingObservation) -> Result<ClickMeasurement> {
        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

        // Sample strictly inside the ring stroke.
        let inner_radius = (obs.radius - 5).max(0);
        let mut inner_mask = Mat::zeros(gray.rows(), gray.cols(), core::CV_8UC1)?.to_mat()?;
        imgproc::circle(
            &mut inner_mask,
            Point::new(obs.cx, obs.cy),
            inner_radius,
            Scalar::all(255.0),
            -1,
            imgproc::LINE_8,
            0,
        )?;

        let mut mean = Scalar::default();
        let mut std_dev = Scalar::default();
        core::mean_std_dev(&gray, &mut mean, &mut std_dev, &inner_mask)?;
        let center_std_dev = std_dev[0];

        let is_shrunk = is_shrunk(
            obs.radius,
            self.config.baseline_radius,
            self.config.shrink_threshold,
        );
        let is_opaque = center_std_dev < self.config.std_dev_threshold;

        Ok(ClickMeasurement {
            is_click: is_shrunk,
            is_shrunk,
            is_opaque,
            center_std_dev,
        })
    }
}

/// Radius-shrink trigger: pressed when the marker has contracted past the
/// threshold below its idle baseline.
pub fn is_shrunk(radius: i32, baseline_radius: f64, shrink_threshold: f64) -> bool {
    (radius as f64) < baseline_radius - shrink_threshold
}
