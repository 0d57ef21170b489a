// src/detector.rs
//
// Per-frame localization of the cursor marker: HSV color segmentation,
// morphological cleanup, and a Hough circle transform over the binary mask.
// The Hough fix is coarse; the contour-based refiner computes the values
// used downstream.

use crate::refiner::refine_circle;
use crate::tracker::RingLocator;
use crate::types::{DetectionConfig, RingObservation};
use anyhow::Result;
use opencv::{
    core::{self, Mat, Point, Rect, Scalar, Size, Vec3f, Vector},
    imgproc,
    prelude::*,
};

/// Outcome of one marker search: the first Hough candidate (if any) in
/// full-frame coordinates, plus the full-frame binary mask it was found in.
pub struct RingSearch {
    pub circle: Option<(i32, i32, i32)>,
    pub mask: Mat,
}

pub struct RingDetector {
    config: DetectionConfig,
}

impl RingDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Threshold the image to the marker's HSV band and clean the result:
    /// one opening pass kills speckle, two closing passes fill small holes
    /// in the ring body.
    pub fn segment(&self, image: &Mat) -> Result<Mat> {
        let mut hsv = Mat::default();
        imgproc::cvt_color(image, &mut hsv, imgproc::COLOR_BGR2HSV, 0)?;

        let [lh, ls, lv] = self.config.lower_hsv;
        let [uh, us, uv] = self.config.upper_hsv;
        let lower = Scalar::new(lh as f64, ls as f64, lv as f64, 0.0);
        let upper = Scalar::new(uh as f64, us as f64, uv as f64, 0.0);

        let mut mask = Mat::default();
        core::in_range(&hsv, &lower, &upper, &mut mask)?;

        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(self.config.kernel_size, self.config.kernel_size),
            Point::new(-1, -1),
        )?;

        let mut opened = Mat::default();
        imgproc::morphology_ex(
            &mask,
            &mut opened,
            imgproc::MORPH_OPEN,
            &kernel,
            Point::new(-1, -1),
            1,
            core::BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )?;

        let mut closed = Mat::default();
        imgproc::morphology_ex(
            &opened,
            &mut closed,
            imgproc::MORPH_CLOSE,
            &kernel,
            Point::new(-1, -1),
            2,
            core::BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )?;

        Ok(closed)
    }

    /// Search the frame (or a cropped ROI of it) for the marker. Returns at
    /// most one candidate; "not found" is a normal outcome, not an error.
    pub fn find_ring(&self, frame: &Mat, roi: Option<Rect>) -> Result<RingSearch> {
        let search = match roi {
            Some(rect) => Mat::roi(frame, rect)?.try_clone()?,
            None => frame.try_clone()?,
        };

        let mask = self.segment(&search)?;

        // One candidate per marker: keeping candidate centers at least a
        // quarter of the shorter search dimension apart suppresses
        // concentric false positives.
        let min_dist = (search.rows().min(search.cols()) / 4).max(1) as f64;

        let mut circles: Vector<Vec3f> = Vector::new();
        imgproc::hough_circles(
            &mask,
            &mut circles,
            imgproc::HOUGH_GRADIENT,
            self.config.hough_dp,
            min_dist,
            self.config.hough_param1,
            self.config.hough_param2,
            self.config.hough_min_radius,
            self.config.hough_max_radius,
        )?;

        let circle = if circles.is_empty() {
            None
        } else {
            let c = circles.get(0)?;
            let (mut cx, mut cy) = (c[0].round() as i32, c[1].round() as i32);
            if let Some(rect) = roi {
                cx += rect.x;
                cy += rect.y;
            }
            Some((cx, cy, c[2].round() as i32))
        };

        // Downstream geometry works in frame coordinates, so an ROI-sized
        // mask is pasted back at its offset into a full-frame canvas.
        let mask = match roi {
            Some(rect) => {
                let mut full = Mat::zeros(frame.rows(), frame.cols(), core::CV_8UC1)?.to_mat()?;
                {
                    let mut dst = full.roi_mut(rect)?;
                    mask.copy_to(&mut dst)?;
                }
                full
            }
            None => mask,
        };

        Ok(RingSearch { circle, mask })
    }
}

impl RingLocator for RingDetector {
    fn locate(&self, frame: &Mat, roi: Option<Rect>) -> Result<Option<RingObservation>> {
        let search = self.find_ring(frame, roi)?;
        if search.circle.is_none() {
            return Ok(None);
        }
        refine_circle(&search.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BGR value whose HSV form (H=0, S=255, V=178) sits inside the
    // configured band.
    fn marker_color() -> Scalar {
        Scalar::new(0.0, 0.0, 178.0, 0.0)
    }

    fn frame_with_ring(cx: i32, cy: i32, radius: i32) -> Mat {
        let mut frame = Mat::new_rows_cols_with_default(
            200,
            200,
            core::CV_8UC3,
            Scalar::new(30.0, 30.0, 30.0, 0.0),
        )
        .unwrap();
        // Stroke must be wider than the 5x5 opening kernel or the cleanup
        // pass would erase it, as it does real speckle.
        imgproc::circle(
            &mut frame,
            Point::new(cx, cy),
            radius,
            marker_color(),
            8,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
        frame
    }

    #[test]
    fn segment_keeps_marker_pixels_only() {
        let detector = RingDetector::new(DetectionConfig::default());
        let frame = frame_with_ring(100, 100, 24);

        let mask = detector.segment(&frame).unwrap();
        let hits = core::count_non_zero(&mask).unwrap();
        assert!(hits > 0, "marker pixels should survive segmentation");

        // Background pixels must not leak into the mask: everything lit
        // lies within the ring's outer bound (plus closing slack).
        let mut far = Mat::zeros(200, 200, core::CV_8UC1).unwrap().to_mat().unwrap();
        imgproc::circle(
            &mut far,
            Point::new(100, 100),
            34,
            Scalar::all(255.0),
            -1,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
        let mut outside = Mat::default();
        core::bitwise_and(&mask, &far, &mut outside, &core::no_array()).unwrap();
        assert_eq!(core::count_non_zero(&outside).unwrap(), hits);
    }

    #[test]
    fn segment_of_plain_frame_is_empty() {
        let detector = RingDetector::new(DetectionConfig::default());
        let frame = Mat::new_rows_cols_with_default(
            120,
            160,
            core::CV_8UC3,
            Scalar::new(200.0, 180.0, 160.0, 0.0),
        )
        .unwrap();

        let mask = detector.segment(&frame).unwrap();
        assert_eq!(core::count_non_zero(&mask).unwrap(), 0);
    }

    #[test]
    fn find_ring_reports_absence_without_error() {
        let detector = RingDetector::new(DetectionConfig::default());
        let frame =
            Mat::new_rows_cols_with_default(120, 160, core::CV_8UC3, Scalar::all(0.0)).unwrap();

        let search = detector.find_ring(&frame, None).unwrap();
        assert!(search.circle.is_none());
        assert_eq!(core::count_non_zero(&search.mask).unwrap(), 0);
    }

    #[test]
    fn roi_search_returns_full_frame_mask() {
        let detector = RingDetector::new(DetectionConfig::default());
        let frame = frame_with_ring(100, 100, 24);
        let roi = Rect::new(50, 50, 100, 100);

        let search = detector.find_ring(&frame, Some(roi)).unwrap();
        assert_eq!(search.mask.rows(), frame.rows());
        assert_eq!(search.mask.cols(), frame.cols());
        assert!(core::count_non_zero(&search.mask).unwrap() > 0);
    }
}
