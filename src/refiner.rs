// src/refiner.rs
//
// The raw Hough estimate jitters frame to frame. Fitting the minimum
// enclosing circle of the mask's largest external contour gives a steadier
// center/radius, and that is what the tracker and classifier consume.

use crate::types::RingObservation;
use anyhow::Result;
use opencv::{
    core::{Mat, Point, Point2f, Vector},
    imgproc,
    prelude::*,
};

/// Fit a stabilized center/radius to a binary marker mask.
/// Returns `None` when the mask holds no contours at all.
pub fn refine_circle(mask: &Mat) -> Result<Option<RingObservation>> {
    let mut contours: Vector<Vector<Point>> = Vector::new();
    imgproc::find_contours(
        mask,
        &mut contours,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )?;

    if contours.is_empty() {
        return Ok(None);
    }

    // RETR_EXTERNAL already discards the ring's inner edge, so the largest
    // remaining contour is the marker outline.
    let mut target: Option<Vector<Point>> = None;
    let mut best_area = f64::MIN;
    for contour in contours.iter() {
        let area = imgproc::contour_area(&contour, false)?;
        if area > best_area {
            best_area = area;
            target = Some(contour);
        }
    }
    let target = match target {
        Some(c) => c,
        None => return Ok(None),
    };

    let mut center = Point2f::default();
    let mut radius = 0.0f32;
    imgproc::min_enclosing_circle(&target, &mut center, &mut radius)?;

    Ok(Some(RingObservation {
        cx: center.x as i32,
        cy: center.y as i32,
        radius: radius as i32,
    }))
}
