// src/corrector.rs
//
// Post-pass over the per-frame sequence. A press gesture must come out as
// one contiguous run of click frames, but a single-frame detection miss or
// radius wobble mid-gesture would otherwise split it into several short
// pulses. Around every click frame, neighbors are folded into the gesture
// while they are undetected, already clicks, or show a radius below the
// idle baseline.

use crate::types::FrameResult;

/// Close detection gaps inside click gestures. Input is untouched; the
/// returned sequence has the same length and frame indices.
pub fn close_click_gaps(results: &[FrameResult], baseline_radius: f64) -> Vec<FrameResult> {
    let mut out = results.to_vec();

    let mut idx = 0;
    while idx < out.len() {
        if !out[idx].is_click {
            idx += 1;
            continue;
        }

        // Extend the gesture backward from the seed.
        let mut back = idx;
        while back > 0 {
            back -= 1;
            if !extends_gesture(&out[back], baseline_radius) {
                break;
            }
            let donor = out[back + 1];
            force_click(&mut out[back], &donor);
        }

        // And forward, symmetrically.
        let mut fwd = idx;
        while fwd + 1 < out.len() {
            fwd += 1;
            if !extends_gesture(&out[fwd], baseline_radius) {
                break;
            }
            let donor = out[fwd - 1];
            force_click(&mut out[fwd], &donor);
        }

        // Everything up to fwd is settled; resume past it.
        idx = fwd + 1;
    }

    out
}

/// A neighbor belongs to the gesture if it is a detection miss, already a
/// click, or sits below the idle baseline radius.
fn extends_gesture(record: &FrameResult, baseline_radius: f64) -> bool {
    !record.detected
        || record.is_click
        || record
            .radius
            .map_or(true, |r| (r as f64) < baseline_radius)
}

/// Mark a frame as part of the gesture. A missed frame has no geometry of
/// its own, so it borrows radius/center from the adjacent record nearer the
/// seed (which is already settled) while keeping its miss status.
fn force_click(record: &mut FrameResult, donor: &FrameResult) {
    if !record.detected {
        record.radius = donor.radius;
        record.center = donor.center;
    }
    record.is_click = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASELINE: f64 = 27.0;

    fn idle(frame_index: usize) -> FrameResult {
        FrameResult {
            frame_index,
            detected: true,
            radius: Some(27),
            center: Some((100, 100)),
            is_click: false,
        }
    }

    fn shrunk(frame_index: usize, is_click: bool) -> FrameResult {
        FrameResult {
            frame_index,
            detected: true,
            radius: Some(24),
            center: Some((100, 100)),
            is_click,
        }
    }

    fn assert_contiguous_runs(results: &[FrameResult]) {
        let first = results.iter().position(|r| r.is_click);
        let last = results.iter().rposition(|r| r.is_click);
        if let (Some(first), Some(last)) = (first, last) {
            let mut in_gap = false;
            for r in &results[first..=last] {
                if !r.is_click {
                    in_gap = true;
                } else {
                    assert!(!in_gap, "click run broken at frame {}", r.frame_index);
                }
            }
        }
    }

    #[test]
    fn single_frame_miss_inside_gesture_is_closed() {
        // Frames 3-5 form one press; frame 4 is a detection miss.
        let mut results: Vec<FrameResult> = (0..10).map(idle).collect();
        results[3] = shrunk(3, true);
        results[4] = FrameResult::missed(4);
        results[5] = shrunk(5, true);

        let corrected = close_click_gaps(&results, BASELINE);

        for i in [3, 4, 5] {
            assert!(corrected[i].is_click, "frame {} must be a click", i);
        }
        for i in [0, 1, 2, 6, 7, 8, 9] {
            assert!(!corrected[i].is_click, "frame {} must stay idle", i);
        }

        // The miss inherits the neighbor's geometry but stays a miss.
        assert!(!corrected[4].detected);
        assert_eq!(corrected[4].radius, Some(24));
        assert_eq!(corrected[4].center, Some((100, 100)));
    }

    #[test]
    fn shrunk_lead_in_frames_join_the_gesture() {
        // Contracting frames just before the classifier's trigger point
        // belong to the same press.
        let mut results: Vec<FrameResult> = (0..6).map(idle).collect();
        results[1] = shrunk(1, false);
        results[2] = shrunk(2, false);
        results[3] = shrunk(3, true);

        let corrected = close_click_gaps(&results, BASELINE);
        assert!(!corrected[0].is_click);
        assert!(corrected[1].is_click);
        assert!(corrected[2].is_click);
        assert!(corrected[3].is_click);
        assert!(!corrected[4].is_click);
    }

    #[test]
    fn healthy_baseline_frame_stops_extension() {
        let mut results: Vec<FrameResult> = (0..5).map(idle).collect();
        results[2] = shrunk(2, true);

        let corrected = close_click_gaps(&results, BASELINE);
        assert!(!corrected[1].is_click);
        assert!(corrected[2].is_click);
        assert!(!corrected[3].is_click);
    }

    #[test]
    fn trailing_misses_borrow_patched_geometry() {
        let mut results: Vec<FrameResult> = (0..7).map(idle).collect();
        results[2] = shrunk(2, true);
        results[3] = FrameResult::missed(3);
        results[4] = FrameResult::missed(4);

        let corrected = close_click_gaps(&results, BASELINE);
        assert!(corrected[3].is_click && corrected[4].is_click);
        // Frame 4's donor is frame 3, itself patched from frame 2.
        assert_eq!(corrected[4].radius, Some(24));
        assert_eq!(corrected[4].center, Some((100, 100)));
        assert!(!corrected[5].is_click);
    }

    #[test]
    fn sequence_without_clicks_passes_through() {
        let mut results: Vec<FrameResult> = (0..8).map(idle).collect();
        results[5] = FrameResult::missed(5);

        let corrected = close_click_gaps(&results, BASELINE);
        assert_eq!(corrected, results);
    }

    #[test]
    fn length_and_indices_are_preserved() {
        let mut results: Vec<FrameResult> = (0..20).map(idle).collect();
        results[4] = shrunk(4, true);
        results[5] = FrameResult::missed(5);
        results[12] = shrunk(12, true);

        let corrected = close_click_gaps(&results, BASELINE);
        assert_eq!(corrected.len(), results.len());
        for (pos, r) in corrected.iter().enumerate() {
            assert_eq!(r.frame_index, pos);
        }
        assert_contiguous_runs(&corrected);
    }

    #[test]
    fn correction_is_idempotent() {
        let mut results: Vec<FrameResult> = (0..15).map(idle).collect();
        results[3] = shrunk(3, true);
        results[4] = FrameResult::missed(4);
        results[5] = shrunk(5, true);
        results[10] = shrunk(10, true);

        let once = close_click_gaps(&results, BASELINE);
        let twice = close_click_gaps(&once, BASELINE);
        assert_eq!(once, twice);
    }

    #[test]
    fn two_separated_gestures_stay_separate() {
        let mut results: Vec<FrameResult> = (0..12).map(idle).collect();
        results[2] = shrunk(2, true);
        results[8] = shrunk(8, true);

        let corrected = close_click_gaps(&results, BASELINE);
        let clicks: Vec<usize> = corrected
            .iter()
            .filter(|r| r.is_click)
            .map(|r| r.frame_index)
            .collect();
        assert_eq!(clicks, vec![2, 8]);
    }
}
