//! Drag-to-reschedule rule.
//!
//! A vertical drag is a snap interaction: once the accumulated pointer offset
//! passes [`DRAG_THRESHOLD`] in either direction the reservation moves by
//! exactly [`SHIFT_MINUTES`] and the accumulation starts over. Smaller drags
//! change nothing.

use chrono::{Duration, NaiveDate, NaiveTime};

/// Accumulated offset (in pointer units) that triggers a shift
pub const DRAG_THRESHOLD: f32 = 100.0;

/// Size of one snap in minutes
pub const SHIFT_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    /// Dragged down the calendar
    Later,
    /// Dragged up the calendar
    Earlier,
}

impl ShiftDirection {
    /// Move a slot by one snap. Crossing midnight moves the date too.
    pub fn apply(self, date: NaiveDate, time: NaiveTime) -> (NaiveDate, NaiveTime) {
        let step = match self {
            ShiftDirection::Later => Duration::minutes(SHIFT_MINUTES),
            ShiftDirection::Earlier => Duration::minutes(-SHIFT_MINUTES),
        };
        let shifted = date.and_time(time) + step;
        (shifted.date(), shifted.time())
    }
}

/// Which way, if any, an accumulated offset snaps.
pub fn drag_shift(accumulated_offset: f32) -> Option<ShiftDirection> {
    if accumulated_offset > DRAG_THRESHOLD {
        Some(ShiftDirection::Later)
    } else if accumulated_offset < -DRAG_THRESHOLD {
        Some(ShiftDirection::Earlier)
    } else {
        None
    }
}

/// Per-card accumulator for pointer deltas.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    offset: f32,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pointer delta. Returns the shift to apply, if the threshold was
    /// crossed, and resets the accumulation when it was.
    pub fn push(&mut self, delta: f32) -> Option<ShiftDirection> {
        self.offset += delta;
        let shift = drag_shift(self.offset);
        if shift.is_some() {
            self.offset = 0.0;
        }
        shift
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_drag_shift_threshold() {
        assert_eq!(drag_shift(0.0), None);
        assert_eq!(drag_shift(80.0), None);
        assert_eq!(drag_shift(100.0), None);
        assert_eq!(drag_shift(-100.0), None);
        assert_eq!(drag_shift(101.0), Some(ShiftDirection::Later));
        assert_eq!(drag_shift(-101.0), Some(ShiftDirection::Earlier));
    }

    #[test]
    fn test_tracker_below_threshold_accumulates() {
        let mut tracker = DragTracker::new();
        assert_eq!(tracker.push(50.0), None);
        assert_eq!(tracker.push(30.0), None);
        assert_eq!(tracker.offset(), 80.0);
    }

    #[test]
    fn test_tracker_fires_once_and_resets() {
        let mut tracker = DragTracker::new();
        assert_eq!(tracker.push(60.0), None);
        assert_eq!(tracker.push(41.0), Some(ShiftDirection::Later));
        assert_eq!(tracker.offset(), 0.0);
        // the next small delta starts from zero
        assert_eq!(tracker.push(20.0), None);
    }

    #[test]
    fn test_tracker_direction_reversal() {
        let mut tracker = DragTracker::new();
        tracker.push(90.0);
        assert_eq!(tracker.push(-150.0), None);
        assert_eq!(tracker.push(-50.0), Some(ShiftDirection::Earlier));
    }

    #[test]
    fn test_apply_shift() {
        assert_eq!(
            ShiftDirection::Later.apply(d(2025, 3, 14), t(9, 0)),
            (d(2025, 3, 14), t(9, 30))
        );
        assert_eq!(
            ShiftDirection::Earlier.apply(d(2025, 3, 14), t(9, 0)),
            (d(2025, 3, 14), t(8, 30))
        );
    }

    // A snap past midnight lands on the adjacent day; the time never wraps
    // around on the same date.
    #[test]
    fn test_apply_shift_crosses_midnight() {
        assert_eq!(
            ShiftDirection::Later.apply(d(2025, 12, 31), t(23, 45)),
            (d(2026, 1, 1), t(0, 15))
        );
        assert_eq!(
            ShiftDirection::Earlier.apply(d(2025, 3, 1), t(0, 10)),
            (d(2025, 2, 28), t(23, 40))
        );
    }
}
