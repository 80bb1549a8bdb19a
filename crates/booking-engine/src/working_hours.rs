//! A single day's open/close window in salon-local wall-clock time.

use std::ops::Range;

use chrono::{NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::BookingError;
use crate::slot::TimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkingHours {
    start: NaiveTime,
    end: NaiveTime,
}

impl WorkingHours {
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidInterval`] when `end <= start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, BookingError> {
        if end <= start {
            return Err(BookingError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Boundary-inclusive containment: a slot may start exactly at opening
    /// and end exactly at closing.
    pub fn contains_slot(&self, slot_start: NaiveTime, slot_end: NaiveTime) -> bool {
        slot_start >= self.start && slot_end <= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// The window as minutes since local midnight, `[open, close)`.
    pub fn minute_range(&self) -> Range<u32> {
        minute_of_day(self.start)..minute_of_day(self.end)
    }

    /// Start minutes of every `length`-minute slot that fits in the window
    /// when stepping by `step` minutes from opening.
    pub fn slot_grid(&self, step: u32, length: u32) -> Vec<u32> {
        if step == 0 || length == 0 {
            return Vec::new();
        }
        let range = self.minute_range();
        (range.start..range.end)
            .step_by(step as usize)
            .filter(|m| m.checked_add(length).is_some_and(|end| end <= range.end))
            .collect()
    }

    /// Anchor the window to a local date, yielding the UTC interval.
    ///
    /// Returns `None` when either boundary falls in a DST gap.
    pub fn on_date(&self, date: NaiveDate, tz: &Tz) -> Option<TimeSlot> {
        let start = tz.from_local_datetime(&date.and_time(self.start)).earliest()?;
        let end = tz.from_local_datetime(&date.and_time(self.end)).latest()?;
        Some(TimeSlot::new(start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }
}

pub(crate) fn minute_of_day(t: NaiveTime) -> u32 {
    t.num_seconds_from_midnight() / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn nine_to_five() -> WorkingHours {
        WorkingHours::new(t(9, 0), t(17, 0)).unwrap()
    }

    #[test]
    fn test_rejects_inverted_window() {
        let err = WorkingHours::new(t(17, 0), t(9, 0)).unwrap_err();
        assert!(matches!(err, BookingError::InvalidInterval { .. }));
        assert!(WorkingHours::new(t(9, 0), t(9, 0)).is_err());
    }

    #[test]
    fn test_contains_slot_is_boundary_inclusive() {
        let wh = nine_to_five();
        assert!(wh.contains_slot(t(9, 0), t(10, 0)));
        assert!(wh.contains_slot(t(16, 0), t(17, 0)));
        assert!(!wh.contains_slot(t(8, 59), t(10, 0)));
        assert!(!wh.contains_slot(t(16, 30), t(17, 30)));
        assert!(!wh.contains_slot(t(18, 0), t(19, 0)));
    }

    #[test]
    fn test_duration_and_minute_range() {
        let wh = nine_to_five();
        assert_eq!(wh.duration_minutes(), 480);
        assert_eq!(wh.minute_range(), 540..1020);
    }

    #[test]
    fn test_slot_grid() {
        let wh = WorkingHours::new(t(9, 0), t(11, 0)).unwrap();
        assert_eq!(wh.slot_grid(30, 60), vec![540, 570, 600]);
        assert_eq!(wh.slot_grid(60, 120), vec![540]);
        assert!(wh.slot_grid(30, 150).is_empty());
        assert!(wh.slot_grid(0, 30).is_empty());
        assert!(wh.slot_grid(30, u32::MAX).is_empty());
    }

    #[test]
    fn test_on_date_applies_timezone() {
        let wh = nine_to_five();
        let date = NaiveDate::from_ymd_opt(2026, 7, 6).unwrap();
        let tz: Tz = "Europe/Warsaw".parse().unwrap();
        let slot = wh.on_date(date, &tz).unwrap();
        // CEST is UTC+2 in July
        assert_eq!(slot.start.to_rfc3339(), "2026-07-06T07:00:00+00:00");
        assert_eq!(slot.end.to_rfc3339(), "2026-07-06T15:00:00+00:00");
    }
}
