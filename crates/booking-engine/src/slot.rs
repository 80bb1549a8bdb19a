//! Half-open time intervals.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A half-open interval `[start, end)` in UTC.
///
/// `end > start` is the constructor's responsibility; the type itself does
/// not re-check it, so a zero-length slot can exist and overlaps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Slot beginning at `start` and lasting `minutes`.
    ///
    /// # Arguments
    ///
    /// * `start` - First instant of the slot
    /// * `minutes` - Length of the slot; durations come from the service
    ///   catalog, so any `i64` is accepted
    ///
    /// # Returns
    ///
    /// `None` when `minutes` does not fit a [`TimeDelta`] or the end instant
    /// falls outside the range `DateTime<Utc>` can represent.
    ///
    /// # Examples
    ///
    /// ```
    /// use booking_engine::TimeSlot;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let start = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();
    /// let slot = TimeSlot::starting_at(start, 45).unwrap();
    /// assert_eq!(slot.duration_minutes(), 45);
    /// assert!(TimeSlot::starting_at(start, i64::MAX).is_none());
    /// ```
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Option<Self> {
        let length = TimeDelta::try_minutes(minutes)?;
        let end = start.checked_add_signed(length)?;
        Some(Self { start, end })
    }

    /// True iff the intervals share a non-zero-length stretch.
    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Whole minutes between start and end, truncated toward zero.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// True iff `other` lies entirely inside `self` (endpoints inclusive).
    pub fn contains(&self, other: &TimeSlot) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
    }

    #[test]
    fn test_overlapping_slots() {
        let a = TimeSlot::new(at(10, 0), at(11, 0));
        let b = TimeSlot::new(at(10, 30), at(11, 30));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_adjacent_slots_do_not_overlap() {
        let a = TimeSlot::new(at(10, 0), at(11, 0));
        let b = TimeSlot::new(at(11, 0), at(12, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_nested_slot_overlaps() {
        let outer = TimeSlot::new(at(9, 0), at(17, 0));
        let inner = TimeSlot::new(at(12, 0), at(12, 15));
        assert!(outer.overlaps(&inner));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_zero_length_slot_overlaps_nothing() {
        let zero = TimeSlot::new(at(10, 0), at(10, 0));
        assert!(zero.is_empty());
        assert!(!zero.overlaps(&zero));
        assert!(!zero.overlaps(&TimeSlot::new(at(9, 0), at(11, 0))));
    }

    #[test]
    fn test_duration_minutes_truncates() {
        let start = at(10, 0);
        let slot = TimeSlot::new(start, start + Duration::seconds(59 * 60 + 59));
        assert_eq!(slot.duration_minutes(), 59);
        assert_eq!(TimeSlot::starting_at(start, 90).unwrap().duration_minutes(), 90);
    }

    #[test]
    fn test_starting_at_rejects_unrepresentable_lengths() {
        let start = at(10, 0);
        assert!(TimeSlot::starting_at(start, i64::MAX / 2).is_none());
        assert!(TimeSlot::starting_at(start, i64::MIN).is_none());
        // Fits a TimeDelta but runs past the last representable instant.
        assert!(TimeSlot::starting_at(DateTime::<Utc>::MAX_UTC, 1).is_none());
        assert!(TimeSlot::starting_at(start, 0).unwrap().is_empty());
    }

    fn any_slot() -> impl Strategy<Value = TimeSlot> {
        (0i64..10_000, 0i64..600).prop_map(|(offset, len)| {
            let start = at(0, 0) + Duration::minutes(offset);
            TimeSlot::starting_at(start, len).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in any_slot(), b in any_slot()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_slot_overlaps_itself_unless_empty(a in any_slot()) {
            prop_assert_eq!(a.overlaps(&a), !a.is_empty());
        }

        #[test]
        fn prop_adjacent_never_overlap(a in any_slot(), len in 1i64..600) {
            let b = TimeSlot::starting_at(a.end, len).unwrap();
            prop_assert!(!a.overlaps(&b));
            prop_assert!(!b.overlaps(&a));
        }
    }
}
