//! Employee availability records: the recurring weekly schedule and one-off
//! exceptions to it.
//!
//! Both are read-mostly inputs to booking. Salon managers write them through
//! their own persistence path, checked by [`crate::validator::ScheduleValidator`].

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::slot::TimeSlot;
use crate::working_hours::WorkingHours;
use crate::{EmployeeId, ExceptionId, SalonId, ScheduleId};

// ── WeeklySchedule ──────────────────────────────────────────────────────────

/// One employee's shift for one day of the week.
///
/// At most one record exists per `(employee_id, day_of_week)`. Times are
/// wall-clock in the salon's timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub id: ScheduleId,
    pub employee_id: EmployeeId,
    pub salon_id: SalonId,
    /// Serialized as 0-6, Monday = 0.
    #[serde(with = "day_index")]
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_working_day: bool,
}

impl WeeklySchedule {
    /// The bookable window, or `None` on a day off or a malformed record.
    pub fn working_hours(&self) -> Option<WorkingHours> {
        if !self.is_working_day {
            return None;
        }
        WorkingHours::new(self.start_time, self.end_time).ok()
    }

    pub fn shift_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// `Weekday` <-> 0-6 index, Monday first.
pub mod day_index {
    use chrono::Weekday;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn to_index(day: Weekday) -> u8 {
        day.num_days_from_monday() as u8
    }

    pub fn from_index(index: u8) -> Option<Weekday> {
        Weekday::try_from(index).ok()
    }

    pub fn serialize<S: Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(to_index(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Weekday, D::Error> {
        let index = u8::deserialize(d)?;
        from_index(index)
            .ok_or_else(|| D::Error::custom(format!("day_of_week out of range 0-6: {index}")))
    }
}

// ── ScheduleException ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionType {
    Vacation,
    SickLeave,
    Blocked,
    Personal,
}

impl ExceptionType {
    pub const ALL: [ExceptionType; 4] = [
        ExceptionType::Vacation,
        ExceptionType::SickLeave,
        ExceptionType::Blocked,
        ExceptionType::Personal,
    ];
}

/// A one-off deviation from the weekly schedule, in absolute time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleException {
    pub id: ExceptionId,
    pub employee_id: EmployeeId,
    pub salon_id: SalonId,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub reason: Option<String>,
    #[serde(rename = "type")]
    pub exception_type: ExceptionType,
}

impl ScheduleException {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_at, self.end_at)
    }
}
