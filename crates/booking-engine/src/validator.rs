//! Validation of manager-edited availability records.
//!
//! Each check returns `Ok(())` or the first violated rule as a typed
//! [`BookingError`]. Nothing here touches storage or reads the clock; the
//! caller supplies existing records and `now`.

use chrono::{DateTime, Utc};

use crate::config::BookingConfig;
use crate::error::BookingError;
use crate::schedule::{ScheduleException, WeeklySchedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleValidator {
    min_shift_minutes: i64,
    max_shift_minutes: i64,
    min_exception_minutes: i64,
}

impl Default for ScheduleValidator {
    fn default() -> Self {
        Self::from_config(&BookingConfig::default())
    }
}

impl ScheduleValidator {
    pub fn from_config(config: &BookingConfig) -> Self {
        Self {
            min_shift_minutes: config.min_shift_minutes,
            max_shift_minutes: config.max_shift_minutes,
            min_exception_minutes: config.min_exception_minutes,
        }
    }

    /// Shift must run forward and last between the configured bounds
    /// (30 minutes to 12 hours by default).
    pub fn validate_weekly_schedule(&self, schedule: &WeeklySchedule) -> Result<(), BookingError> {
        if schedule.end_time <= schedule.start_time {
            return Err(BookingError::InvalidSchedule("end before start".to_string()));
        }
        let minutes = schedule.shift_minutes();
        if minutes < self.min_shift_minutes {
            return Err(BookingError::InvalidSchedule(format!(
                "shift of {minutes} minutes is shorter than {} minutes",
                self.min_shift_minutes
            )));
        }
        if minutes > self.max_shift_minutes {
            return Err(BookingError::InvalidSchedule(format!(
                "shift of {minutes} minutes is longer than {} minutes",
                self.max_shift_minutes
            )));
        }
        Ok(())
    }

    /// At most one schedule per `(employee, day)`. A record with the same id
    /// as `schedule` is the one being updated and does not count.
    pub fn validate_no_overlap(
        &self,
        schedule: &WeeklySchedule,
        existing_for_employee: &[WeeklySchedule],
    ) -> Result<(), BookingError> {
        let clash = existing_for_employee.iter().find(|other| {
            other.employee_id == schedule.employee_id
                && other.day_of_week == schedule.day_of_week
                && other.id != schedule.id
        });
        match clash {
            Some(other) => Err(BookingError::ScheduleOverlap {
                employee_id: schedule.employee_id,
                day: schedule.day_of_week,
                existing: other.id,
            }),
            None => Ok(()),
        }
    }

    /// Exception must run forward, last at least the configured minimum,
    /// start no earlier than `now`, and not overlap another exception of the
    /// same employee (half-open comparison).
    pub fn validate_schedule_exception(
        &self,
        exception: &ScheduleException,
        existing_for_employee: &[ScheduleException],
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        let slot = exception.slot();
        if slot.is_empty() {
            return Err(BookingError::InvalidSchedule("end before start".to_string()));
        }
        let minutes = slot.duration_minutes();
        if minutes < self.min_exception_minutes {
            return Err(BookingError::InvalidSchedule(format!(
                "exception of {minutes} minutes is shorter than {} minutes",
                self.min_exception_minutes
            )));
        }
        if exception.start_at < now {
            return Err(BookingError::InvalidSchedule(format!(
                "exception starts in the past: {}",
                exception.start_at.to_rfc3339()
            )));
        }
        let clash = existing_for_employee.iter().find(|other| {
            other.employee_id == exception.employee_id
                && other.id != exception.id
                && other.slot().overlaps(&slot)
        });
        if let Some(other) = clash {
            return Err(BookingError::ScheduleExceptionOverlap {
                employee_id: exception.employee_id,
                existing: other.id,
            });
        }
        Ok(())
    }
}
