//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::schedule::ExceptionType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Shortest allowed weekly shift.
    pub min_shift_minutes: i64,
    /// Longest allowed weekly shift.
    pub max_shift_minutes: i64,
    /// Shortest allowed schedule exception.
    pub min_exception_minutes: i64,
    /// Exception types that make an employee unavailable for booking.
    /// Types missing from this list are informational.
    pub blocking_exception_types: Vec<ExceptionType>,
    /// Whether `reschedule` must respect the cancellation window too.
    pub cancellation_window_applies_to_reschedule: bool,
    /// Cancellation window for salons without their own setting.
    pub default_cancellation_window_hours: i64,
    /// Grid granularity for free-slot search.
    pub slot_step_minutes: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            min_shift_minutes: 30,
            max_shift_minutes: 12 * 60,
            min_exception_minutes: 60,
            blocking_exception_types: ExceptionType::ALL.to_vec(),
            cancellation_window_applies_to_reschedule: false,
            default_cancellation_window_hours: 24,
            slot_step_minutes: 15,
        }
    }
}

impl BookingConfig {
    /// Parse a JSON document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidSchedule`] if the document is malformed
    /// or describes an impossible policy (e.g. `min_shift_minutes` above
    /// `max_shift_minutes`).
    pub fn from_json_str(json: &str) -> Result<Self, BookingError> {
        let config: BookingConfig = serde_json::from_str(json)
            .map_err(|e| BookingError::InvalidSchedule(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BookingError> {
        if self.min_shift_minutes <= 0 || self.min_shift_minutes > self.max_shift_minutes {
            return Err(BookingError::InvalidSchedule(format!(
                "config: shift bounds {}..{} minutes",
                self.min_shift_minutes, self.max_shift_minutes
            )));
        }
        if self.min_exception_minutes <= 0 {
            return Err(BookingError::InvalidSchedule(
                "config: min_exception_minutes must be positive".to_string(),
            ));
        }
        if self.slot_step_minutes == 0 {
            return Err(BookingError::InvalidSchedule(
                "config: slot_step_minutes must be positive".to_string(),
            ));
        }
        if self.default_cancellation_window_hours < 0 {
            return Err(BookingError::InvalidSchedule(
                "config: default_cancellation_window_hours must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn exception_blocks(&self, exception_type: ExceptionType) -> bool {
        self.blocking_exception_types.contains(&exception_type)
    }
}
