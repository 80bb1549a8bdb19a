//! Appointment lifecycle state machine.
//!
//! The transition table is a static `match`; nothing here reads the clock,
//! touches storage, or mutates state. Callers persist the result.
//!
//! ```text
//! SCHEDULED ──► CONFIRMED ──► IN_PROGRESS ──► COMPLETED
//!     │             │   │           │
//!     │             │   └──► NO_SHOW ◄┘
//!     └──► CANCELLED ◄┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    NoShow,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 6] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::NoShow,
        AppointmentStatus::Cancelled,
    ];

    /// Statuses reachable in one step from `self`.
    pub fn allowed_transitions(self) -> &'static [AppointmentStatus] {
        use AppointmentStatus::*;
        match self {
            Scheduled => &[Confirmed, Cancelled],
            Confirmed => &[InProgress, Cancelled, NoShow],
            InProgress => &[Completed, NoShow],
            Completed | NoShow | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, to: AppointmentStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Terminal statuses have no outgoing transitions and free the slot.
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn is_initial(self) -> bool {
        self == AppointmentStatus::Scheduled
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::InProgress => "IN_PROGRESS",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::NoShow => "NO_SHOW",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that `from -> to` is an edge of the lifecycle graph.
///
/// # Errors
///
/// Returns [`BookingError::InvalidStatusTransition`] for any pair outside the
/// table, including self-transitions.
///
/// # Examples
///
/// ```
/// use booking_engine::status::{validate_transition, AppointmentStatus};
///
/// assert!(validate_transition(AppointmentStatus::Scheduled, AppointmentStatus::Confirmed).is_ok());
/// assert!(validate_transition(AppointmentStatus::Confirmed, AppointmentStatus::Scheduled).is_err());
/// ```
pub fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), BookingError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(BookingError::InvalidStatusTransition { from, to })
    }
}
