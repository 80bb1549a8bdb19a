//! Error types for booking-engine operations.
//!
//! Expected business-rule violations (overlaps, bad transitions, expired
//! windows) are ordinary [`BookingError`] values carrying the ids, instants
//! and thresholds involved. Storage failures arrive from the ports as
//! [`RepositoryError`] and pass through unchanged.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use thiserror::Error;

use crate::status::AppointmentStatus;
use crate::{AppointmentId, EmployeeId, ExceptionId, ScheduleId, VariantId};

/// Coarse classification of a [`BookingError`], for transport-layer mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input or state-policy violation (4xx).
    Validation,
    /// Legitimate business conflict; retry with a different slot (409).
    Conflict,
    /// Referenced entity does not exist in this salon (404).
    NotFound,
    /// Salon policy forbids the operation right now (409/422).
    Policy,
    /// A collaborator failed; not a business outcome (5xx).
    Unavailable,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval { start: NaiveTime, end: NaiveTime },

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment {appointment_id} cannot be rescheduled in status {status}")]
    NotReschedulable {
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    },

    #[error("Appointment conflict for employee {employee_id} at {start_at}")]
    AppointmentConflict {
        employee_id: EmployeeId,
        start_at: DateTime<Utc>,
        conflicting: Vec<AppointmentId>,
    },

    #[error("Schedule overlap: employee {employee_id} already has schedule {existing} on {day}")]
    ScheduleOverlap {
        employee_id: EmployeeId,
        day: Weekday,
        existing: ScheduleId,
    },

    #[error("Schedule exception overlap: employee {employee_id} already has exception {existing}")]
    ScheduleExceptionOverlap {
        employee_id: EmployeeId,
        existing: ExceptionId,
    },

    #[error("Employee {employee_id} not available from {start_at} to {end_at}")]
    EmployeeNotAvailable {
        employee_id: EmployeeId,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    },

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(AppointmentId),

    #[error("Employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    #[error("Service variant not found: {0}")]
    VariantNotFound(VariantId),

    #[error(
        "Cancellation window expired for appointment {appointment_id}: \
         {hours_until_start}h until start, window is {window_hours}h"
    )]
    CancellationWindowExpired {
        appointment_id: AppointmentId,
        window_hours: i64,
        hours_until_start: i64,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::InvalidInterval { .. }
            | BookingError::InvalidSchedule(_)
            | BookingError::InvalidStatusTransition { .. }
            | BookingError::NotReschedulable { .. } => ErrorKind::Validation,
            BookingError::AppointmentConflict { .. }
            | BookingError::ScheduleOverlap { .. }
            | BookingError::ScheduleExceptionOverlap { .. }
            | BookingError::EmployeeNotAvailable { .. } => ErrorKind::Conflict,
            BookingError::AppointmentNotFound(_)
            | BookingError::EmployeeNotFound(_)
            | BookingError::VariantNotFound(_) => ErrorKind::NotFound,
            BookingError::CancellationWindowExpired { .. } => ErrorKind::Policy,
            BookingError::Repository(_) => ErrorKind::Unavailable,
        }
    }
}

/// Failure reported by a persistence or lookup collaborator.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    /// A storage-level constraint (e.g. an exclusion constraint on the
    /// employee's time range) rejected the write.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, BookingError>;
