//! Interfaces to the collaborators the engine does not own.
//!
//! Every call is synchronous from the engine's point of view. Timeouts and
//! retries belong to the implementation, never to the scheduling logic.
//!
//! A complete backend typically implements all of them on one type:
//!
//! ```ignore
//! impl ServiceCatalog for PgStore { ... }
//! impl AppointmentRepository for PgStore { ... }
//! impl ScheduleRepository for PgStore { ... }
//! impl SalonPolicy for PgStore { ... }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc, Weekday};
use chrono_tz::Tz;
use parking_lot::Mutex;
use serde::Serialize;

use crate::appointment::Appointment;
use crate::error::RepositoryError;
use crate::schedule::{ScheduleException, WeeklySchedule};
use crate::slot::TimeSlot;
use crate::status::AppointmentStatus;
use crate::{AppointmentId, EmployeeId, SalonId, VariantId};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Service-variant lookup.
pub trait ServiceCatalog: Send + Sync {
    /// Duration of the variant in minutes, or `None` if the salon has no
    /// such variant.
    fn variant_duration_minutes(
        &self,
        variant_id: VariantId,
        salon_id: SalonId,
    ) -> RepositoryResult<Option<i64>>;
}

/// Appointment persistence.
pub trait AppointmentRepository: Send + Sync {
    /// Non-terminal appointments of `employee_id` overlapping `[start_at, end_at)`,
    /// minus `exclude_id` when given.
    fn find_overlapping(
        &self,
        employee_id: EmployeeId,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        exclude_id: Option<AppointmentId>,
    ) -> RepositoryResult<Vec<Appointment>>;

    /// Load by id, scoped to `salon_id`. Another salon's appointment is `None`.
    fn find_by_id(
        &self,
        id: AppointmentId,
        salon_id: SalonId,
    ) -> RepositoryResult<Option<Appointment>>;

    /// Insert or replace, atomically.
    fn save(&self, appointment: Appointment) -> RepositoryResult<Appointment>;
}

/// Read access to employee availability records.
pub trait ScheduleRepository: Send + Sync {
    /// Whether `employee_id` works at `salon_id`.
    fn employee_exists(&self, employee_id: EmployeeId, salon_id: SalonId)
        -> RepositoryResult<bool>;

    /// The employee's schedule for `day_of_week`, if one was ever set.
    fn find_weekly_schedule(
        &self,
        employee_id: EmployeeId,
        day_of_week: Weekday,
    ) -> RepositoryResult<Option<WeeklySchedule>>;

    /// Exceptions of every type overlapping `[start_at, end_at)`. Whether a
    /// type blocks bookings is decided by the engine's configuration.
    fn find_exceptions_overlapping(
        &self,
        employee_id: EmployeeId,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ScheduleException>>;
}

/// Per-salon policy settings.
pub trait SalonPolicy: Send + Sync {
    /// Minimum notice, in hours, for a client cancellation. A value too large
    /// to represent as a duration refuses every cancellation.
    fn cancellation_window_hours(&self, salon_id: SalonId) -> RepositoryResult<i64>;

    /// Timezone the salon's weekly schedules are expressed in.
    fn timezone(&self, _salon_id: SalonId) -> RepositoryResult<Tz> {
        Ok(Tz::UTC)
    }
}

// ── Audit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    AppointmentCreated {
        appointment_id: AppointmentId,
        salon_id: SalonId,
        employee_id: EmployeeId,
        slot: TimeSlot,
    },
    StatusChanged {
        appointment_id: AppointmentId,
        salon_id: SalonId,
        from: AppointmentStatus,
        to: AppointmentStatus,
        reason: Option<String>,
    },
    Rescheduled {
        appointment_id: AppointmentId,
        salon_id: SalonId,
        from: TimeSlot,
        to: TimeSlot,
    },
}

/// Fire-and-forget sink; the engine never inspects the outcome.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

// ── Clock ───────────────────────────────────────────────────────────────────

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

// ── Wiring ──────────────────────────────────────────────────────────────────

/// The full set of collaborators a [`crate::booking::BookingService`] needs.
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn ServiceCatalog>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub salons: Arc<dyn SalonPolicy>,
    pub audit: Arc<dyn AuditSink>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Use one backend for every port except the clock.
    pub fn from_backend<B>(backend: Arc<B>, clock: Arc<dyn Clock>) -> Self
    where
        B: ServiceCatalog
            + AppointmentRepository
            + ScheduleRepository
            + SalonPolicy
            + AuditSink
            + 'static,
    {
        Self {
            catalog: backend.clone(),
            appointments: backend.clone(),
            schedules: backend.clone(),
            salons: backend.clone(),
            audit: backend,
            clock,
        }
    }
}
