//! # booking-engine
//!
//! Deterministic appointment scheduling for salons.
//!
//! The engine decides whether a proposed booking is valid, tracks each
//! appointment through its lifecycle, and enforces the temporal rules around
//! it: employee working hours, time off, double-booking, and cancellation
//! windows. Storage, pricing, and transport live outside; the engine talks to
//! them through the traits in [`ports`].
//!
//! ## Modules
//!
//! - [`slot`] — Half-open `[start, end)` intervals and overlap arithmetic
//! - [`working_hours`] — A day's open/close window and its slot grid
//! - [`schedule`] — Weekly schedules and one-off schedule exceptions
//! - [`validator`] — Shift and exception validation for manager edits
//! - [`status`] — Appointment lifecycle state machine
//! - [`appointment`] — The booking entity
//! - [`booking`] — Orchestration: create, transition, reschedule, free slots
//! - [`ports`] — Collaborator traits, audit events, clocks
//! - [`locks`] — Per-employee mutual exclusion
//! - [`memory`] — In-memory implementation of every port
//! - [`config`] — Thresholds and policy switches
//! - [`error`] — Error types

use uuid::Uuid;

pub mod appointment;
pub mod booking;
pub mod config;
pub mod error;
pub mod locks;
pub mod memory;
pub mod ports;
pub mod schedule;
pub mod slot;
pub mod status;
pub mod validator;
pub mod working_hours;

pub type SalonId = Uuid;
pub type ClientId = Uuid;
pub type EmployeeId = Uuid;
pub type VariantId = Uuid;
pub type AppointmentId = Uuid;
pub type ScheduleId = Uuid;
pub type ExceptionId = Uuid;

pub use appointment::{Appointment, AppointmentSource, BookingRequest};
pub use booking::BookingService;
pub use config::BookingConfig;
pub use error::{BookingError, ErrorKind, RepositoryError};
pub use memory::InMemoryStore;
pub use ports::{
    AppointmentRepository, AuditEvent, AuditSink, Clock, Collaborators, FixedClock,
    NoopAuditSink, SalonPolicy, ScheduleRepository, ServiceCatalog, SystemClock,
};
pub use schedule::{ExceptionType, ScheduleException, WeeklySchedule};
pub use slot::TimeSlot;
pub use status::{validate_transition, AppointmentStatus};
pub use validator::ScheduleValidator;
pub use working_hours::WorkingHours;
