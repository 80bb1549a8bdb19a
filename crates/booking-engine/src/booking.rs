//! Booking orchestration: the only writer of appointment state.
//!
//! Every mutating operation runs its availability and conflict checks and
//! the final `save` under the employee's lock from [`EmployeeLocks`], so two
//! requests for the same employee cannot both pass the conflict check.
//! Nothing is written unless every check passes, and then exactly one
//! `save` happens.
//!
//! # Operations
//!
//! - [`BookingService::create_appointment`] — validate and book a new slot
//! - [`BookingService::update_status`] — lifecycle transition, with the
//!   cancellation-window policy on `CANCELLED`
//! - [`BookingService::reschedule`] — move a live appointment to a new start
//! - [`BookingService::available_slots`] — bookable start times for a day

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::appointment::{Appointment, BookingRequest};
use crate::config::BookingConfig;
use crate::error::{BookingError, Result};
use crate::locks::EmployeeLocks;
use crate::ports::{AuditEvent, Collaborators};
use crate::schedule::ScheduleException;
use crate::slot::TimeSlot;
use crate::status::{validate_transition, AppointmentStatus};
use crate::validator::ScheduleValidator;
use crate::working_hours::WorkingHours;
use crate::{AppointmentId, EmployeeId, SalonId, VariantId};

/// Validates and records appointments against the collaborators in
/// [`Collaborators`].
///
/// One instance should serve every request of a process: the per-employee
/// locks live inside it.
pub struct BookingService {
    ports: Collaborators,
    config: BookingConfig,
    locks: EmployeeLocks,
}

impl BookingService {
    /// Build a service over a set of collaborators.
    ///
    /// # Arguments
    ///
    /// * `ports` - Storage, catalog, salon policy, audit sink, and clock
    /// * `config` - Schedule thresholds and policy switches
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use booking_engine::{
    ///     AppointmentSource, AppointmentStatus, BookingConfig, BookingRequest, BookingService,
    ///     Collaborators, FixedClock, InMemoryStore, WeeklySchedule,
    /// };
    /// use chrono::{NaiveTime, TimeZone, Utc, Weekday};
    /// use uuid::Uuid;
    ///
    /// let (salon, employee, variant) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    /// let store = Arc::new(InMemoryStore::default());
    /// store.add_employee(salon, employee);
    /// store.add_variant(salon, variant, 60);
    /// store.put_weekly_schedule(WeeklySchedule {
    ///     id: Uuid::new_v4(),
    ///     employee_id: employee,
    ///     salon_id: salon,
    ///     day_of_week: Weekday::Mon,
    ///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    ///     is_working_day: true,
    /// });
    ///
    /// let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 13, 12, 0, 0).unwrap()));
    /// let service = BookingService::new(
    ///     Collaborators::from_backend(store, clock),
    ///     BookingConfig::default(),
    /// );
    ///
    /// let appointment = service
    ///     .create_appointment(BookingRequest {
    ///         salon_id: salon,
    ///         client_id: Uuid::new_v4(),
    ///         employee_id: employee,
    ///         variant_id: variant,
    ///         start_at: Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap(),
    ///         source: AppointmentSource::Direct,
    ///         notes: None,
    ///     })
    ///     .unwrap();
    /// assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    /// ```
    pub fn new(ports: Collaborators, config: BookingConfig) -> Self {
        Self {
            ports,
            config,
            locks: EmployeeLocks::new(),
        }
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    /// A validator using this service's thresholds, for manager-side edits.
    pub fn schedule_validator(&self) -> ScheduleValidator {
        ScheduleValidator::from_config(&self.config)
    }

    // ── create ──────────────────────────────────────────────────────────

    /// Book `request.employee_id` for the variant's duration from
    /// `request.start_at`.
    ///
    /// # Errors
    ///
    /// - [`BookingError::VariantNotFound`] / [`BookingError::EmployeeNotFound`]
    ///   when either is unknown to the salon
    /// - [`BookingError::EmployeeNotAvailable`] when the slot is outside the
    ///   weekly working window or inside a blocking schedule exception
    /// - [`BookingError::AppointmentConflict`] when another live appointment
    ///   of the employee overlaps the slot
    /// - [`BookingError::Repository`] when a collaborator fails
    pub fn create_appointment(&self, request: BookingRequest) -> Result<Appointment> {
        let minutes = self.variant_duration(request.variant_id, request.salon_id)?;
        self.ensure_employee(request.employee_id, request.salon_id)?;
        let slot = slot_of(request.start_at, minutes, request.variant_id)?;

        self.locks.with_employee(request.employee_id, || {
            self.ensure_available(request.salon_id, request.employee_id, &slot)?;
            self.ensure_no_conflict(request.employee_id, &slot, None)?;

            let now = self.ports.clock.now();
            let appointment = self
                .ports
                .appointments
                .save(Appointment::scheduled(request, slot, now))?;

            info!(
                appointment_id = %appointment.id,
                employee_id = %appointment.employee_id,
                start_at = %appointment.start_at,
                end_at = %appointment.end_at,
                "appointment booked"
            );
            self.ports.audit.record(&AuditEvent::AppointmentCreated {
                appointment_id: appointment.id,
                salon_id: appointment.salon_id,
                employee_id: appointment.employee_id,
                slot,
            });
            Ok(appointment)
        })
    }

    // ── update status ───────────────────────────────────────────────────

    /// Move an appointment along its lifecycle.
    ///
    /// Cancelling inside the salon's cancellation window fails with
    /// [`BookingError::CancellationWindowExpired`]. Override privileges are
    /// an authorization concern of the caller and are not modelled here.
    ///
    /// # Arguments
    ///
    /// * `reason` - Stored in `cancellation_reason` for `CANCELLED` and
    ///   `NO_SHOW`; always carried in the audit event
    /// * `salon_id` - Tenant scope; another salon's appointment is not found
    ///
    /// # Returns
    ///
    /// The saved appointment with its new status.
    pub fn update_status(
        &self,
        appointment_id: AppointmentId,
        new_status: AppointmentStatus,
        reason: Option<String>,
        salon_id: SalonId,
    ) -> Result<Appointment> {
        let employee_id = self.load(appointment_id, salon_id)?.employee_id;

        self.locks.with_employee(employee_id, || {
            // Reload under the lock; the status may have moved meanwhile.
            let mut appointment = self.load(appointment_id, salon_id)?;
            let from = appointment.status;
            validate_transition(from, new_status)?;

            let now = self.ports.clock.now();
            if new_status == AppointmentStatus::Cancelled {
                self.ensure_outside_cancellation_window(&appointment, now)?;
            }

            appointment.status = new_status;
            if records_reason(new_status) && reason.is_some() {
                appointment.cancellation_reason = reason.clone();
            }
            appointment.updated_at = now;
            let appointment = self.ports.appointments.save(appointment)?;

            info!(
                appointment_id = %appointment.id,
                from = %from,
                to = %new_status,
                "appointment status changed"
            );
            self.ports.audit.record(&AuditEvent::StatusChanged {
                appointment_id: appointment.id,
                salon_id: appointment.salon_id,
                from,
                to: new_status,
                reason,
            });
            Ok(appointment)
        })
    }

    // ── reschedule ──────────────────────────────────────────────────────

    /// Move a live appointment to `new_start_at`, keeping its variant and
    /// status. The appointment's own current slot never conflicts with it.
    pub fn reschedule(
        &self,
        appointment_id: AppointmentId,
        new_start_at: DateTime<Utc>,
        salon_id: SalonId,
    ) -> Result<Appointment> {
        let employee_id = self.load(appointment_id, salon_id)?.employee_id;

        self.locks.with_employee(employee_id, || {
            let mut appointment = self.load(appointment_id, salon_id)?;
            if appointment.status.is_terminal() {
                return Err(BookingError::NotReschedulable {
                    appointment_id,
                    status: appointment.status,
                });
            }

            let now = self.ports.clock.now();
            if self.config.cancellation_window_applies_to_reschedule {
                self.ensure_outside_cancellation_window(&appointment, now)?;
            }

            let minutes = self.variant_duration(appointment.variant_id, salon_id)?;
            let new_slot = slot_of(new_start_at, minutes, appointment.variant_id)?;
            self.ensure_available(salon_id, employee_id, &new_slot)?;
            self.ensure_no_conflict(employee_id, &new_slot, Some(appointment_id))?;

            let old_slot = appointment.slot();
            appointment.start_at = new_slot.start;
            appointment.end_at = new_slot.end;
            appointment.updated_at = now;
            let appointment = self.ports.appointments.save(appointment)?;

            info!(
                appointment_id = %appointment.id,
                from = %old_slot.start,
                to = %new_slot.start,
                "appointment rescheduled"
            );
            self.ports.audit.record(&AuditEvent::Rescheduled {
                appointment_id: appointment.id,
                salon_id: appointment.salon_id,
                from: old_slot,
                to: new_slot,
            });
            Ok(appointment)
        })
    }

    // ── available slots ─────────────────────────────────────────────────

    /// Every start on the `slot_step_minutes` grid of the employee's
    /// working window on local `date` where the variant could be booked
    /// right now. Starts in the past are skipped.
    ///
    /// This is a read-only snapshot; a later `create_appointment` for one of
    /// the returned slots can still lose a race and fail with a conflict.
    pub fn available_slots(
        &self,
        salon_id: SalonId,
        employee_id: EmployeeId,
        variant_id: VariantId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        let minutes = self.variant_duration(variant_id, salon_id)?;
        self.ensure_employee(employee_id, salon_id)?;

        let tz = self.ports.salons.timezone(salon_id)?;
        let Some(hours) = self.working_hours_on(employee_id, date.weekday())? else {
            return Ok(Vec::new());
        };
        let Some(window) = hours.on_date(date, &tz) else {
            return Ok(Vec::new());
        };

        let exceptions = self.ports.schedules.find_exceptions_overlapping(
            employee_id,
            window.start,
            window.end,
        )?;
        let booked =
            self.ports
                .appointments
                .find_overlapping(employee_id, window.start, window.end, None)?;
        let now = self.ports.clock.now();

        let Ok(length) = u32::try_from(minutes) else {
            return Ok(Vec::new());
        };
        let slots = hours
            .slot_grid(self.config.slot_step_minutes, length)
            .into_iter()
            .filter_map(|minute| {
                let local = date.and_hms_opt(minute / 60, minute % 60, 0)?;
                let start = tz.from_local_datetime(&local).single()?;
                TimeSlot::starting_at(start.with_timezone(&Utc), minutes)
            })
            .filter(|slot| slot.start >= now)
            .filter(|slot| self.blocking_exception(slot, &exceptions).is_none())
            .filter(|slot| !booked.iter().any(|a| a.is_active() && a.slot().overlaps(slot)))
            .collect::<Vec<_>>();

        debug!(
            employee_id = %employee_id,
            %date,
            count = slots.len(),
            "computed available slots"
        );
        Ok(slots)
    }

    // ── Internal checks ─────────────────────────────────────────────────

    fn load(&self, appointment_id: AppointmentId, salon_id: SalonId) -> Result<Appointment> {
        self.ports
            .appointments
            .find_by_id(appointment_id, salon_id)?
            .filter(|a| a.salon_id == salon_id)
            .ok_or(BookingError::AppointmentNotFound(appointment_id))
    }

    fn variant_duration(&self, variant_id: VariantId, salon_id: SalonId) -> Result<i64> {
        let minutes = self
            .ports
            .catalog
            .variant_duration_minutes(variant_id, salon_id)?
            .ok_or(BookingError::VariantNotFound(variant_id))?;
        if minutes <= 0 {
            return Err(BookingError::InvalidSchedule(format!(
                "variant {variant_id} has non-positive duration {minutes}"
            )));
        }
        Ok(minutes)
    }

    fn ensure_employee(&self, employee_id: EmployeeId, salon_id: SalonId) -> Result<()> {
        if self.ports.schedules.employee_exists(employee_id, salon_id)? {
            Ok(())
        } else {
            Err(BookingError::EmployeeNotFound(employee_id))
        }
    }

    fn working_hours_on(
        &self,
        employee_id: EmployeeId,
        day: chrono::Weekday,
    ) -> Result<Option<WorkingHours>> {
        Ok(self
            .ports
            .schedules
            .find_weekly_schedule(employee_id, day)?
            .and_then(|s| s.working_hours()))
    }

    /// Weekly window containment, then blocking exceptions.
    fn ensure_available(
        &self,
        salon_id: SalonId,
        employee_id: EmployeeId,
        slot: &TimeSlot,
    ) -> Result<()> {
        let unavailable = || BookingError::EmployeeNotAvailable {
            employee_id,
            start_at: slot.start,
            end_at: slot.end,
        };

        let tz = self.ports.salons.timezone(salon_id)?;
        let local_start = slot.start.with_timezone(&tz);
        let local_end = slot.end.with_timezone(&tz);
        if local_start.date_naive() != local_end.date_naive() {
            debug!(employee_id = %employee_id, "slot crosses local midnight");
            return Err(unavailable());
        }

        let Some(hours) = self.working_hours_on(employee_id, local_start.weekday())? else {
            debug!(employee_id = %employee_id, day = %local_start.weekday(), "not a working day");
            return Err(unavailable());
        };
        if !hours.contains_slot(local_start.time(), local_end.time()) {
            debug!(employee_id = %employee_id, "slot outside working hours");
            return Err(unavailable());
        }

        let exceptions =
            self.ports
                .schedules
                .find_exceptions_overlapping(employee_id, slot.start, slot.end)?;
        if let Some(exception) = self.blocking_exception(slot, &exceptions) {
            debug!(
                employee_id = %employee_id,
                exception_id = %exception.id,
                kind = ?exception.exception_type,
                "slot blocked by schedule exception"
            );
            return Err(unavailable());
        }
        Ok(())
    }

    fn blocking_exception<'a>(
        &self,
        slot: &TimeSlot,
        exceptions: &'a [ScheduleException],
    ) -> Option<&'a ScheduleException> {
        exceptions.iter().find(|e| {
            self.config.exception_blocks(e.exception_type) && e.slot().overlaps(slot)
        })
    }

    fn ensure_no_conflict(
        &self,
        employee_id: EmployeeId,
        slot: &TimeSlot,
        exclude_id: Option<AppointmentId>,
    ) -> Result<()> {
        let conflicting: Vec<AppointmentId> = self
            .ports
            .appointments
            .find_overlapping(employee_id, slot.start, slot.end, exclude_id)?
            .into_iter()
            .filter(|a| a.is_active() && Some(a.id) != exclude_id && a.slot().overlaps(slot))
            .map(|a| a.id)
            .collect();

        if conflicting.is_empty() {
            return Ok(());
        }
        warn!(
            employee_id = %employee_id,
            start_at = %slot.start,
            conflicts = conflicting.len(),
            "booking conflict"
        );
        Err(BookingError::AppointmentConflict {
            employee_id,
            start_at: slot.start,
            conflicting,
        })
    }

    fn ensure_outside_cancellation_window(
        &self,
        appointment: &Appointment,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let window_hours = self
            .ports
            .salons
            .cancellation_window_hours(appointment.salon_id)?;
        let until_start = appointment.start_at - now;
        // A window too large for a TimeDelta covers every start time.
        let expired = TimeDelta::try_hours(window_hours).is_none_or(|w| until_start < w);
        if expired {
            return Err(BookingError::CancellationWindowExpired {
                appointment_id: appointment.id,
                window_hours,
                hours_until_start: until_start.num_hours(),
            });
        }
        Ok(())
    }
}

/// `CANCELLED` and `NO_SHOW` keep the caller's reason on the appointment;
/// other transitions only carry it in the audit event.
fn records_reason(status: AppointmentStatus) -> bool {
    matches!(
        status,
        AppointmentStatus::Cancelled | AppointmentStatus::NoShow
    )
}

fn slot_of(start_at: DateTime<Utc>, minutes: i64, variant_id: VariantId) -> Result<TimeSlot> {
    TimeSlot::starting_at(start_at, minutes).ok_or_else(|| {
        BookingError::InvalidSchedule(format!(
            "variant {variant_id} duration {minutes} minutes out of range"
        ))
    })
}
