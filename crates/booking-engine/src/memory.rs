//! In-memory backend implementing every port.
//!
//! Suitable for tests and local development: fast, deterministic, isolated.
//! Writes replace whole records under one lock, so each `save` is atomic.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc, Weekday};
use chrono_tz::Tz;
use parking_lot::RwLock;

use crate::appointment::Appointment;
use crate::error::RepositoryError;
use crate::ports::{
    AppointmentRepository, AuditEvent, AuditSink, RepositoryResult, SalonPolicy,
    ScheduleRepository, ServiceCatalog,
};
use crate::schedule::{ScheduleException, WeeklySchedule};
use crate::slot::TimeSlot;
use crate::{AppointmentId, EmployeeId, SalonId, VariantId};

pub struct InMemoryStore {
    data: RwLock<StoreData>,
}

struct StoreData {
    employees: HashSet<(EmployeeId, SalonId)>,
    variants: HashMap<(VariantId, SalonId), i64>,
    weekly: HashMap<(EmployeeId, Weekday), WeeklySchedule>,
    exceptions: Vec<ScheduleException>,
    appointments: HashMap<AppointmentId, Appointment>,
    cancellation_windows: HashMap<SalonId, i64>,
    timezones: HashMap<SalonId, Tz>,
    default_cancellation_window_hours: i64,
    audit_log: Vec<AuditEvent>,
    is_healthy: bool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(24)
    }
}

impl InMemoryStore {
    /// `default_cancellation_window_hours` applies to salons without their own setting.
    pub fn new(default_cancellation_window_hours: i64) -> Self {
        Self {
            data: RwLock::new(StoreData {
                employees: HashSet::new(),
                variants: HashMap::new(),
                weekly: HashMap::new(),
                exceptions: Vec::new(),
                appointments: HashMap::new(),
                cancellation_windows: HashMap::new(),
                timezones: HashMap::new(),
                default_cancellation_window_hours,
                audit_log: Vec::new(),
                is_healthy: true,
            }),
        }
    }

    // ── Setup helpers ───────────────────────────────────────────────────

    pub fn add_employee(&self, salon_id: SalonId, employee_id: EmployeeId) {
        self.data.write().employees.insert((employee_id, salon_id));
    }

    pub fn add_variant(&self, salon_id: SalonId, variant_id: VariantId, duration_minutes: i64) {
        self.data
            .write()
            .variants
            .insert((variant_id, salon_id), duration_minutes);
    }

    /// Insert or replace the employee's schedule for that day.
    pub fn put_weekly_schedule(&self, schedule: WeeklySchedule) {
        self.data
            .write()
            .weekly
            .insert((schedule.employee_id, schedule.day_of_week), schedule);
    }

    pub fn remove_weekly_schedule(&self, employee_id: EmployeeId, day: Weekday) {
        self.data.write().weekly.remove(&(employee_id, day));
    }

    pub fn weekly_schedules_for(&self, employee_id: EmployeeId) -> Vec<WeeklySchedule> {
        self.data
            .read()
            .weekly
            .values()
            .filter(|s| s.employee_id == employee_id)
            .cloned()
            .collect()
    }

    pub fn put_exception(&self, exception: ScheduleException) {
        let mut data = self.data.write();
        data.exceptions.retain(|e| e.id != exception.id);
        data.exceptions.push(exception);
    }

    pub fn exceptions_for(&self, employee_id: EmployeeId) -> Vec<ScheduleException> {
        self.data
            .read()
            .exceptions
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .cloned()
            .collect()
    }

    pub fn set_cancellation_window(&self, salon_id: SalonId, hours: i64) {
        self.data
            .write()
            .cancellation_windows
            .insert(salon_id, hours);
    }

    pub fn set_timezone(&self, salon_id: SalonId, tz: Tz) {
        self.data.write().timezones.insert(salon_id, tz);
    }

    /// Simulate a storage outage: every port call fails while unhealthy.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn appointments(&self) -> Vec<Appointment> {
        let mut all: Vec<Appointment> = self.data.read().appointments.values().cloned().collect();
        all.sort_by_key(|a| (a.start_at, a.created_at));
        all
    }

    pub fn appointment_count(&self) -> usize {
        self.data.read().appointments.len()
    }

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.data.read().audit_log.clone()
    }
}

impl StoreData {
    fn check_health(&self) -> RepositoryResult<()> {
        if self.is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::Connection(
                "in-memory store marked unhealthy".to_string(),
            ))
        }
    }
}

impl ServiceCatalog for InMemoryStore {
    fn variant_duration_minutes(
        &self,
        variant_id: VariantId,
        salon_id: SalonId,
    ) -> RepositoryResult<Option<i64>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.variants.get(&(variant_id, salon_id)).copied())
    }
}

impl AppointmentRepository for InMemoryStore {
    fn find_overlapping(
        &self,
        employee_id: EmployeeId,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        exclude_id: Option<AppointmentId>,
    ) -> RepositoryResult<Vec<Appointment>> {
        let data = self.data.read();
        data.check_health()?;
        let window = TimeSlot::new(start_at, end_at);
        Ok(data
            .appointments
            .values()
            .filter(|a| a.employee_id == employee_id)
            .filter(|a| a.is_active())
            .filter(|a| Some(a.id) != exclude_id)
            .filter(|a| a.slot().overlaps(&window))
            .cloned()
            .collect())
    }

    fn find_by_id(
        &self,
        id: AppointmentId,
        salon_id: SalonId,
    ) -> RepositoryResult<Option<Appointment>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data
            .appointments
            .get(&id)
            .filter(|a| a.salon_id == salon_id)
            .cloned())
    }

    fn save(&self, appointment: Appointment) -> RepositoryResult<Appointment> {
        let mut data = self.data.write();
        data.check_health()?;
        data.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }
}

impl ScheduleRepository for InMemoryStore {
    fn employee_exists(
        &self,
        employee_id: EmployeeId,
        salon_id: SalonId,
    ) -> RepositoryResult<bool> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.employees.contains(&(employee_id, salon_id)))
    }

    fn find_weekly_schedule(
        &self,
        employee_id: EmployeeId,
        day_of_week: Weekday,
    ) -> RepositoryResult<Option<WeeklySchedule>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.weekly.get(&(employee_id, day_of_week)).cloned())
    }

    fn find_exceptions_overlapping(
        &self,
        employee_id: EmployeeId,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ScheduleException>> {
        let data = self.data.read();
        data.check_health()?;
        let window = TimeSlot::new(start_at, end_at);
        Ok(data
            .exceptions
            .iter()
            .filter(|e| e.employee_id == employee_id && e.slot().overlaps(&window))
            .cloned()
            .collect())
    }
}

impl SalonPolicy for InMemoryStore {
    fn cancellation_window_hours(&self, salon_id: SalonId) -> RepositoryResult<i64> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data
            .cancellation_windows
            .get(&salon_id)
            .copied()
            .unwrap_or(data.default_cancellation_window_hours))
    }

    fn timezone(&self, salon_id: SalonId) -> RepositoryResult<Tz> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.timezones.get(&salon_id).copied().unwrap_or(Tz::UTC))
    }
}

impl AuditSink for InMemoryStore {
    fn record(&self, event: &AuditEvent) {
        self.data.write().audit_log.push(event.clone());
    }
}
