//! Shared setup for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use booking_engine::{
    AppointmentSource, BookingConfig, BookingRequest, BookingService, Collaborators, FixedClock,
    InMemoryStore, WeeklySchedule,
};
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

pub struct Salon {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
    pub service: BookingService,
    pub salon_id: Uuid,
    pub variant_id: Uuid,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl Salon {
    /// A salon with one 60-minute service variant and no employees yet.
    pub fn open(now: DateTime<Utc>) -> Self {
        init_tracing();
        let config = BookingConfig::default();
        let store = Arc::new(InMemoryStore::new(config.default_cancellation_window_hours));
        let clock = Arc::new(FixedClock::new(now));
        let salon_id = Uuid::new_v4();
        let variant_id = Uuid::new_v4();
        store.add_variant(salon_id, variant_id, 60);

        let ports = Collaborators::from_backend(store.clone(), clock.clone());
        Self {
            store,
            clock,
            service: BookingService::new(ports, config),
            salon_id,
            variant_id,
        }
    }

    /// Hire an employee working 09:00-17:00 Monday to Friday.
    pub fn hire(&self) -> Uuid {
        let employee_id = Uuid::new_v4();
        self.store.add_employee(self.salon_id, employee_id);
        for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
            self.store.put_weekly_schedule(WeeklySchedule {
                id: Uuid::new_v4(),
                employee_id,
                salon_id: self.salon_id,
                day_of_week: day,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                is_working_day: true,
            });
        }
        employee_id
    }

    pub fn request(&self, employee_id: Uuid, start_at: DateTime<Utc>) -> BookingRequest {
        BookingRequest {
            salon_id: self.salon_id,
            client_id: Uuid::new_v4(),
            employee_id,
            variant_id: self.variant_id,
            start_at,
            source: AppointmentSource::Direct,
            notes: None,
        }
    }
}
