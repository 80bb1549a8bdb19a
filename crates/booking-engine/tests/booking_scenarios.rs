mod common;

use booking_engine::{
    AppointmentStatus, BookingError, Clock, ErrorKind, ExceptionType, ScheduleException,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::Salon;
use uuid::Uuid;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

#[test]
fn test_monday_booking_lifecycle() {
    // 2025-06-02 is a Monday.
    let salon = Salon::open(at(2025, 5, 28, 12, 0));
    let employee = salon.hire();

    let first = salon
        .service
        .create_appointment(salon.request(employee, at(2025, 6, 2, 10, 0)))
        .unwrap();
    assert_eq!(first.status, AppointmentStatus::Scheduled);
    assert_eq!(first.end_at, at(2025, 6, 2, 11, 0));

    let err = salon
        .service
        .create_appointment(salon.request(employee, at(2025, 6, 2, 10, 30)))
        .unwrap_err();
    assert!(matches!(err, BookingError::AppointmentConflict { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let confirmed = salon
        .service
        .update_status(first.id, AppointmentStatus::Confirmed, None, salon.salon_id)
        .unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let err = salon
        .service
        .update_status(first.id, AppointmentStatus::Scheduled, None, salon.salon_id)
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidStatusTransition { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_after_hours_request_is_unavailable() {
    let salon = Salon::open(at(2025, 5, 28, 12, 0));
    let employee = salon.hire();
    let err = salon
        .service
        .create_appointment(salon.request(employee, at(2025, 6, 2, 18, 0)))
        .unwrap_err();
    assert!(matches!(err, BookingError::EmployeeNotAvailable { .. }));
}

#[test]
fn test_vacation_blocks_overlapping_dates() {
    let salon = Salon::open(at(2025, 6, 1, 12, 0));
    let employee = salon.hire();

    let vacation = ScheduleException {
        id: Uuid::new_v4(),
        employee_id: employee,
        salon_id: salon.salon_id,
        start_at: at(2025, 6, 10, 0, 0),
        end_at: at(2025, 6, 15, 0, 0),
        reason: Some("summer".to_string()),
        exception_type: ExceptionType::Vacation,
    };
    let validator = salon.service.schedule_validator();
    let existing = salon.store.exceptions_for(employee);
    validator
        .validate_schedule_exception(&vacation, &existing, salon.clock.now())
        .unwrap();
    salon.store.put_exception(vacation);

    let err = salon
        .service
        .create_appointment(salon.request(employee, at(2025, 6, 11, 10, 0)))
        .unwrap_err();
    assert!(matches!(err, BookingError::EmployeeNotAvailable { .. }));

    // The Monday after the vacation is bookable again.
    assert!(salon
        .service
        .create_appointment(salon.request(employee, at(2025, 6, 16, 10, 0)))
        .is_ok());
}

#[test]
fn test_late_cancellation_is_refused() {
    let salon = Salon::open(at(2025, 5, 28, 12, 0));
    let employee = salon.hire();
    let appt = salon
        .service
        .create_appointment(salon.request(employee, at(2025, 6, 2, 10, 0)))
        .unwrap();

    salon.clock.set(at(2025, 6, 2, 10, 0) - Duration::hours(23));
    let err = salon
        .service
        .update_status(appt.id, AppointmentStatus::Cancelled, None, salon.salon_id)
        .unwrap_err();
    assert!(matches!(
        err,
        BookingError::CancellationWindowExpired { window_hours: 24, hours_until_start: 23, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::Policy);
}

#[test]
fn test_reschedule_onto_own_slot() {
    let salon = Salon::open(at(2025, 5, 28, 12, 0));
    let employee = salon.hire();
    let appt = salon
        .service
        .create_appointment(salon.request(employee, at(2025, 6, 2, 10, 0)))
        .unwrap();
    let moved = salon
        .service
        .reschedule(appt.id, at(2025, 6, 2, 10, 0), salon.salon_id)
        .unwrap();
    assert_eq!(moved.start_at, appt.start_at);
    assert_eq!(moved.id, appt.id);
}

#[test]
fn test_employees_do_not_share_slots() {
    let salon = Salon::open(at(2025, 5, 28, 12, 0));
    let alice = salon.hire();
    let bob = salon.hire();
    let start = at(2025, 6, 2, 10, 0);
    assert!(salon.service.create_appointment(salon.request(alice, start)).is_ok());
    assert!(salon.service.create_appointment(salon.request(bob, start)).is_ok());
}
