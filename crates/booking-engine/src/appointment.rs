//! The booking entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slot::TimeSlot;
use crate::status::AppointmentStatus;
use crate::{AppointmentId, ClientId, EmployeeId, SalonId, VariantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentSource {
    #[default]
    Direct,
    Marketplace,
}

/// Input to [`crate::booking::BookingService::create_appointment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub salon_id: SalonId,
    pub client_id: ClientId,
    pub employee_id: EmployeeId,
    pub variant_id: VariantId,
    pub start_at: DateTime<Utc>,
    #[serde(default)]
    pub source: AppointmentSource,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A client's booking of one employee for one service variant.
///
/// Appointments are never deleted; `CANCELLED` is a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub salon_id: SalonId,
    pub client_id: ClientId,
    pub employee_id: EmployeeId,
    pub variant_id: VariantId,
    pub start_at: DateTime<Utc>,
    /// `start_at` plus the variant duration at booking or reschedule time.
    pub end_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub source: AppointmentSource,
    /// Set by billing; the engine carries it untouched.
    pub final_price: Option<Decimal>,
    pub commission_value: Option<Decimal>,
    pub notes: Option<String>,
    /// Reason given when the appointment was cancelled or marked `NO_SHOW`.
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// A fresh `SCHEDULED` appointment occupying `slot`.
    pub fn scheduled(request: BookingRequest, slot: TimeSlot, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            salon_id: request.salon_id,
            client_id: request.client_id,
            employee_id: request.employee_id,
            variant_id: request.variant_id,
            start_at: slot.start,
            end_at: slot.end,
            status: AppointmentStatus::Scheduled,
            source: request.source,
            final_price: None,
            commission_value: None,
            notes: request.notes,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_at, self.end_at)
    }

    /// Whether this appointment still occupies its employee's time.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn duration_minutes(&self) -> i64 {
        self.slot().duration_minutes()
    }
}
