// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, NaiveTime};
use std::fmt;

/// Accepted input formats for the booking form fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Format of the store's time column (seconds always present).
pub const TIME_COLUMN_FORMAT: &str = "%H:%M:%S";

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub patient_name: String,
    pub contact: String,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
}

impl Appointment {
    pub fn slot(&self) -> Slot {
        Slot::new(&self.doctor_name, self.appointment_date, self.appointment_time)
    }
}

/// The unit of doctor capacity: at most one active appointment per slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    pub doctor_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(doctor_name: &str, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            doctor_name: doctor_name.to_string(),
            date,
            time,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doctor {} on {} at {}",
               self.doctor_name, self.date, self.time.format(TIME_FORMAT))
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Booking form fields as the presentation layer collected them. Everything
/// arrives as raw text; parsing and presence checks happen in the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_name: String,
    pub contact: String,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_date: String,
    pub new_time: String,
}

// ==============================================================================
// OPERATION OUTCOMES
// ==============================================================================

/// A missing id is a normal outcome of cancellation, not a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    Cancelled,
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RescheduleOutcome {
    Rescheduled,
    NotFound,
    SlotUnavailable(Slot),
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Appointment slot already booked: {0}")]
    BookingConflict(Slot),

    #[error("Schedule store unavailable: {0}")]
    StoreUnavailable(String),
}

// ==============================================================================
// FIELD PARSING
// ==============================================================================

pub(crate) fn require_field(value: &str, field: &str) -> Result<String, AppointmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppointmentError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppointmentError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| AppointmentError::Validation(
            format!("date '{}' is not a valid YYYY-MM-DD date", raw)))
}

pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, AppointmentError> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|_| AppointmentError::Validation(
            format!("time '{}' is not a valid HH:MM time", raw)))
}

pub(crate) fn parse_appointment_id(raw: &str) -> Result<i64, AppointmentError> {
    let trimmed = require_field(raw, "appointment id")?;
    trimmed.parse::<i64>()
        .map_err(|_| AppointmentError::Validation(
            format!("appointment id '{}' is not a valid id", trimmed)))
}
