// libs/appointment-cell/src/services/booking.rs
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};
use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::postgrest::{StoreClient, StoreError};

use crate::models::{
    Appointment, AppointmentError, BookAppointmentRequest, CancelOutcome,
    RescheduleAppointmentRequest, RescheduleOutcome, Slot,
    parse_appointment_id, parse_date, parse_time, require_field,
    TIME_COLUMN_FORMAT, TIME_FORMAT,
};
use crate::services::conflict::ConflictChecker;

pub struct AppointmentService {
    store: Arc<StoreClient>,
    conflict_checker: ConflictChecker,
}

#[derive(Debug, Deserialize)]
struct DoctorNameRow {
    doctor_name: String,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(StoreClient::new(config));
        let conflict_checker = ConflictChecker::new(Arc::clone(&store));

        Self {
            store,
            conflict_checker,
        }
    }

    /// Book a new appointment. All fields arrive as raw text; nothing is
    /// written (or even queried) until every field passes validation.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let patient_name = require_field(&request.patient_name, "patient name")?;
        let contact = require_field(&request.contact, "contact")?;
        let doctor_name = require_field(&request.doctor_name, "doctor name")?;
        let date = parse_date(&require_field(&request.date, "date")?)?;
        let time = parse_time(&require_field(&request.time, "time")?)?;

        info!("Booking appointment for {} with doctor {}", patient_name, doctor_name);

        if self.conflict_checker.has_conflict(&doctor_name, date, time, None).await? {
            warn!("Booking conflict for doctor {} on {} at {}", doctor_name, date, time);
            return Err(AppointmentError::BookingConflict(Slot::new(&doctor_name, date, time)));
        }

        let body = json!({
            "patient_name": patient_name,
            "contact": contact,
            "doctor_name": doctor_name,
            "appointment_date": date.to_string(),
            "appointment_time": time.format(TIME_COLUMN_FORMAT).to_string(),
        });

        let created: Vec<Appointment> = self.store.request(
            Method::POST,
            "/rest/v1/appointments",
            Some(body),
            Some("return=representation"),
        ).await.map_err(|e| match e {
            // The unique slot index caught a writer that slipped past the
            // read-side check.
            StoreError::UniqueViolation(_) => {
                AppointmentError::BookingConflict(Slot::new(&doctor_name, date, time))
            }
            other => AppointmentError::StoreUnavailable(other.to_string()),
        })?;

        let appointment = created.into_iter().next()
            .ok_or_else(|| AppointmentError::StoreUnavailable(
                "store returned no row for the insert".to_string()))?;

        info!("Appointment {} booked with doctor {}", appointment.id, appointment.doctor_name);
        Ok(appointment)
    }

    /// Every persisted appointment, in id (insertion) order.
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing all appointments");

        self.store.request(
            Method::GET,
            "/rest/v1/appointments?order=id.asc",
            None,
            None,
        ).await.map_err(|e| AppointmentError::StoreUnavailable(e.to_string()))
    }

    /// Cancel by id. A zero-row delete is the `NotFound` outcome, not an error.
    pub async fn cancel_appointment(&self, raw_id: &str) -> Result<CancelOutcome, AppointmentError> {
        let id = parse_appointment_id(raw_id)?;
        debug!("Cancelling appointment {}", id);

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let deleted: Vec<Appointment> = self.store.request(
            Method::DELETE,
            &path,
            None,
            Some("return=representation"),
        ).await.map_err(|e| AppointmentError::StoreUnavailable(e.to_string()))?;

        if deleted.is_empty() {
            info!("No appointment with id {} to cancel", id);
            return Ok(CancelOutcome::NotFound);
        }

        info!("Appointment {} cancelled", id);
        Ok(CancelOutcome::Cancelled)
    }

    /// Move an appointment to a new slot. Only the date and time columns
    /// change; patient, contact and doctor are immutable after booking.
    pub async fn reschedule_appointment(
        &self,
        raw_id: &str,
        request: RescheduleAppointmentRequest,
    ) -> Result<RescheduleOutcome, AppointmentError> {
        let id = parse_appointment_id(raw_id)?;
        let new_date = parse_date(&require_field(&request.new_date, "new date")?)?;
        let new_time = parse_time(&require_field(&request.new_time, "new time")?)?;

        debug!("Rescheduling appointment {} to {} at {}",
               id, new_date, new_time.format(TIME_FORMAT));

        // The slot is per doctor and the doctor never changes, so the current
        // record decides which doctor's calendar the new slot must be free in.
        let doctor_name = match self.get_doctor_name(id).await? {
            Some(name) => name,
            None => {
                info!("No appointment with id {} to reschedule", id);
                return Ok(RescheduleOutcome::NotFound);
            }
        };

        if self.conflict_checker.has_conflict(&doctor_name, new_date, new_time, Some(id)).await? {
            warn!("Reschedule conflict for doctor {} on {} at {}",
                  doctor_name, new_date, new_time);
            return Ok(RescheduleOutcome::SlotUnavailable(
                Slot::new(&doctor_name, new_date, new_time)));
        }

        let body = json!({
            "appointment_date": new_date.to_string(),
            "appointment_time": new_time.format(TIME_COLUMN_FORMAT).to_string(),
        });

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let result: Result<Vec<Appointment>, StoreError> = self.store.request(
            Method::PATCH,
            &path,
            Some(body),
            Some("return=representation"),
        ).await;
        let updated = match result {
            Ok(rows) => rows,
            Err(StoreError::UniqueViolation(_)) => {
                return Ok(RescheduleOutcome::SlotUnavailable(
                    Slot::new(&doctor_name, new_date, new_time)));
            }
            Err(other) => return Err(AppointmentError::StoreUnavailable(other.to_string())),
        };

        if updated.is_empty() {
            // Record disappeared between the lookup and the update.
            info!("Appointment {} vanished before the reschedule applied", id);
            return Ok(RescheduleOutcome::NotFound);
        }

        info!("Appointment {} rescheduled to {} at {}",
              id, new_date, new_time.format(TIME_FORMAT));
        Ok(RescheduleOutcome::Rescheduled)
    }

    /// Raw-text front door for the conflict checker, for callers that want a
    /// slot probe without booking anything.
    pub async fn check_slot(
        &self,
        doctor_name: &str,
        raw_date: &str,
        raw_time: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, AppointmentError> {
        let doctor_name = require_field(doctor_name, "doctor name")?;
        let date = parse_date(&require_field(raw_date, "date")?)?;
        let time = parse_time(&require_field(raw_time, "time")?)?;
        let exclude = match exclude_id {
            Some(raw) => Some(parse_appointment_id(raw)?),
            None => None,
        };

        self.conflict_checker.has_conflict(&doctor_name, date, time, exclude).await
    }

    async fn get_doctor_name(&self, id: i64) -> Result<Option<String>, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select=doctor_name", id);

        let rows: Vec<DoctorNameRow> = self.store.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| AppointmentError::StoreUnavailable(e.to_string()))?;

        Ok(rows.into_iter().next().map(|row| row.doctor_name))
    }
}
