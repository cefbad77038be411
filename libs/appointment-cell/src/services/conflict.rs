// libs/appointment-cell/src/services/conflict.rs
use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use tracing::{debug, warn};

use std::sync::Arc;
use shared_database::postgrest::StoreClient;

use crate::models::{Appointment, AppointmentError, TIME_COLUMN_FORMAT};

pub struct ConflictChecker {
    store: Arc<StoreClient>,
}

impl ConflictChecker {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    /// Check whether an existing appointment already occupies the exact slot.
    /// Pass the appointment's own id when rescheduling so it does not count
    /// as a conflict with itself.
    pub async fn has_conflict(
        &self,
        doctor_name: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppointmentError> {
        debug!("Checking slot for doctor {} on {} at {}", doctor_name, date, time);

        let mut query_parts = vec![
            format!("doctor_name=eq.{}", urlencoding::encode(doctor_name)),
            format!("appointment_date=eq.{}", date),
            format!("appointment_time=eq.{}",
                    urlencoding::encode(&time.format(TIME_COLUMN_FORMAT).to_string())),
        ];

        if let Some(exclude) = exclude_id {
            query_parts.push(format!("id=neq.{}", exclude));
        }

        let path = format!("/rest/v1/appointments?{}&limit=1", query_parts.join("&"));

        let occupants: Vec<Appointment> = self.store.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| AppointmentError::StoreUnavailable(e.to_string()))?;

        let has_conflict = !occupants.is_empty();

        if has_conflict {
            warn!("Slot taken for doctor {} on {} at {}", doctor_name, date, time);
        }

        Ok(has_conflict)
    }
}
