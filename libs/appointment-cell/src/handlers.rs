// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, BookAppointmentRequest, CancelOutcome,
    RescheduleAppointmentRequest, RescheduleOutcome, Slot, TIME_FORMAT,
};
use crate::services::booking::AppointmentService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ConflictCheckQuery {
    pub doctor_name: String,
    pub date: String,
    pub time: String,
    pub exclude_id: Option<String>,
}

// ==============================================================================
// MESSAGE COMPOSITION
// ==============================================================================

// The user-facing wording lives here, composed from the structured slot
// fields, so the core never carries pre-formatted text.
fn slot_taken_message(slot: &Slot) -> String {
    format!(
        "An appointment is already booked with Dr. {} on {} at {}. Please choose a different time.",
        slot.doctor_name,
        slot.date,
        slot.time.format(TIME_FORMAT),
    )
}

fn map_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::Validation(msg) => AppError::ValidationError(msg),
        AppointmentError::BookingConflict(slot) => AppError::Conflict(slot_taken_message(&slot)),
        AppointmentError::StoreUnavailable(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointment = service.book_appointment(request).await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment_id": appointment.id,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointments = service.list_appointments().await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "total": appointments.len(),
        "appointments": appointments,
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    match service.cancel_appointment(&appointment_id).await.map_err(map_error)? {
        CancelOutcome::Cancelled => Ok(Json(json!({
            "success": true,
            "message": "Appointment canceled successfully"
        }))),
        CancelOutcome::NotFound => Err(AppError::NotFound(
            format!("No appointment found with id {}", appointment_id.trim()))),
    }
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    match service.reschedule_appointment(&appointment_id, request).await.map_err(map_error)? {
        RescheduleOutcome::Rescheduled => Ok(Json(json!({
            "success": true,
            "message": "Appointment rescheduled successfully"
        }))),
        RescheduleOutcome::NotFound => Err(AppError::NotFound(
            format!("No appointment found with id {}", appointment_id.trim()))),
        RescheduleOutcome::SlotUnavailable(slot) => Err(AppError::Conflict(
            slot_taken_message(&slot))),
    }
}

#[axum::debug_handler]
pub async fn check_slot(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let has_conflict = service.check_slot(
        &query.doctor_name,
        &query.date,
        &query.time,
        query.exclude_id.as_deref(),
    ).await.map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "has_conflict": has_conflict,
    })))
}
