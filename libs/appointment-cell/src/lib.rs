pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{
    Appointment,
    BookAppointmentRequest,
    RescheduleAppointmentRequest,
    CancelOutcome,
    RescheduleOutcome,
    Slot,
    AppointmentError,
};

pub use router::appointment_routes;

pub mod api {
    pub use crate::services::booking::AppointmentService;
    pub use crate::services::conflict::ConflictChecker;
}
