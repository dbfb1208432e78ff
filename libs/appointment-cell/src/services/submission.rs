// libs/appointment-cell/src/services/submission.rs
use std::sync::Arc;

use tracing::{debug, error, info};

use shared_api::AppointmentGateway;
use shared_models::AppResult;

use crate::models::{Appointment, AppointmentDraft, AppointmentQuery, AppointmentStatus};

/// Sends bookings to the appointments API.
///
/// Every operation is one network call. Nothing is retried here: a failed create means the
/// caller must treat the draft as not submitted.
#[derive(Clone)]
pub struct SubmissionClient {
    gateway: Arc<dyn AppointmentGateway>,
}

impl SubmissionClient {
    pub fn new(gateway: Arc<dyn AppointmentGateway>) -> Self {
        Self { gateway }
    }

    pub async fn create_appointment(
        &self,
        draft: &AppointmentDraft,
        idempotency_key: Option<&str>,
    ) -> AppResult<Appointment> {
        debug!(
            "Submitting booking for doctor {} on {} at {}",
            draft.doctor_id, draft.date, draft.time
        );

        match self.gateway.create_appointment(draft, idempotency_key).await {
            Ok(appointment) => {
                info!(
                    "Appointment {} created with status {}",
                    appointment.id, appointment.status
                );
                Ok(appointment)
            }
            Err(e) => {
                error!("Failed to create appointment: {}", e);
                Err(e)
            }
        }
    }

    pub async fn list_appointments(&self, query: &AppointmentQuery) -> AppResult<Vec<Appointment>> {
        debug!("Listing appointments with filters: {:?}", query);
        self.gateway.list_appointments(query).await
    }

    pub async fn get_appointment(&self, appointment_id: &str) -> AppResult<Appointment> {
        debug!("Fetching appointment: {}", appointment_id);
        self.gateway.get_appointment(appointment_id).await
    }

    /// Asks the backend to move an appointment to `status`. The backend decides whether the
    /// change is allowed.
    pub async fn update_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> AppResult<Appointment> {
        debug!("Updating appointment {} to {}", appointment_id, status);
        let appointment = self
            .gateway
            .update_appointment_status(appointment_id, status)
            .await?;
        info!("Appointment {} is now {}", appointment.id, appointment.status);
        Ok(appointment)
    }
}
