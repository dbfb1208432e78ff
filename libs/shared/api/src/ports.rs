//! Capabilities the cells depend on. Each is implemented by [`crate::ClinicApiClient`]
//! and by in-memory doubles in tests.

use async_trait::async_trait;

use shared_models::{
    Appointment, AppointmentDraft, AppointmentQuery, AppointmentStatus, AppResult, Doctor,
    DoctorQuery, Service,
};

#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn list_doctors(&self, query: &DoctorQuery) -> AppResult<Vec<Doctor>>;
}

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn list_services(&self) -> AppResult<Vec<Service>>;
}

#[async_trait]
pub trait AppointmentGateway: Send + Sync {
    /// Single POST; the key, when given, travels as the `Idempotency-Key` header.
    async fn create_appointment(
        &self,
        draft: &AppointmentDraft,
        idempotency_key: Option<&str>,
    ) -> AppResult<Appointment>;

    async fn list_appointments(&self, query: &AppointmentQuery) -> AppResult<Vec<Appointment>>;

    async fn get_appointment(&self, id: &str) -> AppResult<Appointment>;

    async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> AppResult<Appointment>;
}
