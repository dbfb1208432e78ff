use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::Notify;

use shared_api::{AppointmentGateway, DoctorDirectory, ServiceCatalog};
use shared_config::AppConfig;
use shared_models::{
    Appointment, AppointmentDraft, AppointmentQuery, AppointmentStatus, AppError, AppResult,
    Doctor, DoctorQuery, Service,
};

pub struct TestConfig {
    pub api_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
        }
    }
}

impl TestConfig {
    /// Points the config at a mock server started by the test.
    pub fn for_server(server_uri: &str) -> Self {
        Self {
            api_base_url: format!("{}/api", server_uri.trim_end_matches('/')),
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig::with_base_url(self.api_base_url.clone())
    }
}

pub struct MockClinicResponses;

impl MockClinicResponses {
    pub fn doctor(id: &str, name: &str, specialty: &str, experience: u32) -> Doctor {
        Doctor {
            id: id.to_string(),
            name: name.to_string(),
            specialty: specialty.to_string(),
            experience,
            image: format!("https://images.example.com/{id}.jpg"),
            bio: None,
        }
    }

    /// The four doctors the development backend is usually seeded with.
    pub fn seeded_doctors() -> Vec<Doctor> {
        vec![
            Self::doctor("d1", "Dr. Sarah Johnson", "Cardiology", 12),
            Self::doctor("d2", "Dr. Michael Chen", "Neurology", 15),
            Self::doctor("d3", "Dr. Emily Williams", "General Medicine", 8),
            Self::doctor("d4", "Dr. James Wilson", "Ophthalmology", 10),
        ]
    }

    pub fn doctor_response(id: &str, name: &str, specialty: &str, experience: u32) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "specialty": specialty,
            "image": format!("https://images.example.com/{id}.jpg"),
            "experience": experience,
            "bio": "",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn service_response(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "description": format!("{name} services"),
            "icon": "Stethoscope",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(id: &str, draft: &AppointmentDraft, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": draft.doctor_id,
            "patient_name": draft.patient_name,
            "date": draft.date.format("%Y-%m-%d").to_string(),
            "time": draft.time.as_str(),
            "status": status,
            "notes": "",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn persisted(id: &str, draft: &AppointmentDraft) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: id.to_string(),
            doctor_id: draft.doctor_id.clone(),
            doctor: None,
            patient_name: draft.patient_name.clone(),
            date: draft.date,
            time: draft.time.as_str().to_string(),
            status: AppointmentStatus::Pending,
            notes: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Scripted stand-in for the clinic backend.
///
/// Doctor listings filter like the real backend (case-insensitive name substring, exact
/// specialty). Creations succeed with a generated id unless an outcome was queued with
/// [`InMemoryClinicApi::push_create_outcome`].
#[derive(Default)]
pub struct InMemoryClinicApi {
    doctors: Mutex<Vec<Doctor>>,
    doctor_failure: Mutex<Option<AppError>>,
    services: Mutex<Vec<Service>>,
    create_outcomes: Mutex<VecDeque<AppResult<Appointment>>>,
    appointments: Mutex<Vec<Appointment>>,
    doctor_queries: Mutex<Vec<DoctorQuery>>,
    created: Mutex<Vec<(AppointmentDraft, Option<String>)>>,
    create_gate: Mutex<Option<Arc<Notify>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryClinicApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doctors(doctors: Vec<Doctor>) -> Self {
        let api = Self::default();
        *lock(&api.doctors) = doctors;
        api
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set_doctors(&self, doctors: Vec<Doctor>) {
        *lock(&self.doctors) = doctors;
    }

    pub fn set_services(&self, services: Vec<Service>) {
        *lock(&self.services) = services;
    }

    /// Makes every doctor listing fail with `error` until cleared.
    pub fn fail_doctor_listing(&self, error: Option<AppError>) {
        *lock(&self.doctor_failure) = error;
    }

    pub fn push_create_outcome(&self, outcome: AppResult<Appointment>) {
        lock(&self.create_outcomes).push_back(outcome);
    }

    /// Holds every creation until the returned handle is notified.
    pub fn hold_creations(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.create_gate) = Some(Arc::clone(&gate));
        gate
    }

    pub fn doctor_queries(&self) -> Vec<DoctorQuery> {
        lock(&self.doctor_queries).clone()
    }

    pub fn created_drafts(&self) -> Vec<AppointmentDraft> {
        lock(&self.created).iter().map(|(draft, _)| draft.clone()).collect()
    }

    pub fn idempotency_keys(&self) -> Vec<Option<String>> {
        lock(&self.created).iter().map(|(_, key)| key.clone()).collect()
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryClinicApi {
    async fn list_doctors(&self, query: &DoctorQuery) -> AppResult<Vec<Doctor>> {
        lock(&self.doctor_queries).push(query.clone());

        if let Some(error) = lock(&self.doctor_failure).clone() {
            return Err(error);
        }

        let search = query.search.as_deref().map(str::to_lowercase);
        let doctors = lock(&self.doctors)
            .iter()
            .filter(|d| match search.as_deref() {
                Some(s) if !s.is_empty() => d.name.to_lowercase().contains(s),
                _ => true,
            })
            .filter(|d| match query.specialty.as_deref() {
                Some(s) if !s.is_empty() => d.specialty == s,
                _ => true,
            })
            .cloned()
            .collect();

        Ok(doctors)
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryClinicApi {
    async fn list_services(&self) -> AppResult<Vec<Service>> {
        Ok(lock(&self.services).clone())
    }
}

#[async_trait]
impl AppointmentGateway for InMemoryClinicApi {
    async fn create_appointment(
        &self,
        draft: &AppointmentDraft,
        idempotency_key: Option<&str>,
    ) -> AppResult<Appointment> {
        lock(&self.created).push((draft.clone(), idempotency_key.map(str::to_string)));

        let gate = lock(&self.create_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let outcome = lock(&self.create_outcomes).pop_front();
        let appointment = match outcome {
            Some(outcome) => outcome?,
            None => {
                let id = format!("appt-{}", lock(&self.appointments).len() + 1);
                MockClinicResponses::persisted(&id, draft)
            }
        };

        lock(&self.appointments).push(appointment.clone());
        Ok(appointment)
    }

    async fn list_appointments(&self, query: &AppointmentQuery) -> AppResult<Vec<Appointment>> {
        let appointments = lock(&self.appointments)
            .iter()
            .filter(|a| query.doctor_id.as_ref().map_or(true, |id| &a.doctor_id == id))
            .filter(|a| query.date.map_or(true, |date| a.date == date))
            .cloned()
            .collect();
        Ok(appointments)
    }

    async fn get_appointment(&self, id: &str) -> AppResult<Appointment> {
        lock(&self.appointments)
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))
    }

    async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> AppResult<Appointment> {
        let mut appointments = lock(&self.appointments);
        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
        appointment.status = status;
        appointment.updated_at = Some(Utc::now());
        Ok(appointment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use shared_models::TimeSlot;

    fn draft() -> AppointmentDraft {
        AppointmentDraft {
            doctor_id: "d1".to_string(),
            patient_name: "Jane Doe".to_string(),
            date: NaiveDate::from_ymd_opt(2999, 1, 1).unwrap(),
            time: TimeSlot::parse("09:00").unwrap(),
        }
    }

    #[test]
    fn test_config_for_server() {
        let config = TestConfig::for_server("http://127.0.0.1:4000/").to_app_config();
        assert_eq!(config.api_base_url, "http://127.0.0.1:4000/api");
    }

    #[test]
    fn test_in_memory_doctor_filters() {
        let api = InMemoryClinicApi::with_doctors(MockClinicResponses::seeded_doctors());

        let by_name = tokio_test::block_on(api.list_doctors(&DoctorQuery::all().with_search("CHEN"))).unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "d2");

        let by_specialty =
            tokio_test::block_on(api.list_doctors(&DoctorQuery::all().with_specialty("Cardiology"))).unwrap();
        assert_eq!(by_specialty.len(), 1);

        assert_eq!(api.doctor_queries().len(), 2);
    }

    #[test]
    fn test_in_memory_create_and_update() {
        let api = InMemoryClinicApi::new();

        let created = tokio_test::block_on(api.create_appointment(&draft(), Some("k1"))).unwrap();
        assert_eq!(created.id, "appt-1");
        assert_eq!(api.idempotency_keys(), vec![Some("k1".to_string())]);

        let updated = tokio_test::block_on(
            api.update_appointment_status("appt-1", AppointmentStatus::Confirmed),
        )
        .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Confirmed);

        assert_matches!(
            tokio_test::block_on(api.get_appointment("nope")),
            Err(AppError::NotFound(_))
        );
    }

    #[test]
    fn test_queued_failure_is_returned_once() {
        let api = InMemoryClinicApi::new();
        api.push_create_outcome(Err(AppError::Network("connection reset".into())));

        assert_matches!(
            tokio_test::block_on(api.create_appointment(&draft(), None)),
            Err(AppError::Network(_))
        );
        assert!(tokio_test::block_on(api.create_appointment(&draft(), None)).is_ok());
        assert_eq!(api.created_drafts().len(), 2);
    }
}
