// libs/appointment-cell/src/models.rs
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use shared_models::{
    AppError, Appointment, AppointmentDraft, AppointmentQuery, AppointmentStatus, TimeSlot,
};

// ==============================================================================
// FORM STATE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    DoctorId,
    PatientName,
    Date,
    Time,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::DoctorId,
        FormField::PatientName,
        FormField::Date,
        FormField::Time,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::DoctorId => "doctorId",
            FormField::PatientName => "patientName",
            FormField::Date => "date",
            FormField::Time => "time",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw values as the user entered them. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub doctor_id: String,
    pub patient_name: String,
    pub date: String,
    pub time: String,
}

impl BookingForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::DoctorId => &self.doctor_id,
            FormField::PatientName => &self.patient_name,
            FormField::Date => &self.date,
            FormField::Time => &self.time,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::DoctorId => &mut self.doctor_id,
            FormField::PatientName => &mut self.patient_name,
            FormField::Date => &mut self.date,
            FormField::Time => &mut self.time,
        };
        *slot = value.into();
    }

    pub fn is_empty(&self) -> bool {
        FormField::ALL.iter().all(|field| self.get(*field).is_empty())
    }
}

/// One message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn clear(&mut self, field: FormField) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> Vec<FormField> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

// ==============================================================================
// FORM LIFECYCLE
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Success { appointment_id: String },
    Failed { message: String },
}

impl FormStatus {
    pub fn name(&self) -> &'static str {
        match self {
            FormStatus::Idle => "idle",
            FormStatus::Submitting => "submitting",
            FormStatus::Success { .. } => "success",
            FormStatus::Failed { .. } => "failed",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, FormStatus::Submitting)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FormStatus::Success { .. })
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: &FormStatus) -> bool {
        matches!(
            (self, next),
            (FormStatus::Idle, FormStatus::Submitting)
                | (FormStatus::Failed { .. }, FormStatus::Submitting)
                | (FormStatus::Success { .. }, FormStatus::Submitting)
                | (FormStatus::Submitting, FormStatus::Success { .. })
                | (FormStatus::Submitting, FormStatus::Failed { .. })
                | (FormStatus::Success { .. }, FormStatus::Idle)
        )
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ==============================================================================
// VIEW MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Everything needed to render the booking form at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingView {
    pub form: BookingForm,
    pub status: FormStatus,
    pub field_errors: FieldErrors,
    pub doctor_options: Vec<SelectOption>,
    pub time_options: Vec<SelectOption>,
    pub specialty_options: Vec<String>,
    pub loading: bool,
    pub load_error: Option<String>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub submit_enabled: bool,
    pub submit_label: String,
    pub min_date: NaiveDate,
}

impl BookingView {
    pub fn selected_doctor(&self) -> Option<&SelectOption> {
        self.doctor_options
            .iter()
            .find(|option| option.selected && !option.value.is_empty())
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("A booking is already being submitted")]
    SubmissionInFlight,

    #[error("Invalid form transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Remote(#[from] AppError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_get_set() {
        let mut form = BookingForm::default();
        assert!(form.is_empty());

        form.set(FormField::PatientName, "Jane Doe");
        form.set(FormField::Time, "09:00");

        assert_eq!(form.get(FormField::PatientName), "Jane Doe");
        assert_eq!(form.time, "09:00");
        assert!(!form.is_empty());
    }

    #[test]
    fn test_field_errors_are_independent() {
        let mut errors = FieldErrors::new();
        errors.insert(FormField::Date, "Please select a date");
        errors.insert(FormField::DoctorId, "Please select a doctor");

        errors.clear(FormField::Date);

        assert_eq!(errors.fields(), vec![FormField::DoctorId]);
        assert_eq!(errors.get(FormField::DoctorId), Some("Please select a doctor"));
        assert_eq!(errors.to_string(), "doctorId: Please select a doctor");
    }

    #[test]
    fn test_field_errors_serialize_by_wire_name() {
        let mut errors = FieldErrors::new();
        errors.insert(FormField::PatientName, "Name must be at least 2 characters");

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"patientName": "Name must be at least 2 characters"})
        );
    }

    #[test]
    fn test_lifecycle_transitions() {
        let success = FormStatus::Success { appointment_id: "a1".into() };
        let failed = FormStatus::Failed { message: "nope".into() };

        assert!(FormStatus::Idle.can_transition_to(&FormStatus::Submitting));
        assert!(failed.can_transition_to(&FormStatus::Submitting));
        assert!(success.can_transition_to(&FormStatus::Idle));
        assert!(FormStatus::Submitting.can_transition_to(&success));

        assert!(!FormStatus::Submitting.can_transition_to(&FormStatus::Submitting));
        assert!(!FormStatus::Idle.can_transition_to(&success));
        assert!(!failed.can_transition_to(&FormStatus::Idle));
    }
}
