// libs/appointment-cell/src/services/validation.rs
use chrono::NaiveDate;
use tracing::debug;

use doctor_cell::Doctor;

use crate::models::{AppointmentDraft, BookingForm, FieldErrors, FormField, TimeSlot};

pub const MIN_PATIENT_NAME_CHARS: usize = 2;
const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DOCTOR_REQUIRED: &str = "Please select a doctor";
pub const DOCTOR_UNKNOWN: &str = "Please select a doctor from the list";
pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
pub const DATE_REQUIRED: &str = "Please select a date";
pub const DATE_INVALID: &str = "Please enter a valid date";
pub const DATE_IN_PAST: &str = "Date cannot be in the past";
pub const TIME_REQUIRED: &str = "Please select a time";
pub const TIME_NOT_IN_CATALOG: &str = "Please select a valid time slot";

/// Checks every field and either builds the draft or reports each failing field.
///
/// `doctors` is the list currently shown to the user; `today` is the user's calendar date.
pub fn validate_form(
    form: &BookingForm,
    doctors: &[Doctor],
    today: NaiveDate,
) -> Result<AppointmentDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let doctor_id = check_doctor(&form.doctor_id, doctors)
        .map_err(|msg| errors.insert(FormField::DoctorId, msg))
        .ok();
    let patient_name = check_patient_name(&form.patient_name)
        .map_err(|msg| errors.insert(FormField::PatientName, msg))
        .ok();
    let date = check_date(&form.date, today)
        .map_err(|msg| errors.insert(FormField::Date, msg))
        .ok();
    let time = check_time(&form.time)
        .map_err(|msg| errors.insert(FormField::Time, msg))
        .ok();

    match (doctor_id, patient_name, date, time) {
        (Some(doctor_id), Some(patient_name), Some(date), Some(time)) => Ok(AppointmentDraft {
            doctor_id,
            patient_name,
            date,
            time,
        }),
        _ => {
            debug!("Booking form rejected: {}", errors);
            Err(errors)
        }
    }
}

fn check_doctor(value: &str, doctors: &[Doctor]) -> Result<String, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DOCTOR_REQUIRED);
    }
    if !doctors.iter().any(|d| d.id == value) {
        return Err(DOCTOR_UNKNOWN);
    }
    Ok(value.to_string())
}

fn check_patient_name(value: &str) -> Result<String, &'static str> {
    let value = value.trim();
    if value.chars().count() < MIN_PATIENT_NAME_CHARS {
        return Err(NAME_TOO_SHORT);
    }
    Ok(value.to_string())
}

fn check_date(value: &str, today: NaiveDate) -> Result<NaiveDate, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DATE_REQUIRED);
    }
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| DATE_INVALID)?;
    // chrono accepts unpadded fields and a leading sign; only canonical yyyy-MM-dd passes.
    if date.format(DATE_FORMAT).to_string() != value {
        return Err(DATE_INVALID);
    }
    if date < today {
        return Err(DATE_IN_PAST);
    }
    Ok(date)
}

fn check_time(value: &str) -> Result<TimeSlot, &'static str> {
    if value.trim().is_empty() {
        return Err(TIME_REQUIRED);
    }
    TimeSlot::parse(value).ok_or(TIME_NOT_IN_CATALOG)
}
