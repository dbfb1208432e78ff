// libs/appointment-cell/src/services/booking.rs
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::{AvailabilityService, Doctor, DoctorListing, DoctorQuery};
use shared_utils::clock::{self, SharedClock};

use crate::models::{
    Appointment, AppointmentDraft, BookingError, BookingForm, BookingView, FieldErrors,
    FormField, FormStatus, SelectOption,
};
use crate::services::dismiss::DismissTimer;
use crate::services::submission::SubmissionClient;
use crate::services::validation::validate_form;

pub const DOCTOR_PLACEHOLDER: &str = "Choose a doctor";
pub const TIME_PLACEHOLDER: &str = "Select time slot";
pub const SUCCESS_MESSAGE: &str = "Appointment booked successfully!";
pub const BOOKING_FAILED_MESSAGE: &str = "Failed to book appointment. Please try again.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load doctors. Please try again later.";
pub const SUBMIT_LABEL: &str = "Book Appointment";
pub const SUBMITTING_LABEL: &str = "Booking...";

#[derive(Debug, Default)]
struct FormState {
    form: BookingForm,
    status: FormStatus,
    field_errors: FieldErrors,
    /// `None` while the doctor list has not arrived yet.
    listing: Option<DoctorListing>,
    /// Key minted for the last draft sent, kept so an identical re-submission reuses it.
    pending_key: Option<(AppointmentDraft, String)>,
    /// Bumped on every submission so a stale dismiss never clears a newer success.
    generation: u64,
}

impl FormState {
    fn doctors(&self) -> &[Doctor] {
        match &self.listing {
            Some(listing) => listing.doctors(),
            None => &[],
        }
    }

    fn transition(&mut self, next: FormStatus) -> Result<(), BookingError> {
        if !self.status.can_transition_to(&next) {
            if self.status.is_submitting() && next.is_submitting() {
                return Err(BookingError::SubmissionInFlight);
            }
            warn!("Invalid form transition attempted: {} -> {}", self.status, next);
            return Err(BookingError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        debug!("Booking form: {} -> {}", self.status, next);
        self.status = next;
        Ok(())
    }
}

/// Owns the booking form: its values, validation errors, and the
/// idle → submitting → success/failed lifecycle.
///
/// At most one submission is in flight per controller. A success returns to idle on its own
/// after the dismiss delay unless a new submission starts or the controller is torn down.
pub struct BookingFormController {
    availability: Arc<AvailabilityService>,
    submission: SubmissionClient,
    clock: SharedClock,
    dismiss_delay: Duration,
    state: Arc<Mutex<FormState>>,
    dismiss: Mutex<DismissTimer>,
}

impl BookingFormController {
    pub fn new(
        availability: Arc<AvailabilityService>,
        submission: SubmissionClient,
        clock: SharedClock,
        dismiss_delay: Duration,
    ) -> Self {
        Self {
            availability,
            submission,
            clock,
            dismiss_delay,
            state: Arc::new(Mutex::new(FormState::default())),
            dismiss: Mutex::new(DismissTimer::new()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_dismiss(&self) -> MutexGuard<'_, DismissTimer> {
        self.dismiss.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the doctor list. When it loads, `initial_doctor_id` (e.g. from a `doctorId` URL
    /// parameter) pre-fills the doctor field verbatim, even if no listed doctor has that id.
    pub async fn load(&self, initial_doctor_id: Option<&str>) -> DoctorListing {
        self.lock_state().listing = None;

        let listing = self.availability.list_doctors(&DoctorQuery::all()).await;

        let mut state = self.lock_state();
        match (&listing, initial_doctor_id) {
            (DoctorListing::Loaded { .. }, Some(doctor_id)) => {
                debug!("Pre-selecting doctor {}", doctor_id);
                state.form.doctor_id = doctor_id.to_string();
            }
            (DoctorListing::Failed { reason }, _) => {
                warn!("Booking form could not load doctors: {}", reason);
            }
            _ => {}
        }
        state.listing = Some(listing.clone());

        listing
    }

    pub fn set_field(&self, field: FormField, value: impl Into<String>) {
        let mut state = self.lock_state();
        state.form.set(field, value);
        state.field_errors.clear(field);
    }

    pub fn set_doctor_id(&self, value: impl Into<String>) {
        self.set_field(FormField::DoctorId, value);
    }

    pub fn set_patient_name(&self, value: impl Into<String>) {
        self.set_field(FormField::PatientName, value);
    }

    pub fn set_date(&self, value: impl Into<String>) {
        self.set_field(FormField::Date, value);
    }

    pub fn set_time(&self, value: impl Into<String>) {
        self.set_field(FormField::Time, value);
    }

    /// Validate the form and, if every field passes, send it as one booking.
    ///
    /// On success the form is cleared and the success state is shown until the dismiss delay
    /// passes. On a remote failure the entered values stay so the user can submit again.
    pub async fn submit(&self) -> Result<Appointment, BookingError> {
        let (draft, key, generation) = {
            let mut state = self.lock_state();

            if state.status.is_submitting() {
                return Err(BookingError::SubmissionInFlight);
            }

            let today = clock::today(self.clock.as_ref());
            let draft = match validate_form(&state.form, state.doctors(), today) {
                Ok(draft) => draft,
                Err(errors) => {
                    state.field_errors = errors.clone();
                    return Err(BookingError::Validation(errors));
                }
            };

            state.transition(FormStatus::Submitting)?;
            state.field_errors = FieldErrors::new();

            let key = match &state.pending_key {
                Some((previous, key)) if previous == &draft => key.clone(),
                _ => Uuid::new_v4().to_string(),
            };
            state.pending_key = Some((draft.clone(), key.clone()));
            state.generation += 1;

            (draft, key, state.generation)
        };

        self.lock_dismiss().cancel();

        let mut in_flight = InFlight {
            state: &self.state,
            generation,
            armed: true,
        };
        let outcome = self.submission.create_appointment(&draft, Some(&key)).await;
        in_flight.armed = false;

        let result = {
            let mut state = self.lock_state();
            match outcome {
                Ok(appointment) => {
                    state.transition(FormStatus::Success {
                        appointment_id: appointment.id.clone(),
                    })?;
                    state.form = BookingForm::default();
                    state.field_errors = FieldErrors::new();
                    state.pending_key = None;
                    info!("Booked appointment {} for {}", appointment.id, draft.patient_name);
                    Ok(appointment)
                }
                Err(e) => {
                    state.transition(FormStatus::Failed {
                        message: BOOKING_FAILED_MESSAGE.to_string(),
                    })?;
                    Err(BookingError::Remote(e))
                }
            }
        };

        if result.is_ok() {
            self.schedule_dismiss(generation);
        }

        result
    }

    fn schedule_dismiss(&self, generation: u64) {
        let state = Arc::clone(&self.state);

        self.lock_dismiss().schedule(self.dismiss_delay, move || {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.generation == generation && state.status.is_success() {
                let _ = state.transition(FormStatus::Idle);
            }
        });
    }

    /// Whether a success message is still waiting to be dismissed.
    pub fn dismiss_pending(&self) -> bool {
        self.lock_dismiss().is_pending()
    }

    /// Cancels the scheduled dismiss. Call when the form goes away.
    pub fn shutdown(&self) {
        self.lock_dismiss().cancel();
    }

    pub fn status(&self) -> FormStatus {
        self.lock_state().status.clone()
    }

    pub fn form(&self) -> BookingForm {
        self.lock_state().form.clone()
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.lock_state().field_errors.clone()
    }

    pub fn listing(&self) -> Option<DoctorListing> {
        self.lock_state().listing.clone()
    }

    /// Snapshot of everything the form renders.
    pub fn view(&self) -> BookingView {
        let state = self.lock_state();

        let doctor_options = select_options(
            DOCTOR_PLACEHOLDER,
            state
                .doctors()
                .iter()
                .map(|d| (d.id.clone(), d.display_label())),
            &state.form.doctor_id,
        );
        let time_options = select_options(
            TIME_PLACEHOLDER,
            self.availability
                .time_slots()
                .iter()
                .map(|slot| (slot.as_str().to_string(), slot.as_str().to_string())),
            &state.form.time,
        );

        let specialty_options = state
            .listing
            .as_ref()
            .map(DoctorListing::specialties)
            .unwrap_or_default();

        let load_error = state
            .listing
            .as_ref()
            .filter(|listing| listing.is_failed())
            .map(|_| LOAD_FAILED_MESSAGE.to_string());

        let (success_message, error_message) = match &state.status {
            FormStatus::Success { .. } => (Some(SUCCESS_MESSAGE.to_string()), None),
            FormStatus::Failed { message } => (None, Some(message.clone())),
            _ => (None, None),
        };

        let submitting = state.status.is_submitting();

        BookingView {
            form: state.form.clone(),
            status: state.status.clone(),
            field_errors: state.field_errors.clone(),
            doctor_options,
            time_options,
            specialty_options,
            loading: state.listing.is_none(),
            load_error,
            success_message,
            error_message,
            submit_enabled: !submitting,
            submit_label: (if submitting { SUBMITTING_LABEL } else { SUBMIT_LABEL }).to_string(),
            min_date: clock::today(self.clock.as_ref()),
        }
    }
}

impl Drop for BookingFormController {
    fn drop(&mut self) {
        self.dismiss
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}

/// Fails the submission if the `submit` future is dropped while the request is in flight,
/// so the form does not stay locked in `Submitting`.
struct InFlight<'a> {
    state: &'a Mutex<FormState>,
    generation: u64,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation == self.generation && state.status.is_submitting() {
            warn!("Booking submission abandoned before the backend answered");
            let _ = state.transition(FormStatus::Failed {
                message: BOOKING_FAILED_MESSAGE.to_string(),
            });
        }
    }
}

/// Placeholder first, then the items. An unmatched current value selects the placeholder.
fn select_options(
    placeholder: &str,
    items: impl Iterator<Item = (String, String)>,
    current: &str,
) -> Vec<SelectOption> {
    let mut options: Vec<SelectOption> = items
        .map(|(value, label)| SelectOption {
            selected: !current.is_empty() && value == current,
            value,
            label,
        })
        .collect();

    let any_selected = options.iter().any(|option| option.selected);
    options.insert(
        0,
        SelectOption {
            value: String::new(),
            label: placeholder.to_string(),
            selected: !any_selected,
        },
    );
    options
}
