use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use appointment_cell::{
    AppointmentQuery, AppointmentStatus, BookingError, BookingFormController, SubmissionClient,
};
use doctor_cell::{AvailabilityService, DoctorQuery, DoctorSearch, SlotBlock};
use shared_api::{ClinicApiClient, ServiceCatalog};
use shared_config::AppConfig;
use shared_utils::clock;

#[derive(Parser)]
#[command(name = "clinic-booking")]
#[command(version)]
#[command(about = "Browse doctors and book clinic appointments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List doctors and the specialties among them
    Doctors {
        /// Case-insensitive substring of the doctor's name
        #[arg(long)]
        search: Option<String>,

        /// Exact specialty
        #[arg(long)]
        specialty: Option<String>,
    },

    /// List the clinic's services
    Services,

    /// Show the daily time slot catalog
    Slots,

    /// Fill in and submit the booking form
    Book {
        #[arg(long)]
        doctor_id: String,

        #[arg(long)]
        patient_name: String,

        /// Appointment date as YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// One of the catalog slots, e.g. 09:30
        #[arg(long)]
        time: String,
    },

    /// List booked appointments
    Appointments {
        #[arg(long)]
        doctor_id: Option<String>,

        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show one appointment
    Appointment { id: String },

    /// Change an appointment's status
    SetStatus {
        id: String,

        /// pending, confirmed or cancelled
        status: AppointmentStatus,
    },
}

/// Services wired once per invocation.
pub struct ClinicContext {
    config: AppConfig,
    api: Arc<ClinicApiClient>,
    availability: Arc<AvailabilityService>,
    submission: SubmissionClient,
}

impl ClinicContext {
    pub fn new(config: AppConfig, api: Arc<ClinicApiClient>) -> Self {
        Self {
            config,
            availability: Arc::new(AvailabilityService::new(api.clone())),
            submission: SubmissionClient::new(api.clone()),
            api,
        }
    }
}

pub async fn run(command: Commands, context: &ClinicContext) -> anyhow::Result<()> {
    match command {
        Commands::Doctors { search, specialty } => {
            let mut query = DoctorQuery::all();
            if let Some(search) = search {
                query = query.with_search(search);
            }
            if let Some(specialty) = specialty {
                query = query.with_specialty(specialty);
            }
            list_doctors(context, query).await
        }
        Commands::Services => {
            let services = context.api.list_services().await?;
            print_json(&services)
        }
        Commands::Slots => print_json(&json!({
            "morning": context.availability.slots_in(SlotBlock::Morning),
            "afternoon": context.availability.slots_in(SlotBlock::Afternoon),
        })),
        Commands::Book {
            doctor_id,
            patient_name,
            date,
            time,
        } => book(context, doctor_id, patient_name, date, time).await,
        Commands::Appointments { doctor_id, date } => {
            let query = AppointmentQuery { doctor_id, date };
            let appointments = context.submission.list_appointments(&query).await?;
            print_json(&appointments)
        }
        Commands::Appointment { id } => {
            let appointment = context.submission.get_appointment(&id).await?;
            print_json(&appointment)
        }
        Commands::SetStatus { id, status } => {
            let appointment = context.submission.update_status(&id, status).await?;
            print_json(&appointment)
        }
    }
}

/// Runs the query through the debounced search session, the same path an interactive
/// search box takes.
async fn list_doctors(context: &ClinicContext, query: DoctorQuery) -> anyhow::Result<()> {
    let search = DoctorSearch::new(
        Arc::clone(&context.availability),
        context.config.doctor_search_debounce(),
    );
    let mut updates = search.subscribe();

    search.update(query);

    let state = updates
        .wait_for(|state| !state.loading && state.listing.is_some())
        .await
        .context("doctor search ended before producing a result")?
        .clone();

    if let Some(reason) = state.failure() {
        bail!("failed to load doctors: {reason}");
    }

    print_json(&json!({
        "doctors": state.doctors(),
        "specialties": state.specialties,
    }))
}

async fn book(
    context: &ClinicContext,
    doctor_id: String,
    patient_name: String,
    date: String,
    time: String,
) -> anyhow::Result<()> {
    let controller = BookingFormController::new(
        Arc::clone(&context.availability),
        context.submission.clone(),
        clock::system_clock(),
        context.config.success_dismiss_delay(),
    );

    if let Some(reason) = controller.load(Some(&doctor_id)).await.failure() {
        warn!("Booking without a doctor list: {}", reason);
    }
    controller.set_patient_name(patient_name);
    controller.set_date(date);
    controller.set_time(time);

    let outcome = controller.submit().await;
    controller.shutdown();

    match outcome {
        Ok(appointment) => print_json(&appointment),
        Err(BookingError::Validation(errors)) => {
            debug!("Booking form rejected: {}", errors);
            print_json(&json!({ "fieldErrors": errors }))?;
            bail!("booking form has {} invalid field(s)", errors.len())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
