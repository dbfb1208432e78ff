pub mod clinic_api;
pub mod ports;

pub use clinic_api::ClinicApiClient;
pub use ports::{AppointmentGateway, DoctorDirectory, ServiceCatalog};
