pub mod availability;
pub mod search;

pub use availability::{specialties, AvailabilityService};
pub use search::DoctorSearch;
