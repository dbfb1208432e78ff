// libs/doctor-cell/src/services/availability.rs

use std::sync::Arc;

use tracing::{debug, warn};

use shared_api::DoctorDirectory;

use crate::models::{Doctor, DoctorListing, DoctorQuery, SlotBlock, TimeSlot, TIME_SLOTS};

/// Supplies the bookable doctors and the fixed daily slot catalog.
///
/// Listing never fails outward: a backend or network error comes back as
/// [`DoctorListing::Failed`] so callers decide between "no doctors" and "failed to load".
pub struct AvailabilityService {
    directory: Arc<dyn DoctorDirectory>,
}

impl AvailabilityService {
    pub fn new(directory: Arc<dyn DoctorDirectory>) -> Self {
        Self { directory }
    }

    /// List doctors matching the optional name search and specialty.
    /// Order is whatever the backend returned.
    pub async fn list_doctors(&self, query: &DoctorQuery) -> DoctorListing {
        debug!("Listing doctors with filters: {:?}", query);

        match self.directory.list_doctors(query).await {
            Ok(doctors) => {
                debug!("Loaded {} doctors", doctors.len());
                DoctorListing::loaded(doctors)
            }
            Err(e) => {
                warn!("Doctor listing failed: {}", e);
                DoctorListing::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn time_slots(&self) -> &'static [TimeSlot] {
        &TIME_SLOTS
    }

    pub fn slots_in(&self, block: SlotBlock) -> Vec<TimeSlot> {
        TIME_SLOTS
            .iter()
            .copied()
            .filter(|slot| slot.block() == block)
            .collect()
    }
}

/// Distinct specialties in first-seen order, for the specialty filter.
pub fn specialties(doctors: &[Doctor]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for doctor in doctors {
        if !seen.iter().any(|s| s == &doctor.specialty) {
            seen.push(doctor.specialty.clone());
        }
    }
    seen
}
