use serde::{Deserialize, Serialize};

pub use shared_models::{Doctor, DoctorQuery, SlotBlock, TimeSlot, TIME_SLOTS};

use crate::services::availability::specialties;

/// Outcome of a doctor listing.
///
/// Keeps "the backend has no doctors" apart from "the backend could not be reached", while
/// [`DoctorListing::doctors`] still degrades a failure to an empty list for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DoctorListing {
    Loaded { doctors: Vec<Doctor> },
    Failed { reason: String },
}

impl DoctorListing {
    pub fn loaded(doctors: Vec<Doctor>) -> Self {
        DoctorListing::Loaded { doctors }
    }

    pub fn doctors(&self) -> &[Doctor] {
        match self {
            DoctorListing::Loaded { doctors } => doctors,
            DoctorListing::Failed { .. } => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DoctorListing::Failed { .. })
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            DoctorListing::Failed { reason } => Some(reason),
            DoctorListing::Loaded { .. } => None,
        }
    }

    pub fn specialties(&self) -> Vec<String> {
        specialties(self.doctors())
    }
}

/// Latest published state of a [`crate::DoctorSearch`] session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorSearchState {
    pub query: DoctorQuery,
    /// `None` until the first fetch for this session completes.
    pub listing: Option<DoctorListing>,
    pub specialties: Vec<String>,
    pub loading: bool,
}

impl DoctorSearchState {
    pub fn doctors(&self) -> &[Doctor] {
        match &self.listing {
            Some(listing) => listing.doctors(),
            None => &[],
        }
    }

    pub fn failure(&self) -> Option<&str> {
        self.listing.as_ref().and_then(DoctorListing::failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(id: &str, specialty: &str) -> Doctor {
        Doctor {
            id: id.to_string(),
            name: format!("Dr. {id}"),
            specialty: specialty.to_string(),
            experience: 5,
            image: String::new(),
            bio: None,
        }
    }

    #[test]
    fn test_failed_listing_degrades_to_empty() {
        let listing = DoctorListing::Failed { reason: "timeout".to_string() };

        assert!(listing.doctors().is_empty());
        assert!(listing.specialties().is_empty());
        assert!(listing.is_failed());
        assert_eq!(listing.failure(), Some("timeout"));
    }

    #[test]
    fn test_loaded_listing() {
        let listing = DoctorListing::loaded(vec![doctor("d1", "Cardiology"), doctor("d2", "Neurology")]);

        assert!(!listing.is_failed());
        assert_eq!(listing.doctors()[1].specialty, "Neurology");
        assert_eq!(listing.specialties(), vec!["Cardiology", "Neurology"]);
    }

    #[test]
    fn test_search_state_before_first_fetch() {
        let state = DoctorSearchState::default();
        assert!(state.doctors().is_empty());
        assert!(state.failure().is_none());
        assert!(!state.loading);
    }
}
