use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{DoctorQuery, DoctorSearchState};
use crate::services::availability::AvailabilityService;

/// A doctor search box session with debounced fetching.
///
/// Every [`DoctorSearch::update`] cancels the pending fetch and schedules a new one after the
/// debounce delay, so only the last query typed in a burst reaches the backend. Results are
/// published on a watch channel.
pub struct DoctorSearch {
    availability: Arc<AvailabilityService>,
    debounce: Duration,
    state: Arc<watch::Sender<DoctorSearchState>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DoctorSearch {
    pub fn new(availability: Arc<AvailabilityService>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(DoctorSearchState::default());

        Self {
            availability,
            debounce,
            state: Arc::new(state),
            pending: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DoctorSearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DoctorSearchState {
        self.state.borrow().clone()
    }

    /// Must be called from within a Tokio runtime.
    pub fn update(&self, query: DoctorQuery) {
        self.cancel();

        self.state.send_modify(|state| {
            state.query = query.clone();
            state.loading = true;
        });

        let availability = Arc::clone(&self.availability);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let listing = availability.list_doctors(&query).await;

            state.send_modify(|current| {
                // A newer query owns the state now.
                if current.query != query {
                    return;
                }
                current.specialties = listing.specialties();
                current.listing = Some(listing);
                current.loading = false;
            });
        });

        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Drops any scheduled or in-flight fetch. Its response, if any, is discarded.
    pub fn cancel(&self) {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = pending {
            if !handle.is_finished() {
                debug!("Cancelling pending doctor search");
                handle.abort();
                self.state.send_modify(|state| state.loading = false);
            }
        }
    }
}

impl Drop for DoctorSearch {
    fn drop(&mut self) {
        if let Some(handle) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
