use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};
use mockable::Clock;

pub use mockable::DefaultClock;

/// Clock handle shared between the controller and its scheduled tasks.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

pub fn system_clock() -> SharedClock {
    Arc::new(DefaultClock)
}

/// The calendar date the user sees, which is what "not in the past" is judged against.
pub fn today(clock: &(dyn Clock + Send + Sync)) -> NaiveDate {
    clock.local().date_naive()
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn at(utc_now: DateTime<Utc>) -> Self {
        Self(Mutex::new(utc_now))
    }

    pub fn shared(utc_now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self::at(utc_now))
    }

    pub fn advance_days(&self, days: i64) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) += TimeDelta::days(days);
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
