pub mod booking;
pub mod dismiss;
pub mod submission;
pub mod validation;

pub use booking::BookingFormController;
pub use dismiss::DismissTimer;
pub use submission::SubmissionClient;
