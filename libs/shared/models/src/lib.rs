pub mod appointment;
pub mod doctor;
pub mod error;
pub mod service;
pub mod slot;

pub use appointment::{
    Appointment, AppointmentDraft, AppointmentQuery, AppointmentStatus, UpdateStatusRequest,
};
pub use doctor::{Doctor, DoctorQuery};
pub use error::{AppError, AppResult};
pub use service::Service;
pub use slot::{SlotBlock, TimeSlot, TIME_SLOTS};
