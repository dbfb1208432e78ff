pub mod models;
pub mod services;

// Re-export models and services for the other cells
pub use models::*;
pub use services::*;
