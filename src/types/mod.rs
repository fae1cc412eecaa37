//! Type definitions module
//!
//! Core value types flowing between the advisory engine, the registry probe,
//! and the reconciler.

pub mod advisory;
pub mod availability;
pub mod consulta;

// Re-export commonly used types
pub use advisory::{AdvisoryResult, AdvisorySource, MAX_VIABILITY};
pub use availability::AvailabilitySignal;
pub use consulta::{Assessment, ConsultaRequest};
