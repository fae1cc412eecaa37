//! marcacheck - trademark viability advisor
//!
//! Answers one question per request: how likely is this brand to be
//! registrable in Mexico for this line of business?
//!
//! # Architecture
//!
//! - **advisory**: asks a generative model for a score, classes and a note
//! - **probe**: searches the IMPI Marcanet portal for an identical mark
//! - **reconcile**: lets a confirmed collision override the model
//! - **service**: runs the three in order for one request
//! - **http**: `POST /consultar` for the front-end

pub mod errors;
pub mod types;

pub mod advisory;
pub mod probe;
pub mod reconcile;
pub mod service;

pub mod cli;
pub mod doctor;
pub mod http;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use service::TrademarkService;
pub use types::{AdvisoryResult, Assessment, AvailabilitySignal, ConsultaRequest};
