//! Advisory module
//!
//! Asks a generative model for a registrability estimate and parses the
//! reply defensively.

pub mod client;
pub mod engine;
pub mod parser;
pub mod prompt;

// Re-export commonly used types
pub use client::{GeminiClient, GenerativeModel, UnavailableModel, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use engine::AdvisoryEngine;
pub use parser::parse_reply;
