//! Advisory result returned to the front-end
//!
//! The wire names (`viabilidad`, `clases`, `nota`) are what the existing
//! front-end reads; English aliases are accepted on input.

use serde::{Deserialize, Serialize};

/// Upper bound of the viability score
pub const MAX_VIABILITY: u8 = 100;

/// Registrability assessment of a brand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvisoryResult {
    /// Confidence score, 0..=100
    #[serde(rename = "viabilidad", alias = "viability")]
    pub viability: u8,

    /// Nice classification labels with rationale, in model order
    #[serde(rename = "clases", alias = "categories", alias = "classes")]
    pub categories: Vec<String>,

    /// Free-text advisory commentary
    #[serde(rename = "nota", alias = "note")]
    pub note: String,
}

impl AdvisoryResult {
    /// Create a result, clamping the score into range
    pub fn new(viability: u8, categories: Vec<String>, note: impl Into<String>) -> Self {
        Self {
            viability: viability.min(MAX_VIABILITY),
            categories,
            note: note.into(),
        }
    }
}

impl Default for AdvisoryResult {
    /// Fallback used when the model cannot be consulted
    fn default() -> Self {
        Self {
            viability: 75,
            categories: vec!["Clase 35".to_string()],
            note: "Análisis preliminar generado.".to_string(),
        }
    }
}

/// Where the advisory part of an assessment came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorySource {
    /// Parsed from the model reply
    Model,
    /// Substituted after an advisory failure
    Fallback,
}
