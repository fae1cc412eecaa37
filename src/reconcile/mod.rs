//! Result reconciliation
//!
//! Folds the registry signal into the advisory result. A confirmed collision
//! overrides the model; an inconclusive check only adds a disclaimer.

use crate::cli::config::{NoteMode, PolicyConfig};
use crate::types::{AdvisoryResult, AvailabilitySignal, MAX_VIABILITY};

/// Combines advisory output with the registry signal
#[derive(Debug, Clone)]
pub struct ResultReconciler {
    occupied_viability: u8,
    occupied_note: String,
    connection_error_note: String,
    ambiguous_note: String,
    note_mode: NoteMode,
}

impl Default for ResultReconciler {
    fn default() -> Self {
        Self::from_policy(&PolicyConfig::default())
    }
}

impl ResultReconciler {
    pub fn from_policy(policy: &PolicyConfig) -> Self {
        Self {
            occupied_viability: policy.occupied_viability.min(MAX_VIABILITY),
            occupied_note: policy.occupied_note.clone(),
            connection_error_note: policy.connection_error_note.clone(),
            ambiguous_note: policy.ambiguous_note.clone(),
            note_mode: policy.note_mode,
        }
    }

    pub fn occupied_note(&self) -> &str {
        &self.occupied_note
    }

    /// Apply the precedence rules. Categories are never touched.
    pub fn reconcile(&self, advisory: AdvisoryResult, availability: AvailabilitySignal) -> AdvisoryResult {
        match availability {
            AvailabilitySignal::Available => advisory,
            AvailabilitySignal::Occupied => AdvisoryResult {
                viability: self.occupied_viability,
                note: self.occupied_note.clone(),
                ..advisory
            },
            AvailabilitySignal::ConnectionError => self.with_disclaimer(advisory, &self.connection_error_note),
            AvailabilitySignal::Ambiguous => self.with_disclaimer(advisory, &self.ambiguous_note),
        }
    }

    fn with_disclaimer(&self, advisory: AdvisoryResult, disclaimer: &str) -> AdvisoryResult {
        let original = advisory.note.trim();
        let note = match self.note_mode {
            NoteMode::Replace => disclaimer.to_string(),
            NoteMode::Append if original.is_empty() => disclaimer.to_string(),
            NoteMode::Append => format!("{} {}", original, disclaimer),
        };

        AdvisoryResult { note, ..advisory }
    }
}
