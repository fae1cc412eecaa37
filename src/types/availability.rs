//! Registry availability signal

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one registry probe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilitySignal {
    /// The registry reported no records for the name
    Available,

    /// The registry returned records for the name
    Occupied,

    /// The browser session failed before a page could be classified
    ConnectionError,

    /// A page loaded but could not be read as either answer
    /// (CAPTCHA, error page, partial load)
    Ambiguous,
}

impl AvailabilitySignal {
    /// Whether the registry produced a usable answer
    pub fn is_conclusive(self) -> bool {
        matches!(self, AvailabilitySignal::Available | AvailabilitySignal::Occupied)
    }

    /// Uppercase Spanish label for logs and terminal output
    pub fn label(self) -> &'static str {
        match self {
            AvailabilitySignal::Available => "DISPONIBLE",
            AvailabilitySignal::Occupied => "OCUPADA",
            AvailabilitySignal::ConnectionError => "ERROR_CONEXION",
            AvailabilitySignal::Ambiguous => "INDETERMINADA",
        }
    }
}

impl fmt::Display for AvailabilitySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conclusive() {
        assert!(AvailabilitySignal::Available.is_conclusive());
        assert!(AvailabilitySignal::Occupied.is_conclusive());
        assert!(!AvailabilitySignal::ConnectionError.is_conclusive());
        assert!(!AvailabilitySignal::Ambiguous.is_conclusive());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&AvailabilitySignal::ConnectionError).unwrap();
        assert_eq!(json, "\"connection_error\"");
        assert_eq!(AvailabilitySignal::Occupied.to_string(), "OCUPADA");
    }
}
