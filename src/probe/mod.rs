//! Registry probe module
//!
//! Drives the IMPI Marcanet search form in a headless browser and turns the
//! resulting page into an availability signal.

pub mod chromium;
pub mod classify;
pub mod registry;
pub mod session;

// Re-export commonly used types
pub use chromium::{find_chrome_binary, ChromiumLauncher};
pub use classify::{visible_text, PageClassifier};
pub use registry::{AvailabilityProbe, DisabledProbe, ProbeTiming, RegistryProbe, SearchTarget};
pub use session::{SearchSession, SessionLauncher};
