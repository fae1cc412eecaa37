//! Browser session seam
//!
//! The probe drives the search form through these traits so its timing and
//! teardown rules can be exercised without a real browser.

use crate::errors::ProbeFailure;
use async_trait::async_trait;

/// One live browser session with a single page
#[async_trait]
pub trait SearchSession: Send {
    /// Navigate to `url` and wait for the load to finish
    async fn open(&mut self, url: &str) -> Result<(), ProbeFailure>;

    /// Whether an input with the given `name` attribute is present
    async fn has_input(&mut self, name: &str) -> Result<bool, ProbeFailure>;

    /// Append `text` to the input with the given `name` attribute
    async fn type_into(&mut self, name: &str, text: &str) -> Result<(), ProbeFailure>;

    /// Click the element with the given `id` through a script call
    async fn click(&mut self, element_id: &str) -> Result<(), ProbeFailure>;

    /// Serialized HTML of the current page
    async fn content(&mut self) -> Result<String, ProbeFailure>;

    /// Tear the session down; must release the browser process
    async fn close(self: Box<Self>);
}

/// Starts browser sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn SearchSession>, ProbeFailure>;
}
