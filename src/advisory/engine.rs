//! Advisory engine
//!
//! Wraps one model call per request. `try_evaluate` exposes the failure;
//! `evaluate` and `assess` collapse it into the configured fallback so
//! nothing propagates past this component.

use crate::advisory::client::GenerativeModel;
use crate::advisory::{parser, prompt};
use crate::errors::AdvisoryFailure;
use crate::types::{AdvisoryResult, AdvisorySource};
use std::sync::Arc;
use tracing::{debug, warn};

/// Registrability advisor backed by a generative model
#[derive(Clone)]
pub struct AdvisoryEngine {
    model: Arc<dyn GenerativeModel>,
    template: String,
    fallback: AdvisoryResult,
}

impl AdvisoryEngine {
    /// Create engine with the default prompt and fallback
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            template: prompt::DEFAULT_TEMPLATE.to_string(),
            fallback: AdvisoryResult::default(),
        }
    }

    /// Set the prompt template
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Set the result substituted on failure
    pub fn with_fallback(mut self, fallback: AdvisoryResult) -> Self {
        self.fallback = fallback;
        self
    }

    /// Single attempt against the model, surfacing any failure
    pub async fn try_evaluate(
        &self,
        brand: &str,
        description: &str,
    ) -> Result<AdvisoryResult, AdvisoryFailure> {
        let prompt = prompt::render(&self.template, brand, description);
        let reply = self.model.generate(&prompt).await?;
        debug!(model = self.model.model_name(), reply_len = reply.len(), "model replied");
        parser::parse_reply(&reply)
    }

    /// Evaluate and report whether the model or the fallback answered
    pub async fn assess(&self, brand: &str, description: &str) -> (AdvisoryResult, AdvisorySource) {
        match self.try_evaluate(brand, description).await {
            Ok(result) => (result, AdvisorySource::Model),
            Err(e) => {
                warn!(model = self.model.model_name(), error = %e, "advisory failed, using fallback");
                (self.fallback.clone(), AdvisorySource::Fallback)
            }
        }
    }

    /// Evaluate; never fails
    pub async fn evaluate(&self, brand: &str, description: &str) -> AdvisoryResult {
        self.assess(brand, description).await.0
    }
}
