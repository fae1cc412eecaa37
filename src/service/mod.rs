//! Trademark consultation service
//!
//! Runs the advisory engine, then the registry probe, then the reconciler,
//! one after the other for each request. Shared across requests behind an
//! `Arc`; holds no mutable state.

use crate::advisory::{AdvisoryEngine, GenerativeModel};
use crate::cli::config::Config;
use crate::probe::AvailabilityProbe;
use crate::reconcile::ResultReconciler;
use crate::types::{Assessment, ConsultaRequest};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub struct TrademarkService {
    engine: AdvisoryEngine,
    probe: Arc<dyn AvailabilityProbe>,
    reconciler: ResultReconciler,
}

impl TrademarkService {
    pub fn new(engine: AdvisoryEngine, probe: Arc<dyn AvailabilityProbe>, reconciler: ResultReconciler) -> Self {
        Self {
            engine,
            probe,
            reconciler,
        }
    }

    /// Wire the components from configuration
    pub fn from_config(
        config: &Config,
        model: Arc<dyn GenerativeModel>,
        probe: Arc<dyn AvailabilityProbe>,
    ) -> Self {
        let engine = AdvisoryEngine::new(model)
            .with_template(config.model.prompt_template.clone())
            .with_fallback(config.policy.fallback.clone());

        Self::new(engine, probe, ResultReconciler::from_policy(&config.policy))
    }

    /// Run one consultation. Dependency failures are folded into the result.
    pub async fn consult(&self, request: &ConsultaRequest) -> Assessment {
        let request_id = Uuid::new_v4();
        let span = info_span!("consulta", %request_id, marca = %request.brand);

        async move {
            let started = Instant::now();
            let checked_at = Utc::now();

            let (advisory, advisory_source) = self.engine.assess(&request.brand, &request.description).await;
            let availability = self.probe.check_availability(&request.brand).await;
            let result = self.reconciler.reconcile(advisory, availability);

            let elapsed_ms = started.elapsed().as_millis() as u64;
            info!(
                ?advisory_source,
                %availability,
                conclusive = availability.is_conclusive(),
                viabilidad = result.viability,
                elapsed_ms,
                "consultation finished"
            );

            Assessment {
                request_id,
                checked_at,
                elapsed_ms,
                advisory_source,
                availability,
                result,
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AdvisoryFailure;
    use crate::types::{AdvisoryResult, AdvisorySource, AvailabilitySignal};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedModel(&'static str);

    #[async_trait]
    impl GenerativeModel for FixedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryFailure> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct CountingProbe {
        signal: AvailabilitySignal,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AvailabilityProbe for CountingProbe {
        async fn check_availability(&self, _brand: &str) -> AvailabilitySignal {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.signal
        }
    }

    fn service(reply: &'static str, signal: AvailabilitySignal) -> (TrademarkService, Arc<CountingProbe>) {
        let probe = Arc::new(CountingProbe {
            signal,
            calls: AtomicUsize::new(0),
        });
        let service = TrademarkService::new(
            AdvisoryEngine::new(Arc::new(FixedModel(reply))),
            probe.clone(),
            ResultReconciler::default(),
        );
        (service, probe)
    }

    fn request() -> ConsultaRequest {
        ConsultaRequest {
            brand: "Zyrqon".to_string(),
            description: "software tools".to_string(),
        }
    }

    #[tokio::test]
    async fn test_consult_occupied() {
        let (service, probe) = service(
            r#"{"viabilidad":80,"clases":["Clase 9"],"nota":"distinctive name"}"#,
            AvailabilitySignal::Occupied,
        );

        let assessment = service.consult(&request()).await;

        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert_eq!(assessment.advisory_source, AdvisorySource::Model);
        assert_eq!(assessment.availability, AvailabilitySignal::Occupied);
        assert_eq!(assessment.result.viability, 5);
        assert_eq!(assessment.result.categories, vec!["Clase 9".to_string()]);
    }

    #[tokio::test]
    async fn test_consult_fallback_reported() {
        let (service, _) = service("not json", AvailabilitySignal::Available);

        let assessment = service.consult(&request()).await;

        assert_eq!(assessment.advisory_source, AdvisorySource::Fallback);
        assert_eq!(assessment.result, AdvisoryResult::default());
    }

    #[tokio::test]
    async fn test_request_ids_unique() {
        let (service, _) = service("{}", AvailabilitySignal::Available);
        let a = service.consult(&request()).await;
        let b = service.consult(&request()).await;
        assert_ne!(a.request_id, b.request_id);
    }
}
