//! Doctor command for system diagnostics
//!
//! Checks everything a consultation depends on: the model credential and
//! endpoint, a usable Chrome binary, the registry portal, and the policy.

use crate::advisory::GeminiClient;
use crate::cli::config::Config;
use crate::probe::find_chrome_binary;
use crate::types::MAX_VIABILITY;
use colored::Colorize;
use reqwest::Client;
use std::time::Duration;

/// Timeout for doctor network probes
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
}

impl Doctor {
    /// Create a new doctor instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        vec![
            self.check_api_key(),
            self.check_model_endpoint().await,
            self.check_chrome(),
            self.check_portal().await,
            self.check_policy(),
        ]
    }

    /// Check 1: API key present
    fn check_api_key(&self) -> HealthCheck {
        let status = match &self.config.model.api_key {
            Some(_) => HealthStatus::Pass,
            None => HealthStatus::Fail(format!(
                "{} not set; every consultation will use the fallback",
                self.config.model.api_key_env
            )),
        };
        HealthCheck::new("API Key", status)
    }

    /// Check 2: Model endpoint answers for this key
    async fn check_model_endpoint(&self) -> HealthCheck {
        let status = match GeminiClient::from_config(&self.config.model) {
            Err(e) => HealthStatus::Warn(format!("Skipped: {}", e)),
            Ok(client) => match client.health_check().await {
                Ok(true) => HealthStatus::Pass,
                Ok(false) => HealthStatus::Fail(format!(
                    "Model '{}' not reachable at {}",
                    self.config.model.model,
                    client.base_url()
                )),
                Err(e) => HealthStatus::Fail(format!("Error checking model: {}", e)),
            },
        };
        HealthCheck::new("Model Endpoint", status)
    }

    /// Check 3: Chrome binary
    fn check_chrome(&self) -> HealthCheck {
        let status = match find_chrome_binary(self.config.probe.chrome_binary.as_deref()) {
            Some(_) => HealthStatus::Pass,
            None => match &self.config.probe.chrome_binary {
                Some(path) => HealthStatus::Fail(format!("{} is not executable", path.display())),
                None => HealthStatus::Fail("No Chrome or Chromium found; set CHROME_BIN".to_string()),
            },
        };
        HealthCheck::new("Chrome", status)
    }

    /// Check 4: Registry portal reachable
    async fn check_portal(&self) -> HealthCheck {
        let client = Client::builder()
            .timeout(CHECK_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        let status = match client.get(&self.config.probe.search_url).send().await {
            Ok(response) if response.status().is_success() => HealthStatus::Pass,
            Ok(response) => HealthStatus::Warn(format!("Portal answered HTTP {}", response.status().as_u16())),
            Err(e) => HealthStatus::Warn(format!("Portal not reachable: {}", e)),
        };
        HealthCheck::new("IMPI Portal", status)
    }

    /// Check 5: Policy constants
    fn check_policy(&self) -> HealthCheck {
        let policy = &self.config.policy;
        let status = if policy.occupied_viability > MAX_VIABILITY || policy.fallback.viability > MAX_VIABILITY {
            HealthStatus::Fail(format!("Viability values must be at most {}", MAX_VIABILITY))
        } else if policy.occupied_viability >= policy.fallback.viability {
            HealthStatus::Warn(format!(
                "Occupied viability ({}) is not below the fallback ({})",
                policy.occupied_viability, policy.fallback.viability
            ))
        } else if policy.occupied_note.trim().is_empty() {
            HealthStatus::Warn("Occupied note is empty".to_string())
        } else {
            HealthStatus::Pass
        };
        HealthCheck::new("Policy", status)
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "marcacheck diagnostics".bold());
        println!("{:<20} Status", "Check");
        println!("{}", "=".repeat(60));

        for check in checks {
            let status = match &check.status {
                HealthStatus::Pass => "PASS".green().to_string(),
                HealthStatus::Warn(msg) => format!("{} {}", "WARN:".yellow(), msg),
                HealthStatus::Fail(msg) => format!("{} {}", "FAIL:".red(), msg),
            };
            println!("{:<20} {}", check.name, status);
        }

        println!();
    }

    /// Get overall health status
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_health_status_equality() {
        assert_eq!(HealthStatus::Pass, HealthStatus::Pass);
        assert_eq!(
            HealthStatus::Warn("test".to_string()),
            HealthStatus::Warn("test".to_string())
        );
        assert_ne!(HealthStatus::Pass, HealthStatus::Fail("test".to_string()));
    }

    #[test]
    fn test_overall_status_pass() {
        let checks = vec![
            HealthCheck::new("Test 1", HealthStatus::Pass),
            HealthCheck::new("Test 2", HealthStatus::Warn("warning".to_string())),
        ];
        assert!(Doctor::overall_status(&checks));
    }

    #[test]
    fn test_overall_status_fail() {
        let checks = vec![
            HealthCheck::new("Test 1", HealthStatus::Pass),
            HealthCheck::new("Test 2", HealthStatus::Fail("error".to_string())),
        ];
        assert!(!Doctor::overall_status(&checks));
    }

    #[test]
    fn test_missing_api_key_fails() {
        let doctor = Doctor::new(Config::default());
        assert!(matches!(doctor.check_api_key().status, HealthStatus::Fail(_)));
    }

    #[test]
    fn test_api_key_present() {
        let mut config = Config::default();
        config.model.api_key = Some("secret".to_string());
        let doctor = Doctor::new(config);
        assert_eq!(doctor.check_api_key().status, HealthStatus::Pass);
    }

    #[tokio::test]
    async fn test_model_check_skipped_without_key() {
        let doctor = Doctor::new(Config::default());
        let check = doctor.check_model_endpoint().await;
        assert!(matches!(check.status, HealthStatus::Warn(_)));
    }

    #[test]
    fn test_explicit_chrome_missing() {
        let mut config = Config::default();
        config.probe.chrome_binary = Some(PathBuf::from("/nonexistent/chrome"));
        let doctor = Doctor::new(config);
        assert!(matches!(doctor.check_chrome().status, HealthStatus::Fail(_)));
    }

    #[test]
    fn test_default_policy_passes() {
        let doctor = Doctor::new(Config::default());
        assert_eq!(doctor.check_policy().status, HealthStatus::Pass);
    }

    #[test]
    fn test_policy_occupied_not_below_fallback() {
        let mut config = Config::default();
        config.policy.occupied_viability = 90;
        let doctor = Doctor::new(config);
        assert!(matches!(doctor.check_policy().status, HealthStatus::Warn(_)));
    }
}
