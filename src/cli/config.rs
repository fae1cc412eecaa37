//! Configuration management for marcacheck
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.marcacheck/config.toml, overridden by environment
//! variables and then by command-line flags.

use crate::errors::{AppError, Result};
use crate::types::{AdvisoryResult, MAX_VIABILITY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the listening port
pub const PORT_ENV: &str = "PORT";

/// Environment variable holding an explicit Chrome binary
pub const CHROME_BIN_ENV: &str = "CHROME_BIN";

/// Environment variable holding a log filter directive
pub const LOG_ENV: &str = "MARCACHECK_LOG";

/// Complete configuration for marcacheck
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Generative model connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub api_base: String,
    pub model: String,
    /// Name of the environment variable carrying the API key
    pub api_key_env: String,
    /// Resolved credential; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    /// Instruction sent to the model; `{marca}` and `{descripcion}` are substituted
    pub prompt_template: String,
}

/// How the brand is entered into the search field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TypingMode {
    /// Send the whole string at once
    Instant,
    /// One character at a time with random pauses
    Humanized,
}

/// Keystroke timing for the search field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub mode: TypingMode,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// Registry probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub search_url: String,
    /// `name` attribute of the brand text input
    pub input_name: String,
    /// `id` of the search control
    pub button_id: String,
    pub no_records_marker: String,
    pub headless: bool,
    pub no_sandbox: bool,
    pub user_agent: Option<String>,
    pub chrome_binary: Option<PathBuf>,
    pub page_load_timeout_secs: u64,
    pub input_wait_secs: u64,
    pub settle_ms: u64,
    pub settle_jitter_ms: u64,
    /// Visible phrases that mark a page as unreadable (CAPTCHA, error pages)
    pub anomaly_markers: Vec<String>,
    /// Markup fragments of an active challenge widget, matched against the raw page
    pub challenge_markers: Vec<String>,
    /// When non-empty, one of these must appear for a page to count as occupied
    pub occupied_markers: Vec<String>,
    /// Pages with less visible text than this are treated as partial loads
    pub min_visible_chars: usize,
    pub typing: TypingConfig,
}

/// Whether a disclaimer is appended to the model note or replaces it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteMode {
    Append,
    Replace,
}

/// Reconciliation policy constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub occupied_viability: u8,
    pub occupied_note: String,
    pub connection_error_note: String,
    pub ambiguous_note: String,
    pub note_mode: NoteMode,
    /// Result substituted when the model cannot be consulted
    pub fallback: AdvisoryResult,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info,marcacheck=debug`
    pub filter: String,
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "API_KEY_GEMINI".to_string(),
            api_key: None,
            request_timeout_secs: 30,
            prompt_template: crate::advisory::prompt::DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            mode: TypingMode::Instant,
            min_delay_ms: 40,
            max_delay_ms: 160,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            search_url: "https://acervomarcas.impi.gob.mx:8181/marcanet/vistas/common/datos/bsqDenominacionCompleto.pgi".to_string(),
            input_name: "denominacion".to_string(),
            button_id: "btnBuscar".to_string(),
            no_records_marker: "No se encontraron registros".to_string(),
            headless: true,
            no_sandbox: true,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            chrome_binary: None,
            page_load_timeout_secs: 30,
            input_wait_secs: 15,
            settle_ms: 5000,
            settle_jitter_ms: 0,
            anomaly_markers: vec![
                "captcha".to_string(),
                "access denied".to_string(),
                "acceso denegado".to_string(),
                "request rejected".to_string(),
                "403 forbidden".to_string(),
                "service unavailable".to_string(),
                "internal server error".to_string(),
                "error 500".to_string(),
            ],
            challenge_markers: vec![
                "g-recaptcha".to_string(),
                "h-captcha".to_string(),
                "cf-challenge".to_string(),
            ],
            occupied_markers: Vec::new(),
            min_visible_chars: 200,
            typing: TypingConfig::default(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            occupied_viability: 5,
            occupied_note: "ALERTA: Marca idéntica detectada en IMPI.".to_string(),
            connection_error_note:
                "Aviso: no fue posible completar la consulta en IMPI; el resultado no considera registros existentes."
                    .to_string(),
            ambiguous_note:
                "Aviso: la respuesta de IMPI no pudo interpretarse; verifique la disponibilidad manualmente."
                    .to_string(),
            note_mode: NoteMode::Append,
            fallback: AdvisoryResult::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply the process environment
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(config_path) = path {
            Self::load_from_file(&config_path)?
        } else {
            Self::load_default()?
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".marcacheck").join("config.toml"))
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(&self.model.api_key_env).filter(|k| !k.trim().is_empty()) {
            self.model.api_key = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("{} is not a valid port: {:?}", PORT_ENV, port))
            })?;
        }

        if let Some(bin) = lookup(CHROME_BIN_ENV).filter(|b| !b.trim().is_empty()) {
            self.probe.chrome_binary = Some(PathBuf::from(bin));
        }

        if let Some(filter) = lookup(LOG_ENV).filter(|f| !f.trim().is_empty()) {
            self.logging.filter = filter;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.model.request_timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "model.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !self.model.prompt_template.contains(crate::advisory::prompt::BRAND_PLACEHOLDER) {
            return Err(AppError::ConfigError(format!(
                "model.prompt_template must contain {}",
                crate::advisory::prompt::BRAND_PLACEHOLDER
            )));
        }

        if !self.probe.search_url.starts_with("http://")
            && !self.probe.search_url.starts_with("https://")
        {
            return Err(AppError::ConfigError(format!(
                "probe.search_url must be an http(s) URL: {}",
                self.probe.search_url
            )));
        }

        for (field, value) in [
            ("probe.input_name", &self.probe.input_name),
            ("probe.button_id", &self.probe.button_id),
            ("probe.no_records_marker", &self.probe.no_records_marker),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::ConfigError(format!("{} must not be empty", field)));
            }
        }

        if self.probe.page_load_timeout_secs == 0 || self.probe.input_wait_secs == 0 {
            return Err(AppError::ConfigError(
                "probe timeouts must be greater than 0".to_string(),
            ));
        }

        if self.probe.typing.min_delay_ms > self.probe.typing.max_delay_ms {
            return Err(AppError::ConfigError(
                "probe.typing.min_delay_ms must not exceed max_delay_ms".to_string(),
            ));
        }

        if self.policy.occupied_viability > MAX_VIABILITY {
            return Err(AppError::ConfigError(format!(
                "policy.occupied_viability must be at most {}",
                MAX_VIABILITY
            )));
        }

        if self.policy.fallback.viability > MAX_VIABILITY {
            return Err(AppError::ConfigError(format!(
                "policy.fallback.viabilidad must be at most {}",
                MAX_VIABILITY
            )));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(AppError::ConfigError("logging.filter must not be empty".to_string()));
        }

        Ok(())
    }

    /// Save configuration to file (the API key is never written)
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AppError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AppError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Listener address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// API key for display, with all but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        match &self.model.api_key {
            None => "(not set)".to_string(),
            Some(key) => {
                let chars: Vec<char> = key.chars().collect();
                if chars.len() <= 4 {
                    "****".to_string()
                } else {
                    let tail: String = chars[chars.len() - 4..].iter().collect();
                    format!("****{}", tail)
                }
            }
        }
    }
}

impl ModelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ProbeConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn input_wait(&self) -> Duration {
        Duration::from_secs(self.input_wait_secs)
    }
}
