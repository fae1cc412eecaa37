//! marcacheck - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use marcacheck::{
    advisory::{GeminiClient, GenerativeModel, UnavailableModel},
    cli::{Args, Commands, Config},
    doctor::Doctor,
    http::{self, AppState},
    probe::{AvailabilityProbe, ChromiumLauncher, DisabledProbe, RegistryProbe},
    telemetry,
    types::ConsultaRequest,
    TrademarkService,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the model client once for the whole process
fn build_model(config: &Config) -> Arc<dyn GenerativeModel> {
    match GeminiClient::from_config(&config.model) {
        Ok(client) => {
            info!(model = config.model.model.as_str(), "model client ready");
            Arc::new(client)
        }
        Err(e) => {
            warn!(error = %e, "model client unavailable, every advisory will use the fallback");
            Arc::new(UnavailableModel::new(e.to_string()))
        }
    }
}

fn build_probe(config: &Config, skip_registry: bool) -> Arc<dyn AvailabilityProbe> {
    if skip_registry {
        return Arc::new(DisabledProbe);
    }
    let launcher = Arc::new(ChromiumLauncher::from_config(&config.probe));
    Arc::new(RegistryProbe::from_config(launcher, &config.probe))
}

async fn run_server(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let service = TrademarkService::from_config(&config, build_model(&config), build_probe(&config, false));
    let state = AppState::new(Arc::new(service));

    http::run(state, &config.bind_addr())
        .await
        .context("HTTP server failed")
}

async fn run_check(config: Config, brand: String, description: String, skip_registry: bool) -> Result<()> {
    let service = TrademarkService::from_config(&config, build_model(&config), build_probe(&config, skip_registry));
    let request = ConsultaRequest { brand, description };

    let assessment = service.consult(&request).await;
    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}

async fn run_doctor(config: Config) -> Result<()> {
    let doctor = Doctor::new(config);
    let checks = doctor.run_diagnostics().await;
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

fn show_config(config: &Config, write: bool) -> Result<()> {
    println!("\n{}\n", "marcacheck configuration".bold());

    println!("Server:");
    println!("  Listen:   {}", config.bind_addr());
    println!();

    println!("Model:");
    println!("  Endpoint: {}", config.model.api_base);
    println!("  Model:    {}", config.model.model);
    println!("  API key:  {} ({})", config.masked_api_key(), config.model.api_key_env);
    println!("  Timeout:  {}s", config.model.request_timeout_secs);
    println!();

    println!("Registry probe:");
    println!("  URL:      {}", config.probe.search_url);
    println!("  Headless: {}", config.probe.headless);
    println!(
        "  Chrome:   {}",
        config
            .probe
            .chrome_binary
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(auto-detect)".to_string())
    );
    println!(
        "  Timing:   page load {}s, input {}s, settle {}ms",
        config.probe.page_load_timeout_secs, config.probe.input_wait_secs, config.probe.settle_ms
    );
    println!();

    println!("Policy:");
    println!("  Occupied viability: {}", config.policy.occupied_viability);
    println!("  Fallback viability: {}", config.policy.fallback.viability);
    println!("  Note mode:          {:?}", config.policy.note_mode);
    println!();

    if write {
        let path = Config::default_path().context("No home directory to write the config into")?;
        config.save(&path)?;
        println!("Written to {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging, args.verbosity(), args.json_logs)?;

    match args.command() {
        Commands::Serve { host, port } => run_server(config, host, port).await?,
        Commands::Check {
            brand,
            description,
            skip_registry,
        } => run_check(config, brand, description, skip_registry).await?,
        Commands::Doctor => run_doctor(config).await?,
        Commands::Config { write } => show_config(&config, write)?,
    }

    Ok(())
}
