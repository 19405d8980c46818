//! ParkPulse CLI server
//!
//! ```sh
//! # Run with default config (~/.config/parkpulse/config.toml)
//! parkpulse
//!
//! # Custom config path, seeded demo data
//! parkpulse --config /etc/parkpulse/config.toml --seed
//!
//! # Validate config without starting
//! parkpulse --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use parkpulse::config::AppConfig;
use parkpulse::server::{init_tracing, ServerHandle, ServerOptions};

/// ParkPulse: parking availability and booking server.
#[derive(Parser, Debug)]
#[command(
    name = "parkpulse",
    version,
    about = "Parking lot availability and booking server",
    long_about = "ParkPulse: REST API for booking parking spots, ingesting IoT \
                  sensor batches and crowd reports.\n\n\
                  Default config: ~/.config/parkpulse/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARKPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Insert demo users, lots, spots, sensors and reports into an empty database.
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(parkpulse::default_config_path);

    let loaded = AppConfig::load(&config_path);
    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            if cli.check {
                return Err(e.into());
            }
            error!("Using default configuration.");
        }
    }

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        info!("CLI override: log_level = {}", level);
    }
    config.validate()?;

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file  : {}", config_path.display());
        println!("   API address  : {}", config.server_address());
        println!("   Database     : {}", config.database.url);
        println!(
            "   Redis        : {}",
            if config.redis.enabled { config.redis.url.as_str() } else { "disabled" }
        );
        println!(
            "   Transactions : {} attempts, {}ms base delay, {}ms timeout, {:?}",
            config.transactions.max_retries,
            config.transactions.retry_delay_ms,
            config.transactions.timeout_ms,
            config.transactions.isolation_level
        );
        println!("   Log level    : {}", config.logging.level);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        seed: cli.seed,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
