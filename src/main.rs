//! Matchday tips service entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use matchday_tips::api::{create_router, AppState};
use matchday_tips::config::Config;
use matchday_tips::feed::{ApiFootballClient, OddsApiClient};
use matchday_tips::metrics;
use matchday_tips::tips::{TipService, TipSettings};
use matchday_tips::utils::shutdown_signal;

/// Football betting tips service.
#[derive(Parser, Debug)]
#[command(name = "matchday-tips")]
#[command(about = "Picks near-even-money football outcomes and buckets them by risk")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the tips API (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Run the pipeline once and print the buckets as JSON.
    Tips {
        /// Seed for the bucket fill shuffle.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging; stdout is reserved for `tips` output
    let filter = if args.verbose {
        EnvFilter::new("matchday_tips=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Tips { seed }) => cmd_tips(seed).await,
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration, then build the pipeline settings.
fn load_config() -> anyhow::Result<(Config, TipSettings)> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let settings = config.tip_settings()?;
    Ok((config, settings))
}

/// Wire the live feeds into a tip service.
fn build_service(config: &Config, settings: TipSettings) -> anyhow::Result<TipService> {
    let include_totals = settings.buckets.over_under().is_some();
    let odds = Arc::new(OddsApiClient::new(config, include_totals)?);
    let football = Arc::new(ApiFootballClient::new(config, settings.fixtures_timezone)?);

    Ok(TipService::new(odds, football.clone(), football, settings))
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("MATCHDAY TIPS - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    let settings = match config.validate().and_then(|_| config.tip_settings().map_err(|e| e.to_string())) {
        Ok(settings) => {
            println!("OK");
            settings
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    };

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Odds API: {} (sport: {}, regions: {})", config.odds_api_url, config.odds_sport, config.odds_regions);
    println!("  API-Football: {}", config.football_api_url);
    println!(
        "  Price Window: {} - {} (target {})",
        settings.window.min(),
        settings.window.max(),
        settings.window.target()
    );
    println!("  Bucket Profile: {}", config.bucket_profile);
    for bucket in settings.buckets.risk() {
        println!(
            "    {}: {} - {} (cap {})",
            bucket.name, bucket.min_odds, bucket.max_odds, bucket.capacity
        );
    }
    match settings.buckets.over_under() {
        Some(ou) => println!("  Over/Under: Enabled (cap {})", ou.capacity),
        None => println!("  Over/Under: Disabled"),
    }
    println!("  Fixtures Timezone: {}", settings.fixtures_timezone);
    println!("  Kickoff Timezone: {}", settings.kickoff_timezone);
    println!("  Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the pipeline once and print the result.
async fn cmd_tips(seed: Option<u64>) -> anyhow::Result<()> {
    let (config, settings) = load_config()?;
    let service = build_service(&config, settings)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let categorized = service.categorize_with(Utc::now(), &mut rng).await?;
    println!("{}", serde_json::to_string_pretty(&categorized)?);

    Ok(())
}

/// Serve the tips API until shutdown.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let (config, settings) = load_config()?;
    let port = port_override.unwrap_or(config.port);

    info!("Configuration loaded successfully");
    info!("Bucket profile: {}", config.bucket_profile);
    info!("Buckets: {}", settings.buckets.names().collect::<Vec<_>>().join(", "));

    // Initialize metrics
    let handle = match metrics::install_prometheus() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder unavailable: {}", e);
            None
        }
    };
    metrics::init_metrics();

    let service = Arc::new(build_service(&config, settings)?);
    let mut app_state = AppState::new(service);
    if let Some(handle) = handle {
        app_state = app_state.with_metrics(handle);
    }

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}
