//! Switchyard CLI

mod app;
mod server;
mod shutdown;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use server::Server;
use shutdown::{ShutdownSignal, SignalHandler};
use std::path::{Path, PathBuf};
use switchyard_config::{load_config, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Switchyard HTTP router", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo application
    Serve {
        /// Path to configuration file; defaults are used when omitted
        #[arg(short, long, env = "SWITCHYARD_CONFIG")]
        config: Option<PathBuf>,
    },

    /// List the registered routes
    Routes {
        /// Path to configuration file
        #[arg(short, long, env = "SWITCHYARD_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "switchyard.yaml")]
        config: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per event
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            init_tracing(&cli.log_level, cli.log_format)?;

            tracing::info!("Starting Switchyard");
            let config = config_or_default(config.as_deref())?;

            tracing::info!(
                listen = %config.server.listen,
                pool_max_idle = config.router.pool_max_idle,
                "Configuration loaded"
            );

            let router = app::build_router(&config)?;

            let shutdown_signal = ShutdownSignal::new();
            let handler = SignalHandler::new(shutdown_signal.clone());
            tokio::spawn(handler.run());

            Server::new(router, config.server, shutdown_signal)
                .run()
                .await?;

            tracing::info!("Server stopped");
            Ok(())
        }

        Commands::Routes { config } => {
            init_tracing("warn", cli.log_format)?;

            let config = config_or_default(config.as_deref())?;
            let router = app::build_router(&config)?;

            let mut routes = router.routes();
            routes.sort_by(|a, b| {
                a.path()
                    .cmp(b.path())
                    .then_with(|| a.method().as_str().cmp(b.method().as_str()))
            });

            for route in routes {
                println!(
                    "{:<8} {:<32} {} handler(s)",
                    route.method(),
                    route.path(),
                    route.chain().len()
                );
            }
            Ok(())
        }

        Commands::Validate { config } => {
            init_tracing(&cli.log_level, cli.log_format)?;

            tracing::info!("Validating configuration: {}", config.display());

            match load_config(&config) {
                Ok(cfg) => {
                    tracing::info!("✓ Configuration is valid");
                    tracing::info!("  Listen: {}", cfg.server.listen);
                    tracing::info!("  Shutdown timeout: {:?}", cfg.server.shutdown_timeout);
                    tracing::info!("  Max body size: {}", cfg.server.max_body_size);
                    tracing::info!("  Auth: {}", cfg.middleware.auth.is_some());
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("✗ Configuration validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("Switchyard");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            Ok(())
        }
    }
}

fn config_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Config file: {}", path.display());
            Ok(load_config(path)?)
        }
        None => {
            tracing::info!("No config file given, using defaults");
            Ok(Config::default())
        }
    }
}

fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };
    let filter = EnvFilter::from_default_env().add_directive(filter.into());

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_level(true),
            )
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }

    Ok(())
}
