//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Pet clinic main binary
//!
//! Runs the REST service and the development helpers around it: token
//! minting, sample data and configuration management.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use petclinic::config::{LogFormat, MonitoringConfig, StorageBackendType};
use petclinic::populate::{time_seed, PopulateOptions, Populator};
use petclinic::{
    ClinicApi, ClinicConfig, ClinicManager, TokenManager, PETCLINIC_NAME, PETCLINIC_VERSION,
};

#[derive(Parser)]
#[command(name = "petclinic")]
#[command(about = "Veterinary clinic REST service")]
#[command(version = PETCLINIC_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the clinic server
    Serve {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// API host
        #[arg(long)]
        host: Option<String>,

        /// API port
        #[arg(long)]
        port: Option<u16>,

        /// Storage backend type
        #[arg(long, value_enum)]
        storage: Option<StorageBackendType>,

        /// SQLite database file
        #[arg(long)]
        database_path: Option<PathBuf>,
    },

    /// Mint an access token for development use
    Token {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Token subject
        #[arg(short, long, default_value = "admin")]
        subject: String,

        /// Lifetime in seconds, defaults to security.token_ttl_secs
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Replace the stored records with sample data
    Populate {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of owners to create
        #[arg(short, long, default_value_t = 100)]
        owners: usize,

        /// Number of vets to create
        #[arg(long, default_value_t = 50)]
        vets: usize,

        /// Random seed, time-derived when absent
        #[arg(long)]
        seed: Option<u64>,

        /// SQLite database file
        #[arg(long)]
        database_path: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "petclinic.toml")]
        output: PathBuf,

        /// Configuration format
        #[arg(long, default_value = "toml")]
        format: String,
    },

    /// Show configuration documentation
    Docs {
        /// Output format (text, markdown)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Show current configuration
    Show {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Load configuration from a file, or from the default locations
fn load_config(path: Option<PathBuf>) -> Result<ClinicConfig> {
    let config = match path {
        Some(path) => ClinicConfig::from_file(&path)?,
        None => ClinicConfig::load_with_defaults()?,
    };
    Ok(config)
}

/// Initialize tracing. `RUST_LOG` wins over the configured level.
fn init_tracing(monitoring: &MonitoringConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&monitoring.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match monitoring.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

async fn serve(config: ClinicConfig) -> Result<()> {
    if config.security.enable_auth && config.security.uses_development_secret() {
        warn!("Using the built-in development JWT secret; set security.jwt_secret in production");
    }

    let manager = Arc::new(ClinicManager::new_with_storage(config.clone()).await?);
    manager.initialize().await?;
    let api = ClinicApi::new(manager.clone())?;

    let addr = config.api.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        address = %addr,
        storage = manager.backend_name(),
        base_path = %config.api.base_path,
        "{} {} starting",
        PETCLINIC_NAME,
        PETCLINIC_VERSION
    );

    axum::serve(listener, api.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    manager.shutdown().await?;
    info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            storage,
            database_path,
        } => {
            let mut config = load_config(config)?;

            // Override configuration with CLI arguments
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }
            if let Some(storage) = storage {
                config.storage.backend = storage;
            }
            if let Some(path) = database_path {
                config.storage.sqlite.database_path = path;
            }

            init_tracing(&config.monitoring);
            config
                .validate()
                .map_err(|e| anyhow!("Invalid configuration:\n{}", e))?;

            serve(config).await?;
        }

        Commands::Token {
            config,
            subject,
            ttl,
        } => {
            let config = load_config(config)?;
            init_tracing(&config.monitoring);

            let tokens = TokenManager::new(&config.security)?;
            let token = match ttl {
                Some(ttl) => tokens.issue_with_ttl(&subject, ttl)?,
                None => tokens.issue(&subject)?,
            };
            println!("{}", token);
        }

        Commands::Populate {
            config,
            owners,
            vets,
            seed,
            database_path,
        } => {
            let mut config = load_config(config)?;
            if let Some(path) = database_path {
                config.storage.backend = StorageBackendType::Sqlite;
                config.storage.sqlite.database_path = path;
            }
            init_tracing(&config.monitoring);

            if config.storage.backend == StorageBackendType::Memory {
                warn!("Populating the in-memory store; the data is gone when this command exits");
            }

            let seed = match seed {
                Some(seed) => seed,
                None => time_seed()?,
            };
            let manager = ClinicManager::new_with_storage(config).await?;
            manager.initialize().await?;

            let mut populator = Populator::new(manager.store(), StdRng::seed_from_u64(seed));
            let summary = populator.run(PopulateOptions { owners, vets }).await?;
            manager.shutdown().await?;

            println!("✅ Database populated (seed {})", seed);
            println!("  Pet types: {}", summary.pet_types);
            println!("  Specialties: {}", summary.specialties);
            println!("  Vets: {}", summary.vets);
            println!("  Owners: {}", summary.owners);
            println!("  Pets: {}", summary.pets);
            println!("  Visits: {}", summary.visits);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Generate { output, format } => {
                let content = match format.as_str() {
                    "toml" => ClinicConfig::generate_example(),
                    "yaml" | "yml" => serde_yaml::to_string(&ClinicConfig::default())?,
                    "json" => serde_json::to_string_pretty(&ClinicConfig::default())?,
                    _ => return Err(anyhow!("Unsupported format: {}", format)),
                };

                std::fs::write(&output, content)?;
                println!("✅ Configuration file generated: {}", output.display());
            }

            ConfigCommands::Docs { format } => {
                let docs = ClinicConfig::get_documentation();
                match format.as_str() {
                    "text" | "markdown" => println!("{}", docs),
                    _ => return Err(anyhow!("Unsupported format: {}", format)),
                }
            }

            ConfigCommands::Validate {
                config: config_path,
            } => {
                println!(
                    "🔍 Validating configuration file: {}",
                    config_path.display()
                );

                let config = ClinicConfig::from_file(&config_path)
                    .map_err(|e| anyhow!("Failed to load configuration file: {}", e))?;
                println!("✅ Configuration file loaded successfully");

                config.validate().map_err(|e| anyhow!(e))?;
                println!("✅ Configuration validation passed!");
                println!("\n📋 Configuration Summary:");
                println!("  API: {}{}", config.api.bind_address(), config.api.base_path);
                println!("  Storage Backend: {}", config.storage.backend);
                println!("  Security Auth: {}", config.security.enable_auth);
                println!("  Metrics: {}", config.monitoring.enable_metrics);
                println!("  Log Level: {}", config.monitoring.log_level);
            }

            ConfigCommands::Show { config } => {
                let config = load_config(config)?;

                println!("📋 Current Configuration:");
                println!("API: {}{}", config.api.bind_address(), config.api.base_path);
                println!("Storage Backend: {}", config.storage.backend);
                if config.storage.backend == StorageBackendType::Sqlite {
                    println!(
                        "SQLite Database: {}",
                        config.storage.sqlite.database_path.display()
                    );
                }
                println!("Security Auth: {}", config.security.enable_auth);
                println!("CORS: {}", config.api.enable_cors);
                println!("Metrics: {}", config.monitoring.enable_metrics);
                println!("Log Level: {}", config.monitoring.log_level);
                println!("Log Format: {}", config.monitoring.log_format);
            }
        },
    }

    Ok(())
}
