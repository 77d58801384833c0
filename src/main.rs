// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Larder: Local AI Household Inventory Tracker
//!
//! Tracks a small pantry inventory from photos using local AI models.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use larder::config::AppConfig;
use larder::ollama::OllamaClient;
use larder::web::{start_server, AppState};
use larder::{recognize, LarderError, Result};

/// Larder CLI - Local AI Household Inventory Tracker
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "0.1.0")]
#[command(about = "Local AI-powered household inventory tracker", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the inventory web UI
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Skip Ollama health check on startup
        #[arg(long)]
        skip_health_check: bool,
    },

    /// Recognize catalog items in a single image
    Scan {
        /// Image file to scan
        path: PathBuf,
    },

    /// Show AI engine status
    Status {
        /// Check specific model availability
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if !cli.quiet {
        info!("Larder v0.1.0 - Local AI Inventory Tracker");
    }

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            skip_health_check,
        }) => run_serve(config, host, port, skip_health_check).await,
        Some(Commands::Scan { path }) => run_scan(config, path, &cli.format).await,
        Some(Commands::Status { model }) => run_status(config, model).await,
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config).await,
        None => {
            // Default: serve the web UI
            run_serve(config, None, None, false).await
        }
    }
}

/// Serve the web UI (main mode)
async fn run_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    skip_health_check: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }

    let client = OllamaClient::new(&config.engine);

    if !skip_health_check {
        info!("Checking Ollama availability...");
        match client.health_check().await {
            Ok(()) => info!("Ollama is running"),
            Err(e) => {
                return Err(LarderError::EngineUnavailable(format!(
                    "Failed to connect to Ollama: {}",
                    e
                )))
            }
        }

        // Check vision model
        let vision_model = &config.engine.models.vision;
        if !client.model_available(vision_model).await? {
            warn!("Vision model '{}' not found; scans will fail until it is pulled", vision_model);
        } else {
            info!("Vision model '{}' available", vision_model);
        }
    } else {
        warn!("Skipping Ollama health check");
    }

    let state = Arc::new(AppState::new(config, Arc::new(client)));
    start_server(state).await
}

/// One-shot recognition of an image file
async fn run_scan(config: AppConfig, path: PathBuf, format: &str) -> Result<()> {
    let image = std::fs::read(&path)?;
    let client = OllamaClient::new(&config.engine);

    let patches = match recognize::identify_items(&client, &config, &image).await {
        Ok(patches) => patches,
        Err(LarderError::NoItemsRecognized) => {
            println!("No catalog items recognized in {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match format {
        "json" => {
            let output: Vec<serde_json::Value> = patches
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "name": p.name.as_str(),
                        "quantity": p.quantity,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            for patch in &patches {
                println!("{} x{}", patch.name, patch.quantity.unwrap_or(1));
            }
        }
    }

    Ok(())
}

/// Run status check
async fn run_status(config: AppConfig, model: Option<String>) -> Result<()> {
    let client = OllamaClient::new(&config.engine);

    println!("Larder v0.1.0 Status");
    println!("====================");

    // Check Ollama
    match client.health_check().await {
        Ok(()) => println!("Ollama: Running"),
        Err(e) => println!("Ollama: Error - {}", e),
    }

    // List models
    match client.list_models().await {
        Ok(models) => {
            println!("\nAvailable models:");
            for m in &models {
                let marker = if Some(m.clone()) == model
                    || m.starts_with(config.engine.models.vision.as_str())
                    || m.starts_with(config.engine.models.text.as_str())
                {
                    "→"
                } else {
                    " "
                };
                println!("  {} {}", marker, m);
            }
        }
        Err(e) => println!("  Error listing models: {}", e),
    }

    println!("\nConfiguration:");
    println!("  Vision model: {}", config.engine.models.vision);
    println!("  Text model: {}", config.engine.models.text);
    println!("  Engine URL: {}", config.engine.url);
    println!("  Restock amount: {}", config.rules.restock_amount);
    println!("  Web UI: {}:{}", config.web.host, config.web.port);

    Ok(())
}

/// Run config commands
async fn run_config_command(
    config: AppConfig,
    action: ConfigCommands,
    config_path: &std::path::Path,
) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            println!("Configuration at {:?} is valid", config_path);
            println!("  Vision model: {}", config.engine.models.vision);
            println!("  Web UI: {}:{}", config.web.host, config.web.port);
        }
    }

    Ok(())
}
