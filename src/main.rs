use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use barcode_intake::config::AppConfig;
use barcode_intake::intake::client::DEFAULT_API_URL;

mod cmd;

#[derive(Parser)]
#[command(name = "barcode-intake")]
#[command(version, about = "Shop-floor barcode intake API and client")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "INTAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long)]
        host: Option<String>,

        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,

        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Disable permissive CORS
        #[arg(long)]
        no_cors: bool,
    },
    /// Create the database schema
    Init {
        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Also insert the sample order 19561
        #[arg(long)]
        demo: bool,
    },
    /// Decode a barcode without touching the database
    Decode { barcode: String },
    /// Submit a barcode to a running API
    Scan {
        barcode: String,

        /// Base URL of the intake API
        #[arg(long, env = "INTAKE_API_URL", default_value = DEFAULT_API_URL)]
        url: String,
    },
    /// Check a running API and its database connection
    Health {
        /// Base URL of the intake API
        #[arg(long, env = "INTAKE_API_URL", default_value = DEFAULT_API_URL)]
        url: String,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Validate configuration and show any warnings
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::resolve(cli.config.as_deref())?;
    barcode_intake::logging::init(cli.verbose, cli.log_json || config.logging.json)?;

    match &cli.command {
        Commands::Serve {
            host,
            port,
            db_path,
            no_cors,
        } => {
            let mut config = config;
            if let Some(host) = host {
                config.api.host = host.clone();
            }
            if let Some(port) = port {
                config.api.port = *port;
            }
            if let Some(path) = db_path {
                config.database.path = path.clone();
            }
            if *no_cors {
                config.api.cors = false;
            }
            cmd::cmd_serve(config).await?;
        }
        Commands::Init { db_path, demo } => {
            let mut config = config;
            if let Some(path) = db_path {
                config.database.path = path.clone();
            }
            cmd::cmd_init(&config, *demo)?;
        }
        Commands::Decode { barcode } => cmd::cmd_decode(barcode)?,
        Commands::Scan { barcode, url } => cmd::cmd_scan(url, barcode).await?,
        Commands::Health { url } => cmd::cmd_health(url).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
