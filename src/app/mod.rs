pub mod config;
pub mod demo;
pub mod logging_system;
pub mod schema;

pub use config::{Config, ConfigError, LogFormat, LogLevel};
pub use logging_system::{LoggingSystem, setup_logging_safe};

use crate::client::Client;
use crate::domain::{Annotation, Severity};
use crate::sender::HttpSession;
use chrono::Utc;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "shmdash", author, version, about = "SHM Dash upload client")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the current setup as JSON
    ShowSetup,
    /// Add missing attributes and virtual channels from a TOML schema file
    Setup {
        #[arg(long)]
        schema: PathBuf,
    },
    /// Upload one annotation
    Annotate {
        #[arg(long, value_enum, default_value = "info")]
        severity: AnnotationSeverity,
        /// Send an email for this annotation
        #[arg(long)]
        email: bool,
        /// Ask users to confirm the annotation
        #[arg(long)]
        confirm: bool,
        description: String,
    },
    /// Stream random weather data until Ctrl+C
    Demo {
        #[arg(long, default_value = "10")]
        interval_secs: u64,
    },
    /// Delete all time-series data of this API key
    DeleteData {
        #[arg(long)]
        yes: bool,
    },
    /// Delete all data and setup information of this API key
    Recreate {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnnotationSeverity {
    Info,
    Warning,
    Critical,
}

impl From<AnnotationSeverity> for Severity {
    fn from(severity: AnnotationSeverity) -> Self {
        match severity {
            AnnotationSeverity::Info => Severity::Info,
            AnnotationSeverity::Warning => Severity::Warning,
            AnnotationSeverity::Critical => Severity::Critical,
        }
    }
}

pub async fn run_command<S: HttpSession>(
    client: &Client<S>,
    command: Command,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match command {
        Command::ShowSetup => {
            let setup = client.get_setup().await?;
            println!("{}", serde_json::to_string_pretty(&setup)?);
        }
        Command::Setup { schema } => {
            let setup = schema::load_schema(&schema)?;
            info!(
                "Setup {} attributes and {} virtual channels from {}",
                setup.attributes.len(),
                setup.virtual_channels.len(),
                schema.display()
            );
            client
                .setup(&setup.attributes, &setup.virtual_channels)
                .await?;
        }
        Command::Annotate {
            severity,
            email,
            confirm,
            description,
        } => {
            let mut annotation = Annotation::new(Utc::now(), severity.into(), description);
            if email {
                annotation = annotation.with_email();
            }
            if confirm {
                annotation = annotation.with_confirmation();
            }
            client.upload_annotation(&annotation).await?;
        }
        Command::Demo { interval_secs } => {
            demo::run(client, Duration::from_secs(interval_secs.max(1))).await?;
        }
        Command::DeleteData { yes } => {
            require_confirmation(yes, "delete-data")?;
            client.delete_data().await?;
        }
        Command::Recreate { yes } => {
            require_confirmation(yes, "recreate")?;
            client.recreate().await?;
        }
    }

    Ok(())
}

fn require_confirmation(confirmed: bool, command: &str) -> Result<(), ConfigError> {
    if confirmed {
        Ok(())
    } else {
        Err(ConfigError::InvalidConfig(format!(
            "{command} removes data on the server, pass --yes to confirm"
        )))
    }
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Main entry point for the application
pub async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let matches = Cli::command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let config = match cli.config.finalize(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(2);
        }
    };

    if let Err(e) = setup_logging_safe(
        config.log_level,
        config.log_format,
        config.log_directives.as_deref(),
    ) {
        eprintln!("Warning: {e}, continuing without logging");
    }

    info!("Starting shmdash v{}", get_version());

    let client = match Client::from_config(config.client_config()) {
        Ok(client) => client,
        Err(e) => {
            error!("Client error: {}", e);
            process::exit(1);
        }
    };

    let result = run_command(&client, cli.command).await;
    client.close().await;

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }

    Ok(())
}
