//! voc - Command-line tool for Volvo On Call
//!
//! Query vehicle attributes, status, position and trips, and issue remote
//! commands that are polled until the car reports an outcome.

mod commands;
mod config;
mod context;
mod output;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::register::Registration;
use crate::commands::{ChargingCommand, RemoteCommand};
use crate::config::{ArgOverrides, Config};
use crate::context::AppContext;
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "voc")]
#[command(author, version, about = "Volvo On Call CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Volvo On Call username
    #[arg(long, env = "VOC_USERNAME")]
    username: Option<String>,

    /// Volvo On Call password
    #[arg(long, env = "VOC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Service region (e.g. "na", "cn"); Europe when unset
    #[arg(long, env = "VOC_REGION")]
    region: Option<String>,

    /// API root URL, overrides the region
    #[arg(long, env = "VOC_URL")]
    url: Option<String>,

    /// Vehicle identification number
    #[arg(long, global = true, env = "VOC_VIN")]
    vin: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "VOC_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cars associated with the account
    Cars,

    /// Show vehicle attributes
    Attributes {
        /// Print the raw attributes as JSON
        #[arg(long)]
        json: bool,

        /// Only print these fields (dotted paths, comma separated)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Show vehicle status and position
    Status {
        /// Print the raw status as JSON
        #[arg(long)]
        json: bool,

        /// Only print these fields (dotted paths, comma separated)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Show the vehicle position
    Position {
        /// Print the raw position as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recorded trips
    Trips {
        /// Print the raw trips as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lock the car
    Lock,

    /// Unlock the car
    Unlock,

    /// Control the heater (falls back to preclimatization)
    Heater {
        #[command(subcommand)]
        action: Toggle,
    },

    /// Control the engine
    Engine {
        #[command(subcommand)]
        action: Toggle,
    },

    /// Control preclimatization
    Preclimatization {
        #[command(subcommand)]
        action: Toggle,
    },

    /// Blink the lights
    Blink,

    /// Honk and blink the lights
    Honk,

    /// Manage charging locations
    Charging {
        #[command(subcommand)]
        action: ChargingAction,
    },

    /// Save credentials and defaults to the config file
    Register {
        /// Volvo On Call username
        #[arg(long)]
        username: String,

        /// Volvo On Call password
        #[arg(long)]
        password: String,

        /// Service region
        #[arg(long)]
        region: Option<String>,

        /// API root URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Clone, Copy)]
enum Toggle {
    /// Start
    Start,
    /// Stop
    Stop,
}

#[derive(Subcommand)]
enum ChargingAction {
    /// List charging locations
    List,

    /// Show one charging location
    Get {
        /// Charging location ID
        id: String,
    },

    /// Enable, disable or reschedule delayed charging
    Delay {
        #[command(subcommand)]
        action: DelayAction,
    },
}

#[derive(Subcommand)]
enum DelayAction {
    /// Enable delayed charging, optionally with a new window
    Enable {
        /// Charging location ID
        id: String,

        /// Start time (HH:MM); the stored window is used when omitted
        #[arg(requires = "stop")]
        start: Option<String>,

        /// Stop time (HH:MM)
        stop: Option<String>,
    },

    /// Disable delayed charging
    Disable {
        /// Charging location ID
        id: String,
    },

    /// Change the delay window, keeping the enabled flag
    Update {
        /// Charging location ID
        id: String,

        /// Start time (HH:MM)
        start: String,

        /// Stop time (HH:MM)
        stop: String,
    },
}

impl From<ChargingAction> for ChargingCommand {
    fn from(action: ChargingAction) -> Self {
        match action {
            ChargingAction::List => ChargingCommand::List,
            ChargingAction::Get { id } => ChargingCommand::Get { id },
            ChargingAction::Delay { action } => match action {
                DelayAction::Enable { id, start, stop } => {
                    ChargingCommand::DelayEnable { id, start, stop }
                }
                DelayAction::Disable { id } => ChargingCommand::DelayDisable { id },
                DelayAction::Update { id, start, stop } => {
                    ChargingCommand::DelayUpdate { id, start, stop }
                }
            },
        }
    }
}

fn toggle(action: Toggle, start: RemoteCommand, stop: RemoteCommand) -> RemoteCommand {
    match action {
        Toggle::Start => start,
        Toggle::Stop => stop,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let registering = matches!(cli.command, Commands::Register { .. });
    let config = match &cli.config {
        Some(config_path) if config_path.exists() || !registering => {
            Config::load_from(config_path)?
        }
        Some(_) => Config::default(),
        None => Config::load().unwrap_or_else(|e| {
            warn!("Ignoring config file: {:#}", e);
            Config::default()
        }),
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(&ArgOverrides {
        username: cli.username.clone(),
        password: cli.password.clone(),
        region: cli.region.clone(),
        url: cli.url.clone(),
        vin: cli.vin.clone(),
        output: cli
            .output
            .and_then(|format| format.to_possible_value())
            .map(|value| value.get_name().to_string()),
        no_color: cli.no_color,
    });

    // Create output context
    let format = OutputFormat::from_str(&merged.output, true).map_err(|e| anyhow!(e))?;
    let out = OutputContext::new(format, merged.no_color, cli.quiet);

    // Commands that need no client
    let command = match cli.command {
        Commands::Version => return commands::version(&out),
        Commands::Register {
            username,
            password,
            region,
            url,
        } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            let registration = Registration {
                username,
                password,
                region,
                url,
                vin: cli.vin.clone(),
            };
            return commands::register(registration, &path, &out);
        }
        command => command,
    };

    let ctx = AppContext::new(&merged, out)?;
    debug!(api_root = %ctx.client.api_root(), "Client ready");

    // Execute command
    match command {
        Commands::Cars => commands::cars(&ctx).await,

        Commands::Attributes { json, fields } => {
            commands::attributes(&ctx, commands::info::View { json, fields: &fields }).await
        }

        Commands::Status { json, fields } => {
            commands::status(&ctx, commands::info::View { json, fields: &fields }).await
        }

        Commands::Position { json } => commands::position(&ctx, json).await,

        Commands::Trips { json } => commands::trips(&ctx, json).await,

        Commands::Lock => commands::remote(&ctx, RemoteCommand::Lock).await,

        Commands::Unlock => commands::remote(&ctx, RemoteCommand::Unlock).await,

        Commands::Heater { action } => {
            let command = toggle(action, RemoteCommand::StartHeater, RemoteCommand::StopHeater);
            commands::remote(&ctx, command).await
        }

        Commands::Engine { action } => {
            let command = toggle(action, RemoteCommand::StartEngine, RemoteCommand::StopEngine);
            commands::remote(&ctx, command).await
        }

        Commands::Preclimatization { action } => {
            let command = toggle(
                action,
                RemoteCommand::StartPreclimatization,
                RemoteCommand::StopPreclimatization,
            );
            commands::remote(&ctx, command).await
        }

        Commands::Blink => commands::remote(&ctx, RemoteCommand::Blink).await,

        Commands::Honk => commands::remote(&ctx, RemoteCommand::Honk).await,

        Commands::Charging { action } => commands::charging(&ctx, action.into()).await,

        Commands::Register { .. } | Commands::Version => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fields_and_global_vin() {
        let cli = Cli::try_parse_from([
            "voc",
            "status",
            "--fields",
            "carLocked,doors.hoodOpen",
            "--vin",
            "YV1XZ",
        ])
        .unwrap();
        assert_eq!(cli.vin.as_deref(), Some("YV1XZ"));
        match cli.command {
            Commands::Status { json, fields } => {
                assert!(!json);
                assert_eq!(fields, vec!["carLocked", "doors.hoodOpen"]);
            }
            _ => panic!("expected status"),
        }
    }

    #[test]
    fn test_delay_enable_needs_both_times() {
        assert!(Cli::try_parse_from(["voc", "charging", "delay", "enable", "4075649", "22:35"])
            .is_err());

        let cli = Cli::try_parse_from([
            "voc", "charging", "delay", "enable", "4075649", "22:35", "06:50",
        ])
        .unwrap();
        match cli.command {
            Commands::Charging { action } => assert_eq!(
                ChargingCommand::from(action),
                ChargingCommand::DelayEnable {
                    id: "4075649".into(),
                    start: Some("22:35".into()),
                    stop: Some("06:50".into()),
                }
            ),
            _ => panic!("expected charging"),
        }
    }

    #[test]
    fn test_toggle_mapping() {
        let cli = Cli::try_parse_from(["voc", "heater", "stop"]).unwrap();
        match cli.command {
            Commands::Heater { action } => assert_eq!(
                toggle(action, RemoteCommand::StartHeater, RemoteCommand::StopHeater),
                RemoteCommand::StopHeater
            ),
            _ => panic!("expected heater"),
        }
    }
}
