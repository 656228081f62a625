use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode};
use weatherbar_core::{Config, fetch_display, provider_from_config};

use crate::watch;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbar", version, about = "Weather status line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and coordinates in the config file.
    Configure,

    /// Fetch once and print the status line.
    Show {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Keep the status line up to date. Enter refreshes, `q` quits.
    Watch {
        #[command(flatten)]
        location: LocationArgs,

        /// Seconds between refreshes; overrides the config file.
        #[arg(long)]
        interval: Option<u64>,
    },
}

/// Per-invocation overrides for the configured coordinates.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl LocationArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(lat) = self.lat {
            config.latitude = lat;
        }
        if let Some(lon) = self.lon {
            config.longitude = lon;
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location } => {
                let config = effective_config(&location, None)?;
                let provider = provider_from_config(&config)?;
                println!("{}", fetch_display(provider.as_ref(), config.coordinates()).await);
                Ok(())
            }
            Command::Watch { location, interval } => {
                let config = effective_config(&location, interval)?;
                watch::run(&config).await
            }
        }
    }
}

fn effective_config(location: &LocationArgs, interval: Option<u64>) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    apply_overrides(&mut config, location, interval)?;
    Ok(config)
}

fn apply_overrides(
    config: &mut Config,
    location: &LocationArgs,
    interval: Option<u64>,
) -> anyhow::Result<()> {
    location.apply(config);
    if let Some(secs) = interval {
        config.refresh_interval_secs = secs;
    }
    config.validate().context("Invalid command-line override")
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_default(config.latitude)
        .with_error_message("Please type a number, e.g. 37.7749")
        .prompt()
        .context("Failed to read latitude")?;

    let longitude = CustomType::<f64>::new("Longitude:")
        .with_default(config.longitude)
        .with_error_message("Please type a number, e.g. -122.4194")
        .prompt()
        .context("Failed to read longitude")?;

    config.set_api_key(api_key.trim().to_string());
    config.latitude = latitude;
    config.longitude = longitude;
    config.validate()?;

    let path = config.save()?;
    tracing::info!(path = %path.display(), "configuration saved");
    println!("Saved configuration to {}", path.display());

    Ok(())
}
