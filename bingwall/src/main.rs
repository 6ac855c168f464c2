//! # bingwall
//!
//! Keeps the desktop background on Bing's image of the day.
//!
//! Without a subcommand the binary runs as a daemon: it checks for a new
//! image on a timer and whenever the region or resolution preference
//! changes. The other subcommands are one-shot helpers around the same
//! settings file.

mod app;

use std::time::Duration;

use anyhow::{Context, bail};
use bingwall_core::{
    RunOutcome, SettingsStore, UpdateRuntime,
    settings::{read_preferences, read_update_state},
};
use bingwall_model::{Region, Resolution, keys};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "bingwall", version)]
#[command(about = "Set the desktop background to Bing's image of the day")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run in the foreground, updating on a timer and on preference changes
    Daemon,
    /// Run a single update and print what happened
    Update {
        /// Skip the two-hour throttle
        #[arg(long)]
        force: bool,
    },
    /// Show preferences and the last applied wallpaper
    Status,
    /// Change a preference
    #[command(subcommand)]
    Set(SetCommand),
    /// List the supported region codes
    Regions,
    /// List the supported resolution tokens
    Resolutions,
    /// Print the effective configuration and where it came from
    Config,
}

#[derive(Subcommand, Debug)]
enum SetCommand {
    /// Bing market code, e.g. en-GB
    Region { code: String },
    /// Resolution token, e.g. 1920x1080 or UHD
    Resolution { token: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bingwall=info,bingwall_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command.unwrap_or(Command::Daemon) {
        Command::Daemon => run_daemon().await,
        Command::Update { force } => run_update(force).await,
        Command::Status => print_status(),
        Command::Set(set) => apply_setting(set),
        Command::Regions => {
            for region in Region::all() {
                println!("{}\t{}", region.code(), region.display_name());
            }
            Ok(())
        }
        Command::Resolutions => {
            for resolution in Resolution::ALL {
                if resolution == Resolution::default() {
                    println!("{resolution}\t(default)");
                } else {
                    println!("{resolution}");
                }
            }
            Ok(())
        }
        Command::Config => {
            let app = App::load()?;
            println!("# source: {}", app.source);
            print!("{}", app.config.to_toml_string()?);
            Ok(())
        }
    }
}

async fn run_daemon() -> anyhow::Result<()> {
    let app = App::load()?;
    let poll_interval: Duration = app.config.schedule.poll_interval;

    let watch = match app.store.watch() {
        Ok(watch) => Some(watch),
        Err(err) => {
            warn!(
                error = %err,
                "settings file watch unavailable; preference changes from other processes need a restart"
            );
            None
        }
    };

    let runtime = UpdateRuntime::start(app.orchestrator()?, poll_interval);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested");

    drop(watch);
    runtime.stop().await;
    Ok(())
}

async fn run_update(force: bool) -> anyhow::Result<()> {
    let app = App::load()?;
    let outcome = app.orchestrator()?.run(force).await;
    println!("{outcome}");
    if let RunOutcome::Failed { stage, .. } = outcome {
        bail!("update failed during {stage}");
    }
    Ok(())
}

fn print_status() -> anyhow::Result<()> {
    let app = App::load()?;
    let store = app.store.as_ref();
    let prefs = read_preferences(store);
    let state = read_update_state(store);
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".into());

    println!(
        "region:      {} ({})",
        prefs.region.code(),
        prefs.region.display_name()
    );
    println!("resolution:  {}", prefs.resolution);
    println!("last update: {}", or_dash(state.last_update_timestamp));
    println!("last url:    {}", or_dash(state.last_wallpaper_url));
    println!("copyright:   {}", or_dash(state.last_wallpaper_copyright));
    println!("wallpaper:   {}", app.config.wallpaper_path().display());
    println!("settings:    {}", app.config.settings_path().display());
    Ok(())
}

fn apply_setting(set: SetCommand) -> anyhow::Result<()> {
    let (key, value) = match set {
        SetCommand::Region { code } => {
            let region: Region = code
                .parse()
                .context("run `bingwall regions` for the supported codes")?;
            (keys::REGION, region.code().to_string())
        }
        SetCommand::Resolution { token } => {
            let resolution: Resolution = token
                .parse()
                .context("run `bingwall resolutions` for the supported tokens")?;
            (keys::RESOLUTION, resolution.as_str().to_string())
        }
    };

    let app = App::load()?;
    app.store
        .set_string(key, &value)
        .with_context(|| format!("failed to save {key}"))?;
    println!("{key} = {value}");
    Ok(())
}
