//! Inputroute daemon
//!
//! Command-line front end for picking a preferred audio input device and
//! holding that preference until reverted.
//!
//! # Architecture
//!
//! - [`config`]: configuration file loading
//! - [`app_state`]: device snapshot plus routing controller
//! - [`commands`]: `list`, `apply` and the interactive console
//! - [`shutdown`]: signals that trigger teardown
//!
//! The caller is responsible for microphone and Bluetooth access rights;
//! nothing here requests them.

pub mod app_state;
pub mod commands;
pub mod config;
pub mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use inputroute_core::mock::MockPlatform;
use inputroute_core::{DeviceCategory, DeviceType, PlatformDevice};
use inputroute_pulse::{Pactl, PulsePlatform};
use tracing_subscriber::EnvFilter;

use app_state::{AppState, DaemonPlatform};
use config::{DaemonConfig, LOG_ENV};

#[derive(Debug, Parser)]
#[command(name = "inputrouted", version, about = "Prefer an audio input device until reverted")]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use a simulated audio platform instead of the sound server
    #[arg(long, global = true)]
    pub simulate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List selectable input devices
    List {
        /// Print JSON instead of a numbered list
        #[arg(long)]
        json: bool,
    },
    /// Apply a preference and hold it until Ctrl-C
    Apply {
        /// Device number from `list`
        #[arg(required_unless_present = "category", conflicts_with = "category")]
        device: Option<usize>,

        /// Apply a category without enumerating devices
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },
    /// Interactive console (default)
    Console,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    BuiltinMic,
    WiredHeadset,
    UsbAudio,
    Bluetooth,
}

impl From<CategoryArg> for DeviceCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::BuiltinMic => DeviceCategory::BuiltinMic,
            CategoryArg::WiredHeadset => DeviceCategory::WiredHeadset,
            CategoryArg::UsbAudio => DeviceCategory::UsbAudio,
            CategoryArg::Bluetooth => DeviceCategory::Bluetooth,
        }
    }
}

const STDIN_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(200);

/// Logs go to stderr so `list --json` output stays clean.
fn init_logging(config: &DaemonConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));

    // Enhanced logging for debug builds
    #[cfg(debug_assertions)]
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .init();
        tracing::debug!("Debug mode logging enabled");
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

/// Devices reported by `--simulate`
fn simulated_platform() -> MockPlatform {
    MockPlatform::with_devices(vec![
        PlatformDevice::new(1u32, "Built-in Microphone", DeviceType::BuiltinMic),
        PlatformDevice::new(2u32, "USB Headset", DeviceType::UsbHeadset),
        PlatformDevice::new(3u32, "AirPods", DeviceType::BluetoothSco),
    ])
}

async fn dispatch<P: DaemonPlatform>(
    platform: P,
    config: &DaemonConfig,
    command: Command,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(platform, &config.status_title));

    match command {
        Command::List { json } => {
            let state = Arc::clone(&state);
            tokio::task::spawn_blocking(move || commands::list_devices(&state, json)).await?
        }
        Command::Apply { device, category } => {
            commands::apply_and_hold(state, device, category.map(DeviceCategory::from)).await
        }
        Command::Console => commands::run_console(state).await,
    }
}

/// Daemon entry point
///
/// Parses arguments, loads configuration, initializes logging and runs the
/// selected command on a multi-threaded tokio runtime.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = DaemonConfig::load(cli.config.as_deref())?;
    init_logging(&config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let command = cli.command.unwrap_or(Command::Console);
    let result = runtime.block_on(async {
        if cli.simulate {
            tracing::info!("Using simulated audio platform");
            dispatch(simulated_platform(), &config, command).await
        } else {
            let platform = PulsePlatform::new(Pactl::new(&config.pactl_path))
                .with_headset_profiles(config.bluetooth_profiles.clone());
            dispatch(platform, &config, command).await
        }
    });

    // A pending stdin read would otherwise keep the runtime alive.
    runtime.shutdown_timeout(STDIN_SHUTDOWN_TIMEOUT);
    result
}
