//! Command handlers for the CLI and the interactive console
//!
//! Handlers print user-facing messages to stdout; diagnostics go through
//! `tracing` to stderr.

use std::sync::Arc;

use anyhow::Context;
use inputroute_core::{DeviceCategory, InputDevice, RouteError, RoutingPreference};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app_state::{AppState, DaemonPlatform};
use crate::shutdown::shutdown_signal;

// ============================================================================
// Output formatting
// ============================================================================

pub fn format_device_list(devices: &[InputDevice]) -> String {
    if devices.is_empty() {
        return "No input devices found".to_string();
    }
    devices
        .iter()
        .enumerate()
        .map(|(i, device)| format!("  {}. {}", i + 1, device.display_name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_status(preference: &RoutingPreference) -> String {
    match (preference.active_category(), preference.applied_at()) {
        (Some(category), Some(since)) => format!(
            "Preference: {} ({}), since {}",
            category,
            preference.state(),
            since.with_timezone(&chrono::Local).format("%H:%M:%S")
        ),
        _ => "Preference: default routing".to_string(),
    }
}

fn applied_message(category: DeviceCategory) -> String {
    format!("Preference set to: {}", category.label())
}

const REVERTED_MESSAGE: &str = "Audio preference reverted to default";

const CONSOLE_HELP: &str = "\
Commands:
  list | refresh     re-scan input devices
  apply <n>          prefer device number <n>
  revert             revert to default routing
  status             show the applied preference
  help               show this help
  quit               revert and exit";

// ============================================================================
// One-shot commands
// ============================================================================

/// List selectable input devices
pub fn list_devices<P: DaemonPlatform>(state: &AppState<P>, json: bool) -> anyhow::Result<()> {
    let devices = state.refresh().context("Failed to enumerate input devices")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else {
        println!("{}", format_device_list(&devices));
    }
    Ok(())
}

/// Apply a preference and hold it until a shutdown signal
///
/// `position` is 1-based in `list` order; `category` skips enumeration.
pub async fn apply_and_hold<P: DaemonPlatform>(
    state: Arc<AppState<P>>,
    position: Option<usize>,
    category: Option<DeviceCategory>,
) -> anyhow::Result<()> {
    let applied = {
        let state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || match category {
            Some(category) => state.controller().start(category).map(|_| category),
            None => {
                state.refresh()?;
                state.apply_position(position).map(|device| device.category)
            }
        })
        .await?
    };

    let category = match applied {
        Ok(category) => category,
        Err(RouteError::NoDevicesFound) => anyhow::bail!("No input devices found"),
        Err(RouteError::NoSelectionMade) => {
            anyhow::bail!("No device selected or available; run `inputrouted list` for numbers")
        }
        Err(e) => return Err(e).context("Failed to apply audio preference"),
    };

    println!("{}", applied_message(category));
    println!("Press Ctrl-C to revert and exit");

    shutdown_signal().await;

    tokio::task::spawn_blocking(move || state.revert()).await?;
    println!("{}", REVERTED_MESSAGE);
    Ok(())
}

// ============================================================================
// Interactive console
// ============================================================================

enum ConsoleCommand {
    Refresh,
    Apply(Option<usize>),
    Revert,
    Status,
    Help,
    Quit,
    Unknown(String),
}

fn parse_console_command(line: &str) -> Option<ConsoleCommand> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    let parsed = match command.to_ascii_lowercase().as_str() {
        "list" | "refresh" | "l" => ConsoleCommand::Refresh,
        "apply" | "a" => ConsoleCommand::Apply(words.next().and_then(|n| n.parse().ok())),
        "revert" | "r" => ConsoleCommand::Revert,
        "status" | "s" => ConsoleCommand::Status,
        "help" | "h" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => ConsoleCommand::Unknown(other.to_string()),
    };
    Some(parsed)
}

/// Run one console command; returns `false` when the console should exit.
async fn handle_console_command<P: DaemonPlatform>(
    state: &Arc<AppState<P>>,
    command: ConsoleCommand,
) -> anyhow::Result<bool> {
    let state = Arc::clone(state);
    match command {
        ConsoleCommand::Refresh => {
            match tokio::task::spawn_blocking(move || state.refresh()).await? {
                Ok(devices) => println!("{}\nDevice list updated.", format_device_list(&devices)),
                Err(e) => println!("Failed to scan for devices: {}", e),
            }
        }
        ConsoleCommand::Apply(position) => {
            match tokio::task::spawn_blocking(move || state.apply_position(position)).await? {
                Ok(device) => println!("{}", applied_message(device.category)),
                Err(e) => println!("{}", e),
            }
        }
        ConsoleCommand::Revert => {
            tokio::task::spawn_blocking(move || state.revert()).await?;
            println!("{}", REVERTED_MESSAGE);
        }
        ConsoleCommand::Status => println!("{}", format_status(&state.preference())),
        ConsoleCommand::Help => println!("{}", CONSOLE_HELP),
        ConsoleCommand::Quit => return Ok(false),
        ConsoleCommand::Unknown(word) => println!("Unknown command `{}`; try `help`", word),
    }
    Ok(true)
}

/// Interactive loop: refresh, pick, apply, revert
///
/// Exits on `quit`, end of input or a shutdown signal; always reverts.
pub async fn run_console<P: DaemonPlatform>(state: Arc<AppState<P>>) -> anyhow::Result<()> {
    handle_console_command(&state, ConsoleCommand::Refresh).await?;
    println!("{}", CONSOLE_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                let Some(command) = parse_console_command(&line) else {
                    continue;
                };
                if !handle_console_command(&state, command).await? {
                    break;
                }
            }
        }
    }

    tokio::task::spawn_blocking(move || state.revert()).await?;
    println!("{}", REVERTED_MESSAGE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inputroute_core::mock::MockPlatform;
    use inputroute_core::{DeviceId, DeviceType, PlatformDevice, RoutingController};

    #[test]
    fn test_format_device_list_numbers_from_one() {
        let devices = vec![
            InputDevice::new(DeviceId::from(1u32), "Pixel Mic (Internal Mic)".into(), DeviceCategory::BuiltinMic),
            InputDevice::new(DeviceId::from(2u32), "AirPods (Bluetooth)".into(), DeviceCategory::Bluetooth),
        ];
        assert_eq!(
            format_device_list(&devices),
            "  1. Pixel Mic (Internal Mic)\n  2. AirPods (Bluetooth)"
        );
        assert_eq!(format_device_list(&[]), "No input devices found");
    }

    #[test]
    fn test_format_status() {
        assert_eq!(format_status(&RoutingPreference::default()), "Preference: default routing");

        let controller = RoutingController::new(MockPlatform::new());
        controller.start(DeviceCategory::WiredHeadset).unwrap();
        let status = format_status(&controller.preference());
        assert!(status.starts_with("Preference: Wired Headset (active (default routing)), since "));
    }

    #[test]
    fn test_parse_console_commands() {
        assert!(parse_console_command("   ").is_none());
        assert!(matches!(parse_console_command("apply 2"), Some(ConsoleCommand::Apply(Some(2)))));
        assert!(matches!(parse_console_command("a x"), Some(ConsoleCommand::Apply(None))));
        assert!(matches!(parse_console_command("REFRESH"), Some(ConsoleCommand::Refresh)));
        assert!(matches!(parse_console_command("q"), Some(ConsoleCommand::Quit)));
        assert!(matches!(parse_console_command("mute"), Some(ConsoleCommand::Unknown(w)) if w == "mute"));
    }

    #[tokio::test]
    async fn test_console_commands_drive_routing() {
        let platform = MockPlatform::with_devices(vec![PlatformDevice::new(
            2u32,
            "AirPods",
            DeviceType::BluetoothSco,
        )]);
        let state = Arc::new(AppState::new(platform.clone(), "Audio Manager Active"));

        assert!(handle_console_command(&state, ConsoleCommand::Refresh).await.unwrap());
        assert!(handle_console_command(&state, ConsoleCommand::Apply(Some(1))).await.unwrap());
        assert!(platform.is_bluetooth_routing_on());

        assert!(handle_console_command(&state, ConsoleCommand::Revert).await.unwrap());
        assert!(!platform.is_bluetooth_routing_on());
        assert!(!handle_console_command(&state, ConsoleCommand::Quit).await.unwrap());
    }
}
