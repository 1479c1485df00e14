use std::{str::FromStr, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use chrono_tz::Tz;
use getupplease::{
    AlarmController, AlarmError, AlarmPresenter, AlarmState, AlarmStateMachine, AlarmTime,
    appsettings::AppSettings,
    haptics::LogHapticDevice,
    notification::{LocalNotificationCenter, NotificationBridge, delivery_channel},
    view::{self, Pulse},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};

const HELP: &str = "Commands: set HH:MM | cancel | dismiss | status | background | foreground | quit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Set(AlarmTime),
    Cancel,
    Dismiss,
    Status,
    Background,
    Foreground,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = match (parts.next(), parts.next()) {
            (Some("set"), Some(time)) => Command::Set(
                time.parse::<AlarmTime>()
                    .with_context(|| format!("Expected HH:MM, got {time:?}"))?,
            ),
            (Some("set"), None) => anyhow::bail!("Usage: set HH:MM"),
            (Some("cancel"), None) => Command::Cancel,
            (Some("dismiss"), None) => Command::Dismiss,
            (Some("status"), None) => Command::Status,
            (Some("background"), None) => Command::Background,
            (Some("foreground"), None) => Command::Foreground,
            (Some("help"), None) => Command::Help,
            (Some("quit" | "exit"), None) => Command::Quit,
            _ => anyhow::bail!("Unknown command {line:?}. {HELP}"),
        };

        Ok(command)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::new().context("Could not load appsettings")?;
    let timezone = settings.platform.timezone()?;
    log::info!("Starting GetUpPlease. [timezone = {timezone}]");

    let (delivery_handler, deliveries) = delivery_channel();
    let center = Arc::new(LocalNotificationCenter::new(
        delivery_handler,
        timezone,
        settings.platform.grant_authorization,
    ));
    center.set_foreground(settings.platform.foreground);

    let bridge =
        NotificationBridge::with_content(center.clone(), &settings.alarm.title, &settings.alarm.body);
    if let Err(error) = bridge.request_authorization().await {
        log::error!("Notification permission error: {error:#}");
    }

    let pulse_interval = settings.alarm.pulse_interval()?;
    let presenter = AlarmPresenter::with_pulse_interval(Arc::new(LogHapticDevice), pulse_interval);
    let controller = AlarmController::create(AlarmStateMachine::new(bridge, presenter), deliveries);
    let view_task = spawn_view(
        controller.subscribe(),
        controller.subscribe_firing(),
        pulse_interval,
        timezone,
    );

    println!("{}", render(controller.state(), timezone));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => run_command(command, &controller, &center, timezone).await,
            Err(error) => println!("{error:#}"),
        }
    }

    view_task.abort();
    controller.shutdown().await;

    Ok(())
}

async fn run_command(
    command: Command,
    controller: &AlarmController,
    center: &LocalNotificationCenter,
    timezone: Tz,
) {
    let result = match command {
        Command::Set(fire_time) => controller.arm(fire_time).await.map(|_| ()),
        Command::Cancel => controller.cancel().await.map(|_| ()),
        Command::Dismiss => controller.dismiss().await.map(|_| ()),
        Command::Status => {
            println!("{}", render(controller.state(), timezone));
            Ok(())
        }
        Command::Background => {
            center.set_foreground(false);
            println!("App moved to the background");
            Ok(())
        }
        Command::Foreground => {
            center.set_foreground(true);
            println!("App is in the foreground");
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    match result {
        Ok(()) => {}
        Err(AlarmError::PermissionDenied) => {
            println!("Notifications are not allowed. Enable them to set an alarm.")
        }
        Err(error) => println!("{error}"),
    }
}

/// Redraws whenever the alarm state changes, and once per pulse while firing.
fn spawn_view(
    mut state: watch::Receiver<AlarmState>,
    mut firing: watch::Receiver<bool>,
    pulse_interval: Duration,
    timezone: Tz,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(pulse_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick = 0u64;

        loop {
            let pulsing = *firing.borrow();
            tokio::select! {
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = firing.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    tick = 0;
                    ticker.reset();
                }
                _ = ticker.tick(), if pulsing => tick += 1,
            }

            let current = *state.borrow_and_update();
            let pulse = Pulse::frame(*firing.borrow_and_update(), tick);
            println!("{}", view::render(&current, pulse, &now(timezone)));
        }
    })
}

fn render(state: AlarmState, timezone: Tz) -> String {
    view::render(&state, Pulse::Still, &now(timezone))
}

fn now(timezone: Tz) -> chrono::DateTime<Tz> {
    Utc::now().with_timezone(&timezone)
}
