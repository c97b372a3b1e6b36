use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;
use tauri::{Emitter, Manager, State};

use crate::audio;
use crate::core::{
    alerts::model::{AlertedSighting, CategorySelection, ImplingKind},
    config::{ConfigManager, Settings},
    coordinator::Monitor,
    fetch::SightingsClient,
    model::Sighting,
};

struct AppState {
    monitor: Mutex<Monitor>,
    settings: Mutex<Settings>,
    config_manager: ConfigManager,
    alert_sound: PathBuf,
}

/// Snapshot of engine state for the frontend.
#[derive(Serialize)]
struct StatusResponse {
    active: bool,
    remaining_secs: u32,
    alert: Option<AlertedSighting>,
    selection: CategorySelection,
}

#[tauri::command]
fn get_status(state: State<'_, AppState>) -> StatusResponse {
    let monitor = state.monitor.lock().unwrap();
    StatusResponse {
        active: monitor.session().is_active(),
        remaining_secs: monitor.session().remaining_secs(),
        alert: monitor.active_alert().cloned(),
        selection: monitor.selection().clone(),
    }
}

#[tauri::command]
fn get_feed(state: State<'_, AppState>) -> Vec<Sighting> {
    state.monitor.lock().unwrap().last_feed().to_vec()
}

#[tauri::command]
fn get_history(state: State<'_, AppState>) -> Vec<AlertedSighting> {
    state.monitor.lock().unwrap().recent_history()
}

#[tauri::command]
fn get_settings(state: State<'_, AppState>) -> Settings {
    state.settings.lock().unwrap().clone()
}

#[tauri::command]
fn save_settings(settings: Settings, state: State<'_, AppState>) -> Result<(), String> {
    // Selection changes ride along with the settings form; run them through
    // the monitor first so the active-session gate stays authoritative.
    {
        let mut monitor = state.monitor.lock().unwrap();
        if *monitor.selection() != settings.selection {
            monitor
                .set_selection(settings.selection.clone())
                .map_err(|e| e.to_string())?;
        }
    }
    let mut current = state.settings.lock().unwrap();
    *current = settings.clone();
    state.config_manager.save(&settings).map_err(|e| e.to_string())
}

#[tauri::command]
fn toggle_category(kind: ImplingKind, state: State<'_, AppState>) -> Result<bool, String> {
    let (enabled, selection) = {
        let mut monitor = state.monitor.lock().unwrap();
        let enabled = monitor.toggle_category(kind).map_err(|e| e.to_string())?;
        (enabled, monitor.selection().clone())
    };

    // Remember the selection for the next launch; a failed write is not
    // worth failing the toggle over.
    let mut settings = state.settings.lock().unwrap();
    settings.selection = selection;
    if let Err(e) = state.config_manager.save(&settings) {
        warn!("failed to persist settings: {}", e);
    }
    Ok(enabled)
}

#[tauri::command]
fn reset_alert(state: State<'_, AppState>, app: tauri::AppHandle) {
    state.monitor.lock().unwrap().reset_alert();
    let _ = app.emit("alert-cleared", ());
}

#[tauri::command]
fn disable_app(state: State<'_, AppState>, app: tauri::AppHandle) {
    state.monitor.lock().unwrap().deactivate();
    info!("session disabled by user");
    let _ = app.emit("session-ended", ());
}

/// Start a session and its background tasks. Returns the granted budget in
/// seconds so the frontend can seed the countdown display.
#[tauri::command]
fn activate_app(state: State<'_, AppState>, app: tauri::AppHandle) -> Result<u32, String> {
    let settings = state.settings.lock().unwrap().clone();
    let generation = {
        let mut monitor = state.monitor.lock().unwrap();
        monitor.activate(settings.session_secs)
    };
    info!(
        "session activated for {}s, polling every {}s",
        settings.session_secs, settings.poll_interval_secs
    );

    spawn_countdown_loop(app.clone(), generation);
    spawn_poll_loop(
        app,
        generation,
        settings.feed_url,
        Duration::from_secs(settings.poll_interval_secs),
        Duration::from_secs(settings.alert_dwell_secs),
    );
    Ok(settings.session_secs)
}

/// Decrements the session budget once per second until the session ends.
/// A stale generation means the session was replaced or manually stopped.
fn spawn_countdown_loop(handle: tauri::AppHandle, generation: u64) {
    enum Tick {
        Running(u32),
        Expired,
        Stale,
    }

    tauri::async_runtime::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;

            let tick = {
                let state = handle.state::<AppState>();
                let mut monitor = state.monitor.lock().unwrap();
                if monitor.session().generation() != generation {
                    Tick::Stale
                } else if monitor.tick_countdown() {
                    Tick::Expired
                } else if monitor.session().is_active() {
                    Tick::Running(monitor.session().remaining_secs())
                } else {
                    Tick::Stale
                }
            };

            match tick {
                Tick::Running(remaining) => {
                    let _ = handle.emit("countdown", remaining);
                }
                Tick::Expired => {
                    info!("session budget exhausted, polling stopped");
                    let _ = handle.emit("countdown", 0u32);
                    let _ = handle.emit("session-ended", ());
                    break;
                }
                Tick::Stale => break,
            }
        }
    });
}

/// One fetch-filter-evaluate cycle per poll interval. The fetch itself runs
/// without the state lock; its result is applied in a single locked step so
/// cycles never interleave. Snapshots that outlive their session generation
/// are discarded.
fn spawn_poll_loop(
    handle: tauri::AppHandle,
    generation: u64,
    feed_url: String,
    poll_interval: Duration,
    dwell: Duration,
) {
    tauri::async_runtime::spawn(async move {
        let client = SightingsClient::new(feed_url);
        info!("poll loop started against {}", client.url());

        loop {
            let fetched = client.fetch_sightings().await;

            let applied = {
                let state = handle.state::<AppState>();
                let mut monitor = state.monitor.lock().unwrap();
                if monitor.session().generation() != generation
                    || !monitor.session().is_active()
                {
                    // Session ended while the request was in flight
                    break;
                }
                match fetched {
                    Ok(snapshot) => {
                        let output = monitor.tick(snapshot);
                        let fired = output.fired.map(|alerted| (alerted, monitor.alert_seq()));
                        Some((monitor.last_feed().to_vec(), fired))
                    }
                    Err(e) => {
                        warn!("fetch failed, skipping cycle: {}", e);
                        None
                    }
                }
            };

            if let Some((feed, fired)) = applied {
                let _ = handle.emit("feed-update", feed);
                if let Some((alerted, seq)) = fired {
                    let sound = handle.state::<AppState>().alert_sound.clone();
                    audio::play_alert_cue(sound);
                    let _ = handle.emit("alert-fired", alerted);
                    spawn_dwell_timer(handle.clone(), seq, dwell);
                }
            }

            tokio::time::sleep(poll_interval).await;
        }
        info!("poll loop stopped");
    });
}

/// Auto-clears one specific alert after the dwell time. Alerts that were
/// reset or replaced in the meantime are left alone.
fn spawn_dwell_timer(handle: tauri::AppHandle, seq: u64, dwell: Duration) {
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(dwell).await;
        let cleared = {
            let state = handle.state::<AppState>();
            let mut monitor = state.monitor.lock().unwrap();
            monitor.expire_alert(seq)
        };
        if cleared {
            let _ = handle.emit("alert-cleared", ());
        }
    });
}

pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            // Initialize Config
            let config_dir = app.path().app_config_dir().unwrap_or(PathBuf::from("."));
            let config_manager = ConfigManager::new(config_dir);
            let settings = config_manager.load();

            let mut monitor = Monitor::new();
            // Startup is always inactive, so restoring the selection cannot fail
            let _ = monitor.set_selection(settings.selection.clone());

            let alert_sound = app
                .path()
                .resource_dir()
                .map(|dir| dir.join("sounds/alert.mp3"))
                .unwrap_or_else(|_| PathBuf::from("sounds/alert.mp3"));

            app.manage(AppState {
                monitor: Mutex::new(monitor),
                settings: Mutex::new(settings),
                config_manager,
                alert_sound,
            });

            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }
            app.handle()
                .plugin(tauri_plugin_window_state::Builder::default().build())?;

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            activate_app,
            disable_app,
            toggle_category,
            reset_alert,
            get_status,
            get_feed,
            get_history,
            get_settings,
            save_settings
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
