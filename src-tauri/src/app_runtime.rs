use std::{sync::Arc, time::SystemTime};

use tauri::{webview::PageLoadEvent, AppHandle, Manager, RunEvent, WindowEvent};

use crate::{
    app_config, app_menu, app_paths, content_loader, desktop_bridge_commands,
    exit_events::{self, MainWindowCloseAction},
    logging::{self, LogFileSink},
    main_window, tray_setup, window_actions, ShellState, BUNDLED_APP_ORIGINS, LOG_RETENTION,
    MAIN_WINDOW_LABEL,
};

fn prepare_log_directory(app_handle: &AppHandle, sink: &LogFileSink) {
    let config = app_handle.state::<ShellState>().config.clone();
    let logs_dir = match app_paths::logs_dir(app_handle, &config) {
        Ok(dir) => dir,
        Err(error) => {
            tracing::warn!(%error, "log file disabled");
            return;
        }
    };

    match sink.attach(&logs_dir, chrono::Local::now().date_naive()) {
        Ok(path) => tracing::info!(path = %path.display(), "writing log file"),
        Err(error) => tracing::warn!(%error, "log file disabled"),
    }
    match logging::rotate_old_logs(&logs_dir, SystemTime::now(), LOG_RETENTION) {
        Ok(0) => {}
        Ok(deleted) => tracing::info!(deleted, "removed old log files"),
        Err(error) => tracing::warn!(%error, "log rotation failed"),
    }
}

fn close_action_for(app_handle: &AppHandle) -> MainWindowCloseAction {
    let state = app_handle.state::<ShellState>();
    exit_events::decide_main_window_close(&state.config.tray, state.lifecycle.current())
}

pub(crate) fn run() {
    let log_sink = match logging::init_logging() {
        Ok(sink) => Some(sink),
        Err(error) => {
            eprintln!("failed to initialize logging: {error}");
            None
        }
    };
    logging::install_panic_hook();

    let config = match app_config::load_app_config() {
        Ok(config) => Arc::new(config),
        Err(error) => {
            tracing::error!(%error, "failed to load application configuration");
            eprintln!("failed to load application configuration: {error}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        app = %config.product_name,
        version = %config.version,
        main_url = %config.urls.main,
        "application starting"
    );
    if !content_loader::is_valid_url(&config.urls.main) {
        tracing::warn!(
            url = %config.urls.main,
            "main url is invalid, the fallback page will be shown"
        );
    }
    if !config.window.web_preferences.is_hardened() {
        tracing::warn!(
            web_preferences = ?config.window.web_preferences,
            "webPreferences are not hardened; content always runs isolated without node access"
        );
    }

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .manage(ShellState::new(config))
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::bridge_send,
            crate::desktop_bridge_commands::bridge_invoke,
            crate::desktop_bridge_commands::bridge_subscribe,
            crate::desktop_bridge_commands::bridge_unsubscribe,
            crate::desktop_bridge_commands::bridge_open_external,
        ])
        .on_menu_event(|app_handle, event| app_menu::handle_menu_event(app_handle, event))
        .on_window_event(|window, event| match event {
            WindowEvent::CloseRequested { api, .. } => {
                if window.label() != MAIN_WINDOW_LABEL {
                    return;
                }
                let app_handle = window.app_handle();
                if close_action_for(app_handle) == MainWindowCloseAction::HideToTray {
                    api.prevent_close();
                    window_actions::hide_main_window(app_handle);
                }
            }
            WindowEvent::Focused(false) => {
                if window.label() != MAIN_WINDOW_LABEL {
                    return;
                }
                if let Ok(true) = window.is_minimized() {
                    let app_handle = window.app_handle();
                    if close_action_for(app_handle) == MainWindowCloseAction::HideToTray {
                        window_actions::hide_main_window(app_handle);
                    }
                }
            }
            WindowEvent::Destroyed => {
                let state = window.app_handle().state::<ShellState>();
                state.notifications.forget_surface(window.label());
                tracing::debug!(label = %window.label(), "window destroyed");
            }
            _ => {}
        })
        .on_page_load(|webview, payload| match payload.event() {
            PageLoadEvent::Started => {
                tracing::debug!(
                    label = %webview.label(),
                    url = %payload.url(),
                    "page load started"
                );
            }
            PageLoadEvent::Finished => {
                tracing::debug!(
                    label = %webview.label(),
                    url = %payload.url(),
                    "page load finished"
                );
                let app_handle = webview.app_handle();
                let state = app_handle.state::<ShellState>();
                state.navigation_permits.release_on_finished(
                    webview.label(),
                    payload.url(),
                    &BUNDLED_APP_ORIGINS,
                );
                if webview.label() != MAIN_WINDOW_LABEL {
                    return;
                }
                if state.claim_main_window_reveal() {
                    window_actions::show_main_window(app_handle);
                }
            }
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();
            if let Some(sink) = log_sink.as_ref() {
                prepare_log_directory(&app_handle, sink);
            }

            match app_menu::build_application_menu(&app_handle) {
                Ok(menu) => {
                    if let Err(error) = app_handle.set_menu(menu) {
                        tracing::warn!(%error, "failed to install application menu");
                    }
                }
                Err(error) => tracing::warn!(%error, "failed to build application menu"),
            }

            if let Err(error) = desktop_bridge_commands::grant_remote_bridge_access(&app_handle) {
                tracing::error!(%error, "bridge unavailable to remote content");
            }

            main_window::create_main_window(&app_handle)?;

            let tray_enabled = app_handle.state::<ShellState>().config.tray.enabled;
            if tray_enabled {
                if let Err(error) = tray_setup::setup_tray(&app_handle) {
                    tracing::warn!(%error, "failed to initialize tray");
                }
            }

            content_loader::spawn_main_content_load(app_handle);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, api, .. } => {
                exit_events::handle_exit_requested(app_handle, code, &api);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen {
                has_visible_windows,
                ..
            } => {
                if !has_visible_windows {
                    main_window::ensure_main_window(app_handle);
                }
            }
            _ => {}
        });
}
