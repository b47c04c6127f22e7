use tauri::{AppHandle, ExitRequestApi, Manager};

use crate::{
    app_config::TrayConfig, app_types::AppLifecycle, platform::Platform, ShellState, TRAY_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitRequestDecision {
    AllowExit,
    StayResident,
}

/// An exit request without a code means the last window closed. macOS keeps the app resident
/// until an explicit quit.
pub(crate) fn decide_exit_request(
    platform: Platform,
    code: Option<i32>,
    lifecycle: AppLifecycle,
) -> ExitRequestDecision {
    if code.is_some() || lifecycle == AppLifecycle::ShuttingDown {
        return ExitRequestDecision::AllowExit;
    }
    if platform.is_mac() {
        ExitRequestDecision::StayResident
    } else {
        ExitRequestDecision::AllowExit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MainWindowCloseAction {
    HideToTray,
    Close,
}

/// Applies to both close and minimize of the main window.
pub(crate) fn decide_main_window_close(
    tray: &TrayConfig,
    lifecycle: AppLifecycle,
) -> MainWindowCloseAction {
    if tray.enabled && tray.minimize_to_tray && lifecycle == AppLifecycle::Running {
        MainWindowCloseAction::HideToTray
    } else {
        MainWindowCloseAction::Close
    }
}

pub(crate) fn handle_exit_requested(
    app_handle: &AppHandle,
    code: Option<i32>,
    api: &ExitRequestApi,
) {
    let state = app_handle.state::<ShellState>();
    match decide_exit_request(Platform::current(), code, state.lifecycle.current()) {
        ExitRequestDecision::StayResident => {
            tracing::debug!("all windows closed, staying resident until explicit quit");
            api.prevent_exit();
        }
        ExitRequestDecision::AllowExit => {
            if state.lifecycle.begin_shutdown() {
                tracing::info!(?code, "application shutting down");
            }
        }
    }
}

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    if app_handle.remove_tray_by_id(TRAY_ID).is_some() {
        tracing::debug!("tray removed");
    }
    tracing::info!("application exited");
}
