use tauri::{AppHandle, Manager, WebviewWindow};

use crate::MAIN_WINDOW_LABEL;

pub fn show_main_window(app_handle: &AppHandle) {
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        tracing::debug!("show_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.unminimize() {
        tracing::warn!(%error, "failed to unminimize main window");
    }
    if let Err(error) = window.show() {
        tracing::warn!(%error, "failed to show main window");
    }
    if let Err(error) = window.set_focus() {
        tracing::warn!(%error, "failed to focus main window");
    }
}

pub fn hide_main_window(app_handle: &AppHandle) {
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        tracing::debug!("hide_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.hide() {
        tracing::warn!(%error, "failed to hide main window");
    }
}

/// Focuses the main window when it is visible, otherwise brings it back.
pub fn reveal_main_window(app_handle: &AppHandle) {
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        tracing::debug!("reveal_main_window skipped: main window not found");
        return;
    };

    match window.is_visible() {
        Ok(true) => {
            if let Err(error) = window.set_focus() {
                tracing::warn!(%error, "failed to focus main window");
            }
        }
        Ok(false) => show_main_window(app_handle),
        Err(error) => tracing::warn!(
            %error,
            "failed to read main window visibility in reveal_main_window"
        ),
    }
}

pub fn minimize_window(window: &WebviewWindow) -> Result<(), String> {
    window
        .minimize()
        .map_err(|error| format!("Failed to minimize window '{}': {error}", window.label()))
}

pub fn toggle_maximize_window(window: &WebviewWindow) -> Result<(), String> {
    let maximized = window
        .is_maximized()
        .map_err(|error| format!("Failed to read maximize state: {error}"))?;
    let result = if maximized {
        window.unmaximize()
    } else {
        window.maximize()
    };
    result.map_err(|error| format!("Failed to toggle maximize on '{}': {error}", window.label()))
}

/// Requests a close, which still runs through the close policy in the window event handler.
pub fn close_window(window: &WebviewWindow) -> Result<(), String> {
    window
        .close()
        .map_err(|error| format!("Failed to close window '{}': {error}", window.label()))
}

pub fn reload_window(window: &WebviewWindow) -> Result<(), String> {
    window
        .eval("window.location.reload()")
        .map_err(|error| format!("Failed to reload window '{}': {error}", window.label()))
}

#[cfg(debug_assertions)]
pub fn toggle_devtools(window: &WebviewWindow) {
    if window.is_devtools_open() {
        window.close_devtools();
    } else {
        window.open_devtools();
    }
}
