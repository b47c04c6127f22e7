use std::path::PathBuf;

use tauri::{AppHandle, Manager};

use crate::app_config::AppConfig;

/// Per-user data directory, named after the technical app name rather than the bundle id.
pub(crate) fn user_data_dir(app_handle: &AppHandle, config: &AppConfig) -> Result<PathBuf, String> {
    app_handle
        .path()
        .data_dir()
        .map(|dir| dir.join(&config.name))
        .map_err(|error| format!("Failed to resolve user data directory: {error}"))
}

pub(crate) fn logs_dir(app_handle: &AppHandle, config: &AppConfig) -> Result<PathBuf, String> {
    user_data_dir(app_handle, config).map(|dir| dir.join("logs"))
}
