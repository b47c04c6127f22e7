use std::time::Duration;

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const SECONDARY_WINDOW_LABEL_PREFIX: &str = "secondary-";
pub const TRAY_ID: &str = "shell_tray";

pub const CONFIG_PATH_ENV: &str = "WEBVIEW_SHELL_CONFIG";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub const LOADING_PAGE: &str = "loading.html";
pub const FALLBACK_PAGE: &str = "index.html";
pub const FATAL_ERROR_TITLE: &str = "Application Error";
pub const CONTENT_REACHABILITY_TIMEOUT: Duration = Duration::from_secs(3);

pub const INVOKE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DIALOG_INVOKE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub const SECONDARY_WINDOW_OFFSET: f64 = 50.0;

pub const HELP_LEARN_MORE_URL: &str = "https://v2.tauri.app";
pub const HELP_DOCUMENTATION_URL: &str = "https://v2.tauri.app/start/";

/// Origins the webview uses for files bundled from `frontendDist`.
pub const BUNDLED_APP_ORIGINS: [&str; 3] = [
    "tauri://localhost",
    "http://tauri.localhost",
    "https://tauri.localhost",
];

#[cfg(windows)]
pub const BUNDLED_APP_BASE_URL: &str = "http://tauri.localhost/";
#[cfg(not(windows))]
pub const BUNDLED_APP_BASE_URL: &str = "tauri://localhost/";
