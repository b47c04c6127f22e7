use std::{env, fs, path::PathBuf};

use chrono::Datelike;
use serde::Deserialize;

use crate::CONFIG_PATH_ENV;

const EMBEDDED_CONFIG: &str = include_str!("../app.config.json");

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppConfig {
    pub(crate) name: String,
    pub(crate) product_name: String,
    pub(crate) description: String,
    pub(crate) version: String,
    pub(crate) app_id: String,
    pub(crate) author: AuthorConfig,
    #[serde(default)]
    pub(crate) copyright: Option<String>,
    pub(crate) window: WindowConfig,
    pub(crate) urls: UrlConfig,
    #[serde(default)]
    pub(crate) tray: TrayConfig,
    #[serde(default)]
    pub(crate) mac_category: Option<String>,
    #[serde(default)]
    pub(crate) linux_category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthorConfig {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WindowConfig {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) min_width: f64,
    pub(crate) min_height: f64,
    #[serde(default)]
    pub(crate) web_preferences: WebPreferences,
}

/// Isolation switches carried over from the shell template. The webview always runs content
/// isolated from the shell, so these only ever confirm or contradict that.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct WebPreferences {
    pub(crate) context_isolation: bool,
    pub(crate) node_integration: bool,
    pub(crate) sandbox: bool,
}

impl Default for WebPreferences {
    fn default() -> Self {
        Self {
            context_isolation: true,
            node_integration: false,
            sandbox: true,
        }
    }
}

impl WebPreferences {
    pub(crate) fn is_hardened(&self) -> bool {
        self.context_isolation && self.sandbox && !self.node_integration
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UrlConfig {
    pub(crate) main: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TrayConfig {
    pub(crate) enabled: bool,
    pub(crate) tooltip: Option<String>,
    pub(crate) show_on_click: bool,
    pub(crate) minimize_to_tray: bool,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tooltip: None,
            show_on_click: true,
            minimize_to_tray: false,
        }
    }
}

impl AppConfig {
    pub(crate) fn copyright_notice(&self) -> String {
        self.copyright.clone().unwrap_or_else(|| {
            format!(
                "Copyright © {} {}",
                chrono::Local::now().year(),
                self.author.name
            )
        })
    }

    pub(crate) fn tray_tooltip(&self) -> &str {
        self.tray
            .tooltip
            .as_deref()
            .filter(|tooltip| !tooltip.trim().is_empty())
            .unwrap_or(&self.product_name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "name",
                reason: "must be non-empty and contain no whitespace".to_string(),
            });
        }
        for (field, value) in [
            ("productName", &self.product_name),
            ("version", &self.version),
            ("appId", &self.app_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }

        let window = &self.window;
        if window.min_width <= 0.0 || window.min_height <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "window",
                reason: "minimum bounds must be positive".to_string(),
            });
        }
        if window.width < window.min_width || window.height < window.min_height {
            return Err(ConfigError::Invalid {
                field: "window",
                reason: format!(
                    "size {}x{} is below minimum {}x{}",
                    window.width, window.height, window.min_width, window.min_height
                ),
            });
        }

        Ok(())
    }
}

pub(crate) fn parse_app_config(raw: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration once at startup: the file named by `WEBVIEW_SHELL_CONFIG` when set,
/// otherwise the copy embedded at build time.
pub(crate) fn load_app_config() -> Result<AppConfig, ConfigError> {
    let override_path = env::var(CONFIG_PATH_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);

    let Some(path) = override_path else {
        return parse_app_config(EMBEDDED_CONFIG);
    };

    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = parse_app_config(&raw)?;
    tracing::info!(path = %path.display(), "loaded configuration override");
    Ok(config)
}
