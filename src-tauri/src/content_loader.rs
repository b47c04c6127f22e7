//! Resolves the configured main URL into the main window, with a bundled fallback page and a
//! blocking error dialog as the last resort.

use std::{
    net::{TcpStream, ToSocketAddrs},
    path::PathBuf,
    time::Duration,
};

use serde_json::json;
use tauri::{AppHandle, Manager, WebviewWindow};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use url::Url;

use crate::{
    desktop_bridge_commands, ShellState, BUNDLED_APP_BASE_URL, CONTENT_REACHABILITY_TIMEOUT,
    FALLBACK_PAGE, FATAL_ERROR_TITLE, MAIN_WINDOW_LABEL,
};

pub(crate) const ALLOWED_URL_SCHEMES: [&str; 3] = ["https", "http", "file"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum UrlRejection {
    #[error("url is empty")]
    Empty,
    #[error("malformed url: {0}")]
    Malformed(String),
    #[error("unsupported protocol '{0}', allowed: https, http, file")]
    UnsupportedScheme(String),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum LoadError {
    #[error("cannot connect to {target}: {reason}")]
    Unreachable { target: String, reason: String },
    #[error("local file {} does not exist", .0.display())]
    MissingFile(PathBuf),
    #[error("bundled page '{0}' is missing")]
    MissingAsset(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
}

pub(crate) fn validate_url(candidate: &str) -> Result<Url, UrlRejection> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(UrlRejection::Empty);
    }

    let parsed = Url::parse(trimmed).map_err(|error| UrlRejection::Malformed(error.to_string()))?;
    if !ALLOWED_URL_SCHEMES.contains(&parsed.scheme()) {
        return Err(UrlRejection::UnsupportedScheme(parsed.scheme().to_string()));
    }
    Ok(parsed)
}

pub(crate) fn is_valid_url(candidate: &str) -> bool {
    validate_url(candidate).is_ok()
}

/// A window content can be loaded into.
pub(crate) trait ContentSurface {
    fn load_url(&self, url: &Url) -> Result<(), LoadError>;
    fn load_fallback(&self) -> Result<(), LoadError>;
    fn show_fatal_error(&self, title: &str, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadOutcome {
    Main,
    Fallback,
    Failed,
}

pub(crate) fn load_main_content(surface: &dyn ContentSurface, main_url: &str) -> LoadOutcome {
    let url = match validate_url(main_url) {
        Ok(url) => url,
        Err(rejection) => {
            tracing::error!(
                url = main_url,
                reason = %rejection,
                allowed_protocols = ?ALLOWED_URL_SCHEMES,
                "invalid url configuration"
            );
            return load_fallback_page(surface, main_url);
        }
    };

    match surface.load_url(&url) {
        Ok(()) => {
            tracing::info!(url = %url, "successfully loaded main url");
            LoadOutcome::Main
        }
        Err(error) => {
            tracing::error!(url = %url, %error, "failed to load main url");
            load_fallback_page(surface, main_url)
        }
    }
}

fn load_fallback_page(surface: &dyn ContentSurface, main_url: &str) -> LoadOutcome {
    tracing::info!("loading fallback page");
    match surface.load_fallback() {
        Ok(()) => {
            tracing::info!("fallback page loaded");
            LoadOutcome::Fallback
        }
        Err(error) => {
            tracing::error!(%error, "critical: fallback page also failed");
            surface.show_fatal_error(FATAL_ERROR_TITLE, &fatal_error_message(main_url, &error));
            LoadOutcome::Failed
        }
    }
}

fn fatal_error_message(main_url: &str, fallback_error: &LoadError) -> String {
    format!("Failed to load application content.\n\nMain URL: {main_url}\nError: {fallback_error}")
}

/// Checks a target can be reached before the webview is pointed at it; the webview itself
/// reports no load failures.
pub(crate) fn check_reachable(url: &Url, timeout: Duration) -> Result<(), LoadError> {
    if url.scheme() == "file" {
        let path = url.to_file_path().map_err(|_| LoadError::Unreachable {
            target: url.to_string(),
            reason: "not a local file path".to_string(),
        })?;
        return if path.is_file() {
            Ok(())
        } else {
            Err(LoadError::MissingFile(path))
        };
    }

    let unreachable = |reason: String| LoadError::Unreachable {
        target: url.to_string(),
        reason,
    };
    let host = url
        .host_str()
        .ok_or_else(|| unreachable("missing host".to_string()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| unreachable("missing port".to_string()))?;
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|error| unreachable(format!("name resolution failed: {error}")))?;

    let mut last_error = "no addresses resolved".to_string();
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => return Ok(()),
            Err(error) => last_error = format!("{addr}: {error}"),
        }
    }
    Err(unreachable(last_error))
}

pub(crate) struct WindowContentSurface {
    window: WebviewWindow,
}

impl WindowContentSurface {
    pub(crate) fn new(window: WebviewWindow) -> Self {
        Self { window }
    }
}

impl ContentSurface for WindowContentSurface {
    fn load_url(&self, url: &Url) -> Result<(), LoadError> {
        check_reachable(url, CONTENT_REACHABILITY_TIMEOUT)?;

        let label = self.window.label();
        let permits = self.window.state::<ShellState>().navigation_permits.clone();
        permits.grant(label, url);
        self.window.navigate(url.clone()).map_err(|error| {
            permits.revoke(label);
            LoadError::Navigation(error.to_string())
        })
    }

    fn load_fallback(&self) -> Result<(), LoadError> {
        if self
            .window
            .app_handle()
            .asset_resolver()
            .get(FALLBACK_PAGE.to_string())
            .is_none()
        {
            return Err(LoadError::MissingAsset(FALLBACK_PAGE.to_string()));
        }

        let fallback_url = Url::parse(BUNDLED_APP_BASE_URL)
            .and_then(|base| base.join(FALLBACK_PAGE))
            .map_err(|error| LoadError::Navigation(error.to_string()))?;
        self.window
            .navigate(fallback_url)
            .map_err(|error| LoadError::Navigation(error.to_string()))
    }

    fn show_fatal_error(&self, title: &str, message: &str) {
        self.window
            .app_handle()
            .dialog()
            .message(message)
            .title(title)
            .kind(MessageDialogKind::Error)
            .blocking_show();
    }
}

/// Loads the main content off the event loop; probing and the terminal dialog both block.
pub(crate) fn spawn_main_content_load(app_handle: AppHandle) {
    tauri::async_runtime::spawn_blocking(move || {
        let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
            tracing::warn!("content load skipped: main window not found");
            return;
        };
        let state = app_handle.state::<ShellState>();
        let main_url = state.config.urls.main.clone();

        let outcome = load_main_content(&WindowContentSurface::new(window), &main_url);
        if outcome == LoadOutcome::Fallback {
            state.set_pending_load_error(json!({
                "message": "Failed to load application content.",
                "url": main_url,
            }));
            desktop_bridge_commands::deliver_pending_load_error(&app_handle);
        }
    });
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, net::TcpListener};

    use super::*;

    #[test]
    fn is_valid_url_accepts_allowed_schemes() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://localhost"));
        assert!(is_valid_url("file:///tmp/x.html"));
    }

    #[test]
    fn is_valid_url_rejects_empty_malformed_and_other_schemes() {
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("   "));
        assert!(!is_valid_url("ftp://x"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("https://"));
        assert_eq!(validate_url(""), Err(UrlRejection::Empty));
        assert_eq!(
            validate_url("ftp://x"),
            Err(UrlRejection::UnsupportedScheme("ftp".to_string()))
        );
    }

    #[derive(Default)]
    struct StubSurface {
        main_fails: bool,
        fallback_fails: bool,
        main_loads: RefCell<Vec<String>>,
        fallback_loads: RefCell<usize>,
        fatal_errors: RefCell<Vec<(String, String)>>,
    }

    impl ContentSurface for StubSurface {
        fn load_url(&self, url: &Url) -> Result<(), LoadError> {
            self.main_loads.borrow_mut().push(url.to_string());
            if self.main_fails {
                return Err(LoadError::Unreachable {
                    target: url.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            Ok(())
        }

        fn load_fallback(&self) -> Result<(), LoadError> {
            *self.fallback_loads.borrow_mut() += 1;
            if self.fallback_fails {
                return Err(LoadError::MissingAsset("index.html".to_string()));
            }
            Ok(())
        }

        fn show_fatal_error(&self, title: &str, message: &str) {
            self.fatal_errors
                .borrow_mut()
                .push((title.to_string(), message.to_string()));
        }
    }

    #[test]
    fn loads_main_url_without_touching_fallback() {
        let surface = StubSurface::default();
        let outcome = load_main_content(&surface, "https://example.com");
        assert_eq!(outcome, LoadOutcome::Main);
        assert_eq!(surface.main_loads.borrow().as_slice(), &["https://example.com/".to_string()]);
        assert_eq!(*surface.fallback_loads.borrow(), 0);
    }

    #[test]
    fn failing_main_url_falls_back_exactly_once() {
        let surface = StubSurface {
            main_fails: true,
            ..StubSurface::default()
        };
        let outcome = load_main_content(&surface, "https://unreachable.invalid");
        assert_eq!(outcome, LoadOutcome::Fallback);
        assert_eq!(*surface.fallback_loads.borrow(), 1);
        assert!(surface.fatal_errors.borrow().is_empty());
    }

    #[test]
    fn invalid_url_skips_main_load_and_falls_back() {
        let surface = StubSurface::default();
        let outcome = load_main_content(&surface, "ftp://files.example.com");
        assert_eq!(outcome, LoadOutcome::Fallback);
        assert!(surface.main_loads.borrow().is_empty());
        assert_eq!(*surface.fallback_loads.borrow(), 1);
    }

    #[test]
    fn failing_fallback_shows_fatal_error_once_with_url_and_reason() {
        let surface = StubSurface {
            main_fails: true,
            fallback_fails: true,
            ..StubSurface::default()
        };
        let outcome = load_main_content(&surface, "https://unreachable.invalid");

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(*surface.fallback_loads.borrow(), 1);
        let fatal_errors = surface.fatal_errors.borrow();
        assert_eq!(fatal_errors.len(), 1);
        let (title, message) = &fatal_errors[0];
        assert_eq!(title, FATAL_ERROR_TITLE);
        assert!(message.contains("https://unreachable.invalid"));
        assert!(message.contains("bundled page 'index.html' is missing"));
    }

    #[test]
    fn reachability_accepts_listening_port_and_rejects_closed_one() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let open = Url::parse(&format!("http://127.0.0.1:{port}/")).expect("url");
        assert!(check_reachable(&open, Duration::from_secs(1)).is_ok());

        drop(listener);
        assert!(matches!(
            check_reachable(&open, Duration::from_secs(1)),
            Err(LoadError::Unreachable { .. })
        ));
    }

    #[test]
    fn reachability_requires_local_files_to_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let page = dir.path().join("page.html");
        std::fs::write(&page, "<html></html>").expect("write page");

        let existing = Url::from_file_path(&page).expect("file url");
        let missing = Url::from_file_path(dir.path().join("missing.html")).expect("file url");

        assert!(check_reachable(&existing, Duration::from_secs(1)).is_ok());
        assert!(matches!(
            check_reachable(&missing, Duration::from_secs(1)),
            Err(LoadError::MissingFile(_))
        ));
    }
}
