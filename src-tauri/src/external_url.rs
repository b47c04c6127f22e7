//! Hand-off of links to the system's default browser.

use tauri::AppHandle;
use tauri_plugin_opener::OpenerExt;
use url::Url;

use crate::{navigation_guard::NavigationGuard, BridgeResult};

pub(crate) trait ExternalOpener {
    fn open_external(&self, url: &Url) -> Result<(), String>;
}

/// Opens URLs through the opener plugin, which defers to the OS handler.
pub(crate) struct SystemOpener {
    app_handle: AppHandle,
}

impl SystemOpener {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl ExternalOpener for SystemOpener {
    fn open_external(&self, url: &Url) -> Result<(), String> {
        self.app_handle
            .opener()
            .open_url(url.as_str(), None::<String>)
            .map_err(|error| format!("external URL open failed: {error}"))
    }
}

pub(crate) fn parse_openable_url(raw_url: &str) -> Result<Url, String> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err("Missing external URL.".to_string());
    }

    let parsed = Url::parse(trimmed).map_err(|error| format!("Invalid URL: {error}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(format!(
            "Unsupported URL scheme '{scheme}', only http/https are allowed."
        )),
    }
}

pub(crate) fn open_external_url(opener: &dyn ExternalOpener, raw_url: &str) -> BridgeResult {
    let parsed = match parse_openable_url(raw_url) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!(url = raw_url, %error, "refused to open external url");
            return BridgeResult::failed(error);
        }
    };

    match opener.open_external(&parsed) {
        Ok(()) => {
            tracing::info!(url = %parsed, "opened external url");
            BridgeResult::success()
        }
        Err(error) => {
            tracing::error!(url = %parsed, %error, "failed to open external url");
            BridgeResult::failed(error)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NewWindowOutcome {
    Denied,
    DeniedAndOpenedExternally,
}

/// Content never gets a new window. Web links are passed to the system browser instead.
pub(crate) fn handle_new_window_request(
    guard: &NavigationGuard,
    opener: &dyn ExternalOpener,
    requested: &Url,
) -> NewWindowOutcome {
    match guard.deny_new_window(requested) {
        Some(target) if open_external_url(opener, target.as_str()).ok => {
            NewWindowOutcome::DeniedAndOpenedExternally
        }
        _ => NewWindowOutcome::Denied,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct StubOpener {
        opened: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ExternalOpener for StubOpener {
        fn open_external(&self, url: &Url) -> Result<(), String> {
            if self.fail {
                return Err("no handler registered".to_string());
            }
            self.opened.lock().expect("lock").push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn parse_openable_url_accepts_web_links_only() {
        assert!(parse_openable_url(" https://example.com/docs ").is_ok());
        assert!(parse_openable_url("http://localhost:3000").is_ok());
        assert!(parse_openable_url("").is_err());
        assert!(parse_openable_url("file:///etc/hosts").is_err());
        assert!(parse_openable_url("javascript:alert(1)").is_err());
    }

    #[test]
    fn open_external_url_hands_url_to_opener() {
        let opener = StubOpener::default();
        let result = open_external_url(&opener, "https://example.com/help");
        assert!(result.ok);
        assert_eq!(
            opener.opened.lock().expect("lock").as_slice(),
            &["https://example.com/help".to_string()]
        );
    }

    #[test]
    fn open_external_url_does_not_call_opener_for_rejected_url() {
        let opener = StubOpener::default();
        let result = open_external_url(&opener, "smb://share/file");
        assert!(!result.ok);
        assert!(result.reason.is_some());
        assert!(opener.opened.lock().expect("lock").is_empty());
    }

    #[test]
    fn open_external_url_reports_opener_failure() {
        let opener = StubOpener {
            fail: true,
            ..StubOpener::default()
        };
        let result = open_external_url(&opener, "https://example.com");
        assert!(!result.ok);
        assert_eq!(result.reason.as_deref(), Some("no handler registered"));
    }

    #[test]
    fn new_window_requests_are_denied_and_web_links_opened_once() {
        let guard = NavigationGuard::new("https://example.com");
        let opener = StubOpener::default();
        let requested = Url::parse("https://x.example/page").expect("valid url");

        assert_eq!(
            handle_new_window_request(&guard, &opener, &requested),
            NewWindowOutcome::DeniedAndOpenedExternally
        );
        assert_eq!(
            opener.opened.lock().expect("lock").as_slice(),
            &["https://x.example/page".to_string()]
        );
    }

    #[test]
    fn new_window_requests_for_other_schemes_never_reach_the_opener() {
        let guard = NavigationGuard::new("https://example.com");
        let opener = StubOpener::default();

        for raw in ["mailto:someone@example.com", "javascript:alert(1)"] {
            let requested = Url::parse(raw).expect("valid url");
            assert_eq!(
                handle_new_window_request(&guard, &opener, &requested),
                NewWindowOutcome::Denied
            );
        }
        assert!(opener.opened.lock().expect("lock").is_empty());
    }

    #[test]
    fn new_window_request_stays_denied_when_opener_fails() {
        let guard = NavigationGuard::new("https://example.com");
        let opener = StubOpener {
            fail: true,
            ..StubOpener::default()
        };
        let requested = Url::parse("https://example.com/popup").expect("valid url");
        assert_eq!(
            handle_new_window_request(&guard, &opener, &requested),
            NewWindowOutcome::Denied
        );
    }
}
