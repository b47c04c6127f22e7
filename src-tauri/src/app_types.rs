use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use serde::Serialize;
use serde_json::Value;

use crate::{
    app_config::AppConfig,
    desktop_bridge::NotificationHub,
    navigation_guard::{NavigationGuard, NavigationPermits},
    BUNDLED_APP_ORIGINS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppLifecycle {
    Running,
    ShuttingDown,
}

/// Application lifecycle, moving from `Running` to `ShuttingDown` exactly once.
#[derive(Debug, Default)]
pub(crate) struct LifecycleState {
    shutting_down: AtomicBool,
}

impl LifecycleState {
    pub(crate) fn current(&self) -> AppLifecycle {
        if self.shutting_down.load(Ordering::Acquire) {
            AppLifecycle::ShuttingDown
        } else {
            AppLifecycle::Running
        }
    }

    /// Returns `true` only for the call that performed the transition.
    pub(crate) fn begin_shutdown(&self) -> bool {
        self.shutting_down
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Shared context every window, tray and bridge handler reads from.
#[derive(Debug)]
pub(crate) struct ShellState {
    pub(crate) config: Arc<AppConfig>,
    pub(crate) navigation_guard: Arc<NavigationGuard>,
    pub(crate) navigation_permits: Arc<NavigationPermits>,
    pub(crate) lifecycle: LifecycleState,
    pub(crate) notifications: NotificationHub,
    pub(crate) pending_load_error: Mutex<Option<Value>>,
    main_window_revealed: AtomicBool,
    secondary_window_counter: AtomicUsize,
}

impl ShellState {
    pub(crate) fn new(config: Arc<AppConfig>) -> Self {
        let navigation_guard = BUNDLED_APP_ORIGINS.iter().fold(
            NavigationGuard::new(&config.urls.main),
            |guard, origin| guard.with_trusted_origin(origin),
        );

        Self {
            config,
            navigation_guard: Arc::new(navigation_guard),
            navigation_permits: Arc::new(NavigationPermits::default()),
            lifecycle: LifecycleState::default(),
            notifications: NotificationHub::default(),
            pending_load_error: Mutex::new(None),
            main_window_revealed: AtomicBool::new(false),
            secondary_window_counter: AtomicUsize::new(0),
        }
    }

    /// True the first time it is called; the main window is revealed once, on its first load.
    pub(crate) fn claim_main_window_reveal(&self) -> bool {
        self.main_window_revealed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn reset_main_window_reveal(&self) {
        self.main_window_revealed.store(false, Ordering::Release);
    }

    pub(crate) fn next_secondary_window_index(&self) -> usize {
        self.secondary_window_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn set_pending_load_error(&self, payload: Value) {
        if let Ok(mut guard) = self.pending_load_error.lock() {
            *guard = Some(payload);
        }
    }

    pub(crate) fn take_pending_load_error(&self) -> Option<Value> {
        self.pending_load_error
            .lock()
            .ok()
            .and_then(|mut guard| guard.take())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BridgeResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
}

impl BridgeResult {
    pub(crate) fn success() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AppInfo {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) description: String,
    pub(crate) author: String,
    pub(crate) website: Option<String>,
}

impl AppInfo {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self {
            name: config.product_name.clone(),
            version: config.version.clone(),
            description: config.description.clone(),
            author: config.author.name.clone(),
            website: config.author.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::parse_app_config;

    fn shell_state(main_url: &str) -> ShellState {
        let raw = serde_json::json!({
            "name": "demo",
            "productName": "Demo App",
            "description": "demo",
            "version": "0.1.0",
            "appId": "com.example.demo",
            "author": { "name": "Example", "url": "https://example.com" },
            "window": { "width": 1024, "height": 768, "minWidth": 800, "minHeight": 600 },
            "urls": { "main": main_url }
        });
        let config = parse_app_config(&raw.to_string()).expect("config should parse");
        ShellState::new(Arc::new(config))
    }

    #[test]
    fn lifecycle_transitions_to_shutting_down_once() {
        let lifecycle = LifecycleState::default();
        assert_eq!(lifecycle.current(), AppLifecycle::Running);
        assert!(lifecycle.begin_shutdown());
        assert!(!lifecycle.begin_shutdown());
        assert_eq!(lifecycle.current(), AppLifecycle::ShuttingDown);
    }

    #[test]
    fn shell_state_guard_trusts_main_and_bundled_origins() {
        let state = shell_state("https://example.com/app");
        let guard = &state.navigation_guard;
        assert!(guard.check_navigation("https://example.com/other").is_allowed());
        assert!(guard.check_navigation("tauri://localhost/index.html").is_allowed());
        assert!(guard.check_navigation("http://tauri.localhost/index.html").is_allowed());
        assert!(!guard.check_navigation("https://evil.com").is_allowed());
    }

    #[test]
    fn main_window_reveal_is_claimed_once_until_reset() {
        let state = shell_state("https://example.com");
        assert!(state.claim_main_window_reveal());
        assert!(!state.claim_main_window_reveal());
        state.reset_main_window_reveal();
        assert!(state.claim_main_window_reveal());
    }

    #[test]
    fn secondary_window_indices_are_unique_and_start_at_one() {
        let state = shell_state("https://example.com");
        assert_eq!(state.next_secondary_window_index(), 1);
        assert_eq!(state.next_secondary_window_index(), 2);
    }

    #[test]
    fn pending_load_error_is_taken_once() {
        let state = shell_state("https://example.com");
        state.set_pending_load_error(serde_json::json!({ "url": "https://example.com" }));
        assert!(state.take_pending_load_error().is_some());
        assert!(state.take_pending_load_error().is_none());
    }

    #[test]
    fn app_info_uses_display_name_and_author() {
        let state = shell_state("https://example.com");
        let info = AppInfo::from_config(&state.config);
        assert_eq!(info.name, "Demo App");
        assert_eq!(info.author, "Example");
        assert_eq!(info.website.as_deref(), Some("https://example.com"));
    }
}
