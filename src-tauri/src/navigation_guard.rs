//! Same-origin navigation policy for content-hosting windows.
//!
//! The guard is built once from the configured main URL and consulted for every navigation and
//! every `window.open` request a page makes. Each check is independent; the guard holds no state
//! beyond the origins it was built with. Loads the shell starts itself are tracked separately
//! in [`NavigationPermits`] so their redirects are not mistaken for content navigation.

use std::{collections::HashMap, fmt, sync::Mutex};

use url::Url;

/// Browser-style origin: scheme, host and port. Opaque origins (`file:`, `data:` and friends)
/// serialize as `"null"`, the same way page scripts observe them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Origin(String);

impl Origin {
    pub(crate) fn of(url: &Url) -> Self {
        Self(url.origin().ascii_serialization())
    }

    pub(crate) fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw.trim()).map(|url| Self::of(&url))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_http(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NavigationDecision {
    Allow,
    Deny(NavigationDenial),
}

impl NavigationDecision {
    pub(crate) fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NavigationDenial {
    UnparsableDestination { url: String, reason: String },
    UnparsableMainOrigin { reason: String },
    CrossOrigin { from: Origin, to: Origin },
}

#[derive(Debug, Clone)]
pub(crate) struct NavigationGuard {
    main_origin: Result<Origin, String>,
    trusted_origins: Vec<Origin>,
}

impl NavigationGuard {
    pub(crate) fn new(main_url: &str) -> Self {
        Self {
            main_origin: Origin::parse(main_url).map_err(|error| error.to_string()),
            trusted_origins: Vec::new(),
        }
    }

    /// Adds an origin that may be navigated to besides the main one, used for the pages the
    /// shell bundles itself.
    pub(crate) fn with_trusted_origin(mut self, raw: &str) -> Self {
        match Origin::parse(raw) {
            Ok(origin) => self.trusted_origins.push(origin),
            Err(error) => {
                tracing::warn!(origin = raw, %error, "ignoring unparsable trusted origin")
            }
        }
        self
    }

    pub(crate) fn main_origin(&self) -> Option<&Origin> {
        self.main_origin.as_ref().ok()
    }

    pub(crate) fn trusted_origins(&self) -> impl Iterator<Item = &Origin> {
        self.main_origin().into_iter().chain(self.trusted_origins.iter())
    }

    pub(crate) fn check_navigation(&self, destination: &str) -> NavigationDecision {
        match Url::parse(destination) {
            Ok(url) => self.check_navigation_url(&url),
            Err(error) => {
                let denial = NavigationDenial::UnparsableDestination {
                    url: destination.to_string(),
                    reason: error.to_string(),
                };
                log_denial(&denial);
                NavigationDecision::Deny(denial)
            }
        }
    }

    pub(crate) fn check_navigation_url(&self, destination: &Url) -> NavigationDecision {
        let target = Origin::of(destination);
        if self.trusted_origins.contains(&target) {
            return NavigationDecision::Allow;
        }

        let main_origin = match &self.main_origin {
            Ok(origin) => origin,
            Err(reason) => {
                let denial = NavigationDenial::UnparsableMainOrigin {
                    reason: reason.clone(),
                };
                log_denial(&denial);
                return NavigationDecision::Deny(denial);
            }
        };

        if &target == main_origin {
            return NavigationDecision::Allow;
        }

        let denial = NavigationDenial::CrossOrigin {
            from: main_origin.clone(),
            to: target,
        };
        log_denial(&denial);
        NavigationDecision::Deny(denial)
    }

    /// New top-level windows are never created from content. Returns the URL to hand to the
    /// system browser instead, when it is a web link.
    pub(crate) fn deny_new_window(&self, requested: &Url) -> Option<Url> {
        tracing::warn!(url = %requested, "blocked window.open attempt");
        match requested.scheme() {
            "http" | "https" => Some(requested.clone()),
            _ => None,
        }
    }
}

/// Shell-initiated loads in flight, one per window. While a window holds a permit every
/// navigation it reports belongs to that load's redirect chain.
#[derive(Debug, Default)]
pub(crate) struct NavigationPermits {
    in_flight: Mutex<HashMap<String, Url>>,
}

impl NavigationPermits {
    pub(crate) fn grant(&self, surface: &str, target: &Url) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.insert(surface.to_string(), target.clone());
        }
    }

    pub(crate) fn revoke(&self, surface: &str) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(surface);
        }
    }

    pub(crate) fn is_loading(&self, surface: &str) -> bool {
        self.in_flight
            .lock()
            .is_ok_and(|in_flight| in_flight.contains_key(surface))
    }

    /// Ends the permit once the load it covers has finished. A bundled page finishing while a
    /// remote load is pending is the loading page, not the end of that load.
    pub(crate) fn release_on_finished(
        &self,
        surface: &str,
        finished: &Url,
        bundled_origins: &[&str],
    ) {
        let Ok(mut in_flight) = self.in_flight.lock() else {
            return;
        };
        let Some(target) = in_flight.get(surface) else {
            return;
        };

        let is_bundled = |url: &Url| bundled_origins.contains(&Origin::of(url).as_str());
        if is_bundled(finished) && !is_bundled(target) {
            return;
        }
        in_flight.remove(surface);
    }
}

/// Decides one navigation reported by a window: redirects of a load the shell started pass,
/// anything else goes through the guard.
pub(crate) fn allow_navigation(
    guard: &NavigationGuard,
    permits: &NavigationPermits,
    surface: &str,
    destination: &Url,
) -> bool {
    if permits.is_loading(surface) {
        tracing::debug!(surface, url = %destination, "navigation part of shell load");
        return true;
    }
    guard.check_navigation(destination.as_str()).is_allowed()
}

fn log_denial(denial: &NavigationDenial) {
    match denial {
        NavigationDenial::UnparsableDestination { url, reason } => {
            tracing::error!(url = %url, error = %reason, "error parsing navigation url");
        }
        NavigationDenial::UnparsableMainOrigin { reason } => {
            tracing::error!(error = %reason, "main url has no usable origin, navigation blocked");
        }
        NavigationDenial::CrossOrigin { from, to } => {
            tracing::warn!(from = %from, to = %to, "blocked navigation to different origin");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_same_origin_paths() {
        let guard = NavigationGuard::new("https://example.com");
        assert_eq!(
            guard.check_navigation("https://example.com/path"),
            NavigationDecision::Allow
        );
        assert_eq!(
            guard.check_navigation("https://example.com:443/other?q=1#top"),
            NavigationDecision::Allow
        );
    }

    #[test]
    fn denies_other_origin_and_records_both() {
        let guard = NavigationGuard::new("https://example.com");
        let decision = guard.check_navigation("https://evil.com");
        assert_eq!(
            decision,
            NavigationDecision::Deny(NavigationDenial::CrossOrigin {
                from: Origin("https://example.com".to_string()),
                to: Origin("https://evil.com".to_string()),
            })
        );
    }

    #[test]
    fn scheme_and_port_are_part_of_the_origin() {
        let guard = NavigationGuard::new("https://example.com");
        assert!(!guard.check_navigation("http://example.com/").is_allowed());
        assert!(!guard.check_navigation("https://example.com:8443/").is_allowed());
        assert!(!guard.check_navigation("https://sub.example.com/").is_allowed());
    }

    #[test]
    fn unparsable_destination_is_denied() {
        let guard = NavigationGuard::new("https://example.com");
        assert!(matches!(
            guard.check_navigation("not a url"),
            NavigationDecision::Deny(NavigationDenial::UnparsableDestination { .. })
        ));
    }

    #[test]
    fn unparsable_main_url_denies_everything() {
        let guard = NavigationGuard::new("::::");
        assert!(guard.main_origin().is_none());
        assert!(matches!(
            guard.check_navigation("https://example.com"),
            NavigationDecision::Deny(NavigationDenial::UnparsableMainOrigin { .. })
        ));
    }

    #[test]
    fn trusted_origins_survive_an_unparsable_main_url() {
        let guard = NavigationGuard::new("").with_trusted_origin("tauri://localhost");
        assert!(guard.check_navigation("tauri://localhost/index.html").is_allowed());
        assert!(!guard.check_navigation("https://example.com").is_allowed());
    }

    #[test]
    fn trusted_origin_is_allowed_alongside_main() {
        let guard =
            NavigationGuard::new("https://example.com").with_trusted_origin("tauri://localhost");
        assert!(guard.check_navigation("tauri://localhost/index.html").is_allowed());
        assert!(!guard.check_navigation("https://evil.com").is_allowed());
        assert_eq!(guard.trusted_origins().count(), 2);
    }

    #[test]
    fn file_origins_compare_as_null() {
        let guard = NavigationGuard::new("file:///opt/app/index.html");
        assert_eq!(guard.main_origin().map(Origin::as_str), Some("null"));
        assert!(guard.check_navigation("file:///opt/app/other.html").is_allowed());
        assert!(!guard.check_navigation("https://example.com").is_allowed());
    }

    #[test]
    fn new_windows_are_always_denied_but_web_links_are_handed_off() {
        let guard = NavigationGuard::new("https://example.com");
        let same_origin = Url::parse("https://example.com/popup").expect("valid url");
        let mail = Url::parse("mailto:someone@example.com").expect("valid url");

        assert_eq!(guard.deny_new_window(&same_origin), Some(same_origin.clone()));
        assert_eq!(guard.deny_new_window(&mail), None);
    }

    const BUNDLED: [&str; 1] = ["tauri://localhost"];

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[test]
    fn shell_load_may_follow_redirects_but_content_may_not() {
        let guard =
            NavigationGuard::new("https://youtube.com").with_trusted_origin("tauri://localhost");
        let permits = NavigationPermits::default();
        let redirect = url("https://www.youtube.com/");

        assert!(!allow_navigation(&guard, &permits, "main", &redirect));

        permits.grant("main", &url("https://youtube.com"));
        assert!(allow_navigation(&guard, &permits, "main", &url("https://youtube.com")));
        assert!(allow_navigation(&guard, &permits, "main", &redirect));
        assert!(!allow_navigation(&guard, &permits, "secondary-1", &redirect));

        permits.release_on_finished("main", &redirect, &BUNDLED);
        assert!(!permits.is_loading("main"));
        assert!(!allow_navigation(&guard, &permits, "main", &redirect));
    }

    #[test]
    fn loading_page_finishing_keeps_the_remote_permit() {
        let permits = NavigationPermits::default();
        permits.grant("main", &url("https://example.com"));

        permits.release_on_finished("main", &url("tauri://localhost/loading.html"), &BUNDLED);
        assert!(permits.is_loading("main"));

        permits.release_on_finished("main", &url("https://example.com/home"), &BUNDLED);
        assert!(!permits.is_loading("main"));
    }

    #[test]
    fn revoked_permit_no_longer_covers_navigation() {
        let guard = NavigationGuard::new("https://example.com");
        let permits = NavigationPermits::default();
        permits.grant("main", &url("https://example.com"));
        permits.revoke("main");
        assert!(!allow_navigation(&guard, &permits, "main", &url("https://evil.com")));
    }
}
