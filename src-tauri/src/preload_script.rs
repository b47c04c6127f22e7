use serde::Serialize;

use crate::{
    app_config::AppConfig,
    app_types::AppInfo,
    channel_registry::{InvokeChannel, NotifyChannel, SendChannel},
    navigation_guard::NavigationGuard,
    platform::Platform,
};

const PRELOAD_TEMPLATE: &str = include_str!("../assets/preload.js");
const CONTEXT_PLACEHOLDER: &str = "__APP_SHELL_CONTEXT__";

/// Global the shell evaluates to hand notifications to the page's listeners.
pub(crate) const DISPATCH_HOOK: &str = "__APP_SHELL_DISPATCH__";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreloadContext<'a> {
    app_info: AppInfo,
    platform: &'static str,
    send_channels: Vec<&'static str>,
    invoke_channels: Vec<&'static str>,
    notify_channels: Vec<&'static str>,
    trusted_origins: Vec<&'a str>,
    dispatch_hook: &'static str,
}

/// Renders the script injected ahead of page scripts in every content window. App info and the
/// channel lists are baked in, so the synchronous getters need no round trip.
pub(crate) fn render_preload_script(
    config: &AppConfig,
    guard: &NavigationGuard,
    platform: Platform,
) -> Result<String, serde_json::Error> {
    let context = PreloadContext {
        app_info: AppInfo::from_config(config),
        platform: platform.content_name(),
        send_channels: SendChannel::ALL.iter().map(|c| c.as_str()).collect(),
        invoke_channels: InvokeChannel::ALL.iter().map(|c| c.as_str()).collect(),
        notify_channels: NotifyChannel::ALL.iter().map(|c| c.as_str()).collect(),
        trusted_origins: guard.trusted_origins().map(|origin| origin.as_str()).collect(),
        dispatch_hook: DISPATCH_HOOK,
    };
    let context = serde_json::to_string(&context)?;
    Ok(PRELOAD_TEMPLATE.replace(CONTEXT_PLACEHOLDER, &context))
}

/// Script delivering one notification payload to a page's listeners.
pub(crate) fn notification_dispatch_script(
    channel: &str,
    payload: &serde_json::Value,
) -> Result<String, serde_json::Error> {
    let channel = serde_json::to_string(channel)?;
    let payload = serde_json::to_string(payload)?;
    Ok(format!(
        "typeof window.{DISPATCH_HOOK} === 'function' && window.{DISPATCH_HOOK}({channel}, {payload});"
    ))
}
