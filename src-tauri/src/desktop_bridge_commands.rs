use std::path::PathBuf;

use serde_json::Value;
use tauri::{ipc::CapabilityBuilder, AppHandle, Manager, WebviewWindow};

use crate::{
    app_paths,
    channel_registry::{InvokeChannel, NotifyChannel, SendChannel},
    desktop_bridge::{
        BridgeHandler, BridgeHandlerError, ChannelBridge, InvokeFuture, NotificationSink,
    },
    external_url::{self, SystemOpener},
    file_dialogs, preload_script, window_actions, BridgeResult, ShellState, MAIN_WINDOW_LABEL,
    SECONDARY_WINDOW_LABEL_PREFIX,
};

const BRIDGE_PERMISSIONS: [&str; 5] = [
    "allow-bridge-send",
    "allow-bridge-invoke",
    "allow-bridge-subscribe",
    "allow-bridge-unsubscribe",
    "allow-bridge-open-external",
];

/// Directories content may ask for through `app:getPath`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NamedPath {
    UserData,
    AppData,
    Logs,
    Home,
    Temp,
    Downloads,
    Documents,
    Desktop,
}

impl NamedPath {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "userData" => Some(Self::UserData),
            "appData" => Some(Self::AppData),
            "logs" => Some(Self::Logs),
            "home" => Some(Self::Home),
            "temp" => Some(Self::Temp),
            "downloads" => Some(Self::Downloads),
            "documents" => Some(Self::Documents),
            "desktop" => Some(Self::Desktop),
            _ => None,
        }
    }
}

fn resolve_named_path(
    app_handle: &AppHandle,
    data: Option<Value>,
) -> Result<Value, BridgeHandlerError> {
    let name = data
        .as_ref()
        .and_then(Value::as_str)
        .ok_or_else(|| BridgeHandlerError::InvalidArguments("expected a path name".to_string()))?;
    let named = NamedPath::from_name(name).ok_or_else(|| {
        BridgeHandlerError::InvalidArguments(format!("unknown path name '{name}'"))
    })?;

    let config = app_handle.state::<ShellState>().config.clone();
    let resolver = app_handle.path();
    let path: Result<PathBuf, String> = match named {
        NamedPath::UserData => app_paths::user_data_dir(app_handle, &config),
        NamedPath::Logs => app_paths::logs_dir(app_handle, &config),
        NamedPath::AppData => resolver.data_dir().map_err(|error| error.to_string()),
        NamedPath::Home => resolver.home_dir().map_err(|error| error.to_string()),
        NamedPath::Temp => resolver.temp_dir().map_err(|error| error.to_string()),
        NamedPath::Downloads => resolver.download_dir().map_err(|error| error.to_string()),
        NamedPath::Documents => resolver.document_dir().map_err(|error| error.to_string()),
        NamedPath::Desktop => resolver.desktop_dir().map_err(|error| error.to_string()),
    };

    path.map(|path| Value::String(path.to_string_lossy().into_owned()))
        .map_err(BridgeHandlerError::Platform)
}

/// Channel handlers acting on the window the message came from.
pub(crate) struct WindowBridgeHandler {
    window: WebviewWindow,
}

impl WindowBridgeHandler {
    pub(crate) fn new(window: WebviewWindow) -> Self {
        Self { window }
    }
}

impl BridgeHandler for WindowBridgeHandler {
    fn handle_send(
        &self,
        channel: SendChannel,
        _data: Option<Value>,
    ) -> Result<(), BridgeHandlerError> {
        let result = match channel {
            SendChannel::Minimize => window_actions::minimize_window(&self.window),
            SendChannel::Maximize => window_actions::toggle_maximize_window(&self.window),
            SendChannel::Close => window_actions::close_window(&self.window),
            SendChannel::Reload => window_actions::reload_window(&self.window),
        };
        result.map_err(BridgeHandlerError::Platform)
    }

    fn handle_invoke(&self, channel: InvokeChannel, data: Option<Value>) -> InvokeFuture {
        let app_handle = self.window.app_handle().clone();
        match channel {
            InvokeChannel::GetVersion => {
                let version = app_handle.state::<ShellState>().config.version.clone();
                Box::pin(async move { Ok(Value::String(version)) })
            }
            InvokeChannel::GetPath => {
                Box::pin(async move { resolve_named_path(&app_handle, data) })
            }
            InvokeChannel::OpenDialog => Box::pin(file_dialogs::open_file_dialog(app_handle, data)),
            InvokeChannel::SaveDialog => Box::pin(file_dialogs::save_file_dialog(app_handle, data)),
        }
    }
}

/// Delivers notifications by evaluating the preload dispatch hook in the target window.
pub(crate) struct WindowNotificationSink<'a> {
    app_handle: &'a AppHandle,
}

impl<'a> WindowNotificationSink<'a> {
    pub(crate) fn new(app_handle: &'a AppHandle) -> Self {
        Self { app_handle }
    }
}

impl NotificationSink for WindowNotificationSink<'_> {
    fn deliver(
        &self,
        surface: &str,
        channel: NotifyChannel,
        payload: &Value,
    ) -> Result<(), String> {
        let window = self
            .app_handle
            .get_webview_window(surface)
            .ok_or_else(|| format!("window '{surface}' not found"))?;
        let script = preload_script::notification_dispatch_script(channel.as_str(), payload)
            .map_err(|error| error.to_string())?;
        window.eval(&script).map_err(|error| error.to_string())
    }
}

pub(crate) fn notify_content<T>(app_handle: &AppHandle, channel: &str, payload: &T) -> usize
where
    T: serde::Serialize + ?Sized,
{
    let state = app_handle.state::<ShellState>();
    state
        .notifications
        .notify(&WindowNotificationSink::new(app_handle), channel, payload)
}

/// Hands a recorded content load failure to the main window once it listens on `app:error`.
pub(crate) fn deliver_pending_load_error(app_handle: &AppHandle) {
    let state = app_handle.state::<ShellState>();
    let listening = state
        .notifications
        .subscribers(NotifyChannel::Error)
        .iter()
        .any(|surface| surface == MAIN_WINDOW_LABEL);
    if !listening {
        return;
    }

    if let Some(payload) = state.take_pending_load_error() {
        let delivered = notify_content(app_handle, NotifyChannel::Error.as_str(), &payload);
        tracing::info!(delivered, "reported content load failure to page");
    }
}

/// Lets pages served from the configured remote origin call the bridge commands. Bundled pages
/// are covered by the static capability file.
pub(crate) fn grant_remote_bridge_access(app_handle: &AppHandle) -> Result<(), String> {
    let state = app_handle.state::<ShellState>();
    let Some(origin) = state.navigation_guard.main_origin().filter(|origin| origin.is_http())
    else {
        return Ok(());
    };

    let capability = CapabilityBuilder::new("main-origin-bridge")
        .remote(format!("{origin}/*"))
        .window(MAIN_WINDOW_LABEL)
        .window(format!("{SECONDARY_WINDOW_LABEL_PREFIX}*"));
    let capability = BRIDGE_PERMISSIONS
        .iter()
        .fold(capability, |capability, permission| capability.permission(*permission));

    app_handle
        .add_capability(capability)
        .map_err(|error| format!("Failed to grant bridge access to {origin}: {error}"))?;
    tracing::info!(origin = %origin, "granted bridge access to main origin");
    Ok(())
}

#[tauri::command]
pub(crate) fn bridge_send(window: WebviewWindow, channel: String, data: Option<Value>) {
    ChannelBridge::new(WindowBridgeHandler::new(window)).send(&channel, data.as_ref());
}

#[tauri::command]
pub(crate) async fn bridge_invoke(
    window: WebviewWindow,
    channel: String,
    data: Option<Value>,
) -> Option<Value> {
    ChannelBridge::new(WindowBridgeHandler::new(window))
        .invoke(&channel, data.as_ref())
        .await
}

#[tauri::command]
pub(crate) fn bridge_subscribe(
    app_handle: AppHandle,
    window: WebviewWindow,
    channel: String,
) -> bool {
    let state = app_handle.state::<ShellState>();
    let subscribed = state.notifications.subscribe(window.label(), &channel);
    if subscribed && channel == NotifyChannel::Error.as_str() {
        deliver_pending_load_error(&app_handle);
    }
    subscribed
}

#[tauri::command]
pub(crate) fn bridge_unsubscribe(
    app_handle: AppHandle,
    window: WebviewWindow,
    channel: String,
) -> bool {
    let state = app_handle.state::<ShellState>();
    state.notifications.unsubscribe(window.label(), &channel)
}

#[tauri::command]
pub(crate) fn bridge_open_external(app_handle: AppHandle, url: String) -> BridgeResult {
    external_url::open_external_url(&SystemOpener::new(app_handle), &url)
}
