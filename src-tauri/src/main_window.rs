use std::path::PathBuf;

use tauri::{
    webview::NewWindowResponse, window::Color, AppHandle, Manager, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder, Wry,
};
use url::Url;

use crate::{
    content_loader,
    external_url::{self, SystemOpener},
    navigation_guard::{self, Origin},
    platform::Platform,
    preload_script, window_actions, ShellState, BUNDLED_APP_ORIGINS, LOADING_PAGE,
    MAIN_WINDOW_LABEL, SECONDARY_WINDOW_LABEL_PREFIX, SECONDARY_WINDOW_OFFSET,
};

const WINDOW_BACKGROUND: Color = Color(0x1e, 0x1e, 0x1e, 0xff);

/// Common builder for every content window: branding, bounds, the preload bridge and the
/// navigation guard hooks. Windows start hidden.
fn content_window_builder<'a>(
    app_handle: &'a AppHandle,
    label: &str,
    url: WebviewUrl,
) -> Result<WebviewWindowBuilder<'a, Wry, AppHandle>, String> {
    let state = app_handle.state::<ShellState>();
    let config = state.config.clone();
    let preload = preload_script::render_preload_script(
        &config,
        &state.navigation_guard,
        Platform::current(),
    )
    .map_err(|error| format!("Failed to render preload script: {error}"))?;

    let guard = state.navigation_guard.clone();
    let permits = state.navigation_permits.clone();
    let window_open_guard = state.navigation_guard.clone();
    let opener_app_handle = app_handle.clone();
    let surface = label.to_string();

    Ok(WebviewWindowBuilder::new(app_handle, label, url)
        .title(&config.product_name)
        .min_inner_size(config.window.min_width, config.window.min_height)
        .background_color(WINDOW_BACKGROUND)
        .visible(false)
        .initialization_script(&preload)
        .on_navigation(move |url| {
            navigation_guard::allow_navigation(&guard, &permits, &surface, url)
        })
        .on_new_window(move |url, _features| {
            let opener = SystemOpener::new(opener_app_handle.clone());
            external_url::handle_new_window_request(&window_open_guard, &opener, &url);
            NewWindowResponse::Deny
        }))
}

pub(crate) fn create_main_window(app_handle: &AppHandle) -> Result<WebviewWindow, String> {
    let config = app_handle.state::<ShellState>().config.clone();
    content_window_builder(app_handle, MAIN_WINDOW_LABEL, WebviewUrl::App(LOADING_PAGE.into()))?
        .inner_size(config.window.width, config.window.height)
        .center()
        .build()
        .map_err(|error| format!("Failed to create main window: {error}"))
}

/// Recreates the main window when the app is still resident without one, otherwise shows it.
pub(crate) fn ensure_main_window(app_handle: &AppHandle) {
    if app_handle.get_webview_window(MAIN_WINDOW_LABEL).is_some() {
        window_actions::show_main_window(app_handle);
        return;
    }

    app_handle.state::<ShellState>().reset_main_window_reveal();
    match create_main_window(app_handle) {
        Ok(_) => content_loader::spawn_main_content_load(app_handle.clone()),
        Err(error) => tracing::error!(%error, "failed to recreate main window"),
    }
}

/// Bundled pages must be reopened through the app protocol rather than as external URLs.
fn webview_url_for(url: Url) -> WebviewUrl {
    let origin = Origin::of(&url);
    if BUNDLED_APP_ORIGINS.contains(&origin.as_str()) {
        return WebviewUrl::App(PathBuf::from(url.path().trim_start_matches('/')));
    }
    WebviewUrl::External(url)
}

/// Opens another content window on the main window's current page, offset from it.
pub(crate) fn create_secondary_window(app_handle: &AppHandle) -> Result<WebviewWindow, String> {
    let source = app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| "No window available to clone".to_string())?;

    let url = source
        .url()
        .map_err(|error| format!("Failed to read current url: {error}"))?;
    let scale_factor = source
        .scale_factor()
        .map_err(|error| format!("Failed to read scale factor: {error}"))?;
    let size = source
        .inner_size()
        .map_err(|error| format!("Failed to read window size: {error}"))?
        .to_logical::<f64>(scale_factor);
    let position = source
        .outer_position()
        .map_err(|error| format!("Failed to read window position: {error}"))?
        .to_logical::<f64>(scale_factor);

    let index = app_handle
        .state::<ShellState>()
        .next_secondary_window_index();
    let label = format!("{SECONDARY_WINDOW_LABEL_PREFIX}{index}");

    let permits = app_handle.state::<ShellState>().navigation_permits.clone();
    let webview_url = webview_url_for(url);
    if let WebviewUrl::External(target) = &webview_url {
        permits.grant(&label, target);
    }

    let window = content_window_builder(app_handle, &label, webview_url)?
        .inner_size(size.width, size.height)
        .position(
            position.x + SECONDARY_WINDOW_OFFSET,
            position.y + SECONDARY_WINDOW_OFFSET,
        )
        .visible(true)
        .build()
        .map_err(|error| {
            permits.revoke(&label);
            format!("Failed to create window '{label}': {error}")
        })?;

    tracing::info!(label = %label, "opened secondary window");
    Ok(window)
}
