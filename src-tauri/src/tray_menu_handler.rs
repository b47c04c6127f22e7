use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use crate::{app_config::AppConfig, main_window, tray_actions, ShellState};

fn about_detail(config: &AppConfig) -> String {
    format!(
        "Version {}\n\n{}\n\n{}",
        config.version,
        config.description,
        config.copyright_notice()
    )
}

fn show_about_dialog(app_handle: &AppHandle) {
    let config = app_handle.state::<ShellState>().config.clone();
    app_handle
        .dialog()
        .message(format!("{}\n\n{}", config.product_name, about_detail(&config)))
        .title(format!("About {}", config.product_name))
        .kind(MessageDialogKind::Info)
        .show(|_| {});
}

pub fn handle_tray_menu_event(app_handle: &AppHandle, menu_id: &str) {
    match tray_actions::action_from_menu_id(menu_id) {
        Some(tray_actions::TrayMenuAction::OpenWindow) => {
            main_window::ensure_main_window(app_handle)
        }
        Some(tray_actions::TrayMenuAction::About) => show_about_dialog(app_handle),
        Some(tray_actions::TrayMenuAction::Quit) => {
            let state = app_handle.state::<ShellState>();
            state.lifecycle.begin_shutdown();
            tracing::info!("tray quit requested, exiting");
            app_handle.exit(0);
        }
        None => {}
    }
}
