#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_config;
mod app_constants;
mod app_menu;
mod app_paths;
mod app_runtime;
mod app_types;
mod channel_registry;
mod content_loader;
mod desktop_bridge;
mod desktop_bridge_commands;
mod exit_events;
mod external_url;
mod file_dialogs;
mod logging;
mod main_window;
mod navigation_guard;
mod platform;
mod preload_script;
mod tray_actions;
mod tray_menu_handler;
mod tray_setup;
mod window_actions;

pub(crate) use app_constants::*;
pub(crate) use app_types::{BridgeResult, ShellState};

fn main() {
    app_runtime::run();
}
