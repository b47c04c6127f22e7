use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager,
};

use crate::{tray_actions, tray_menu_handler, window_actions, ShellState, TRAY_ID};

pub fn setup_tray(app_handle: &AppHandle) -> Result<(), String> {
    let config = app_handle.state::<ShellState>().config.clone();

    let open_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_OPEN_WINDOW,
        format!("Open {}", config.product_name),
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray open menu item: {error}"))?;
    let about_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_ABOUT,
        "About",
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray about menu item: {error}"))?;
    let quit_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_QUIT,
        "Quit",
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray quit menu item: {error}"))?;
    let first_separator = PredefinedMenuItem::separator(app_handle)
        .map_err(|error| format!("Failed to create tray separator menu item: {error}"))?;
    let second_separator = PredefinedMenuItem::separator(app_handle)
        .map_err(|error| format!("Failed to create tray separator menu item: {error}"))?;

    let menu = Menu::with_items(
        app_handle,
        &[
            &open_item,
            &first_separator,
            &about_item,
            &second_separator,
            &quit_item,
        ],
    )
    .map_err(|error| format!("Failed to build tray menu: {error}"))?;

    let show_on_click = config.tray.show_on_click;
    let tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .tooltip(config.tray_tooltip())
        .icon(tauri::include_image!("./icons/32x32.png"))
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| {
            tray_menu_handler::handle_tray_menu_event(app, event.id().as_ref())
        })
        .on_tray_icon_event(move |tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                if show_on_click {
                    window_actions::reveal_main_window(tray.app_handle());
                }
            }
        });

    #[cfg(target_os = "macos")]
    let tray_builder = tray_builder.icon_as_template(true);

    tray_builder
        .build(app_handle)
        .map_err(|error| format!("Failed to create tray icon: {error}"))?;

    tracing::info!("tray initialized");
    Ok(())
}
