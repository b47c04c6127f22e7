use tauri::{
    menu::{AboutMetadata, Menu, MenuEvent, MenuItem, PredefinedMenuItem, Submenu},
    AppHandle, Manager, WebviewWindow, Wry,
};

use crate::{
    app_config::AppConfig,
    external_url::{self, SystemOpener},
    main_window,
    platform::Platform,
    window_actions, ShellState, HELP_DOCUMENTATION_URL, HELP_LEARN_MORE_URL, MAIN_WINDOW_LABEL,
};

pub const MENU_NEW_WINDOW: &str = "menu_new_window";
pub const MENU_RELOAD: &str = "menu_reload";
pub const MENU_TOGGLE_DEVTOOLS: &str = "menu_toggle_devtools";
pub const MENU_LEARN_MORE: &str = "menu_learn_more";
pub const MENU_DOCUMENTATION: &str = "menu_documentation";
pub const MENU_REPORT_ISSUE: &str = "menu_report_issue";

/// Platform-provided menu items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRole {
    About,
    Services,
    Hide,
    HideOthers,
    ShowAll,
    Quit,
    CloseWindow,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Minimize,
    Maximize,
    Fullscreen,
    Separator,
}

/// Menu items handled by the shell itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    NewWindow,
    Reload,
    ToggleDevTools,
    LearnMore,
    Documentation,
    ReportIssue,
}

impl MenuCommand {
    pub fn id(self) -> &'static str {
        match self {
            Self::NewWindow => MENU_NEW_WINDOW,
            Self::Reload => MENU_RELOAD,
            Self::ToggleDevTools => MENU_TOGGLE_DEVTOOLS,
            Self::LearnMore => MENU_LEARN_MORE,
            Self::Documentation => MENU_DOCUMENTATION,
            Self::ReportIssue => MENU_REPORT_ISSUE,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::NewWindow => "New Window",
            Self::Reload => "Reload",
            Self::ToggleDevTools => "Toggle Developer Tools",
            Self::LearnMore => "Learn More",
            Self::Documentation => "Documentation",
            Self::ReportIssue => "Report Issue",
        }
    }

    fn accelerator(self) -> Option<&'static str> {
        match self {
            Self::NewWindow => Some("CmdOrCtrl+N"),
            Self::Reload => Some("CmdOrCtrl+R"),
            Self::ToggleDevTools => Some("CmdOrCtrl+Alt+I"),
            _ => None,
        }
    }
}

pub fn command_from_menu_id(menu_id: &str) -> Option<MenuCommand> {
    match menu_id {
        MENU_NEW_WINDOW => Some(MenuCommand::NewWindow),
        MENU_RELOAD => Some(MenuCommand::Reload),
        MENU_TOGGLE_DEVTOOLS => Some(MenuCommand::ToggleDevTools),
        MENU_LEARN_MORE => Some(MenuCommand::LearnMore),
        MENU_DOCUMENTATION => Some(MenuCommand::Documentation),
        MENU_REPORT_ISSUE => Some(MenuCommand::ReportIssue),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Role(MenuRole),
    Command(MenuCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmenuSpec {
    pub title: String,
    pub entries: Vec<MenuEntry>,
}

impl SubmenuSpec {
    fn new(title: impl Into<String>, entries: Vec<MenuEntry>) -> Self {
        Self {
            title: title.into(),
            entries,
        }
    }
}

/// Lays out the application menu for `platform`. The app menu only exists on macOS, where
/// quitting lives; elsewhere File ends with Quit.
pub fn application_menu_spec(
    product_name: &str,
    platform: Platform,
    has_issue_tracker: bool,
) -> Vec<SubmenuSpec> {
    use MenuEntry::{Command, Role};

    let is_mac = platform.is_mac();
    let mut submenus = Vec::new();

    if is_mac {
        submenus.push(SubmenuSpec::new(
            product_name,
            vec![
                Role(MenuRole::About),
                Role(MenuRole::Separator),
                Role(MenuRole::Services),
                Role(MenuRole::Separator),
                Role(MenuRole::Hide),
                Role(MenuRole::HideOthers),
                Role(MenuRole::ShowAll),
                Role(MenuRole::Separator),
                Role(MenuRole::Quit),
            ],
        ));
    }

    submenus.push(SubmenuSpec::new(
        "File",
        vec![
            Command(MenuCommand::NewWindow),
            Role(MenuRole::Separator),
            Role(if is_mac {
                MenuRole::CloseWindow
            } else {
                MenuRole::Quit
            }),
        ],
    ));

    submenus.push(SubmenuSpec::new(
        "Edit",
        vec![
            Role(MenuRole::Undo),
            Role(MenuRole::Redo),
            Role(MenuRole::Separator),
            Role(MenuRole::Cut),
            Role(MenuRole::Copy),
            Role(MenuRole::Paste),
            Role(MenuRole::Separator),
            Role(MenuRole::SelectAll),
        ],
    ));

    let mut view = vec![Command(MenuCommand::Reload)];
    if cfg!(debug_assertions) {
        view.push(Command(MenuCommand::ToggleDevTools));
    }
    view.push(Role(MenuRole::Separator));
    view.push(Role(MenuRole::Fullscreen));
    submenus.push(SubmenuSpec::new("View", view));

    let mut window = vec![Role(MenuRole::Minimize), Role(MenuRole::Maximize)];
    if !is_mac {
        window.push(Role(MenuRole::CloseWindow));
    }
    submenus.push(SubmenuSpec::new("Window", window));

    let mut help = vec![
        Command(MenuCommand::LearnMore),
        Command(MenuCommand::Documentation),
    ];
    if has_issue_tracker {
        help.push(Role(MenuRole::Separator));
        help.push(Command(MenuCommand::ReportIssue));
    }
    submenus.push(SubmenuSpec::new("Help", help));

    submenus
}

fn append_role(
    app_handle: &AppHandle,
    submenu: &Submenu<Wry>,
    role: MenuRole,
    config: &AppConfig,
) -> tauri::Result<()> {
    let product_name = config.product_name.as_str();
    let item = match role {
        MenuRole::About => PredefinedMenuItem::about(
            app_handle,
            Some(format!("About {product_name}").as_str()),
            Some(AboutMetadata {
                name: Some(product_name.to_string()),
                version: Some(config.version.clone()),
                copyright: Some(config.copyright_notice()),
                comments: Some(config.description.clone()),
                ..Default::default()
            }),
        )?,
        MenuRole::Services => PredefinedMenuItem::services(app_handle, None)?,
        MenuRole::Hide => {
            PredefinedMenuItem::hide(app_handle, Some(format!("Hide {product_name}").as_str()))?
        }
        MenuRole::HideOthers => PredefinedMenuItem::hide_others(app_handle, None)?,
        MenuRole::ShowAll => PredefinedMenuItem::show_all(app_handle, None)?,
        MenuRole::Quit => {
            PredefinedMenuItem::quit(app_handle, Some(format!("Quit {product_name}").as_str()))?
        }
        MenuRole::CloseWindow => PredefinedMenuItem::close_window(app_handle, None)?,
        MenuRole::Undo => PredefinedMenuItem::undo(app_handle, None)?,
        MenuRole::Redo => PredefinedMenuItem::redo(app_handle, None)?,
        MenuRole::Cut => PredefinedMenuItem::cut(app_handle, None)?,
        MenuRole::Copy => PredefinedMenuItem::copy(app_handle, None)?,
        MenuRole::Paste => PredefinedMenuItem::paste(app_handle, None)?,
        MenuRole::SelectAll => PredefinedMenuItem::select_all(app_handle, None)?,
        MenuRole::Minimize => PredefinedMenuItem::minimize(app_handle, None)?,
        MenuRole::Maximize => PredefinedMenuItem::maximize(app_handle, None)?,
        MenuRole::Fullscreen => PredefinedMenuItem::fullscreen(app_handle, None)?,
        MenuRole::Separator => PredefinedMenuItem::separator(app_handle)?,
    };
    submenu.append(&item)
}

fn append_command(
    app_handle: &AppHandle,
    submenu: &Submenu<Wry>,
    command: MenuCommand,
) -> tauri::Result<()> {
    let item = MenuItem::with_id(
        app_handle,
        command.id(),
        command.label(),
        true,
        command.accelerator(),
    )?;
    submenu.append(&item)
}

/// Builds the native application menu from [`application_menu_spec`].
pub fn build_application_menu(app_handle: &AppHandle) -> Result<Menu<Wry>, String> {
    let config = app_handle.state::<ShellState>().config.clone();
    let menu = Menu::new(app_handle)
        .map_err(|error| format!("Failed to create application menu: {error}"))?;

    let specs = application_menu_spec(
        &config.product_name,
        Platform::current(),
        config.author.url.is_some(),
    );
    for spec in specs {
        let submenu = Submenu::new(app_handle, &spec.title, true)
            .map_err(|error| format!("Failed to create '{}' menu: {error}", spec.title))?;
        for entry in spec.entries {
            let appended = match entry {
                MenuEntry::Role(role) => append_role(app_handle, &submenu, role, &config),
                MenuEntry::Command(command) => append_command(app_handle, &submenu, command),
            };
            appended.map_err(|error| {
                format!("Failed to add {entry:?} to '{}' menu: {error}", spec.title)
            })?;
        }
        menu.append(&submenu)
            .map_err(|error| format!("Failed to attach '{}' menu: {error}", spec.title))?;
    }

    Ok(menu)
}

fn focused_window(app_handle: &AppHandle) -> Option<WebviewWindow> {
    let windows = app_handle.webview_windows();
    windows
        .values()
        .find(|window| window.is_focused().unwrap_or(false))
        .cloned()
        .or_else(|| windows.get(MAIN_WINDOW_LABEL).cloned())
}

fn open_help_link(app_handle: &AppHandle, url: &str) {
    let result = external_url::open_external_url(&SystemOpener::new(app_handle.clone()), url);
    if !result.ok {
        tracing::warn!(url, reason = ?result.reason, "help link was not opened");
    }
}

pub fn handle_menu_event(app_handle: &AppHandle, event: MenuEvent) {
    let Some(command) = command_from_menu_id(event.id().as_ref()) else {
        return;
    };

    match command {
        MenuCommand::NewWindow => {
            if let Err(error) = main_window::create_secondary_window(app_handle) {
                tracing::error!(%error, "error creating new window");
            }
        }
        MenuCommand::Reload => {
            if let Some(window) = focused_window(app_handle) {
                if let Err(error) = window_actions::reload_window(&window) {
                    tracing::warn!(%error, "menu reload failed");
                }
            }
        }
        MenuCommand::ToggleDevTools => {
            #[cfg(debug_assertions)]
            if let Some(window) = focused_window(app_handle) {
                window_actions::toggle_devtools(&window);
            }
        }
        MenuCommand::LearnMore => open_help_link(app_handle, HELP_LEARN_MORE_URL),
        MenuCommand::Documentation => open_help_link(app_handle, HELP_DOCUMENTATION_URL),
        MenuCommand::ReportIssue => {
            let config = app_handle.state::<ShellState>().config.clone();
            if let Some(url) = config.author.url.as_deref() {
                open_help_link(app_handle, url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(specs: &[SubmenuSpec]) -> Vec<&str> {
        specs.iter().map(|spec| spec.title.as_str()).collect()
    }

    fn submenu<'a>(specs: &'a [SubmenuSpec], title: &str) -> &'a SubmenuSpec {
        specs
            .iter()
            .find(|spec| spec.title == title)
            .expect("submenu should exist")
    }

    #[test]
    fn app_menu_is_emitted_only_on_macos() {
        let mac = application_menu_spec("Demo", Platform::MacOs, true);
        assert_eq!(
            titles(&mac),
            vec!["Demo", "File", "Edit", "View", "Window", "Help"]
        );

        for platform in [Platform::Windows, Platform::Linux] {
            let specs = application_menu_spec("Demo", platform, true);
            assert_eq!(titles(&specs), vec!["File", "Edit", "View", "Window", "Help"]);
        }
    }

    #[test]
    fn file_menu_quits_outside_macos_and_closes_on_macos() {
        let mac = application_menu_spec("Demo", Platform::MacOs, false);
        let linux = application_menu_spec("Demo", Platform::Linux, false);

        assert_eq!(
            submenu(&mac, "File").entries.last(),
            Some(&MenuEntry::Role(MenuRole::CloseWindow))
        );
        assert_eq!(
            submenu(&linux, "File").entries.last(),
            Some(&MenuEntry::Role(MenuRole::Quit))
        );
        assert!(!submenu(&mac, "Window")
            .entries
            .contains(&MenuEntry::Role(MenuRole::CloseWindow)));
    }

    #[test]
    fn report_issue_needs_an_issue_tracker() {
        let with = application_menu_spec("Demo", Platform::Linux, true);
        let without = application_menu_spec("Demo", Platform::Linux, false);
        let report = MenuEntry::Command(MenuCommand::ReportIssue);

        assert!(submenu(&with, "Help").entries.contains(&report));
        assert!(!submenu(&without, "Help").entries.contains(&report));
    }

    #[test]
    fn devtools_entry_follows_build_profile() {
        let specs = application_menu_spec("Demo", Platform::Windows, false);
        let has_devtools = submenu(&specs, "View")
            .entries
            .contains(&MenuEntry::Command(MenuCommand::ToggleDevTools));
        assert_eq!(has_devtools, cfg!(debug_assertions));
    }

    #[test]
    fn command_from_menu_id_maps_every_command() {
        for command in [
            MenuCommand::NewWindow,
            MenuCommand::Reload,
            MenuCommand::ToggleDevTools,
            MenuCommand::LearnMore,
            MenuCommand::Documentation,
            MenuCommand::ReportIssue,
        ] {
            assert_eq!(command_from_menu_id(command.id()), Some(command));
        }
        assert_eq!(command_from_menu_id("tray_quit"), None);
    }
}
