pub const TRAY_MENU_OPEN_WINDOW: &str = "tray_open_window";
pub const TRAY_MENU_ABOUT: &str = "tray_about";
pub const TRAY_MENU_QUIT: &str = "tray_quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMenuAction {
    OpenWindow,
    About,
    Quit,
}

pub fn action_from_menu_id(menu_id: &str) -> Option<TrayMenuAction> {
    match menu_id {
        TRAY_MENU_OPEN_WINDOW => Some(TrayMenuAction::OpenWindow),
        TRAY_MENU_ABOUT => Some(TrayMenuAction::About),
        TRAY_MENU_QUIT => Some(TrayMenuAction::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_from_menu_id_maps_all_known_actions() {
        assert_eq!(
            action_from_menu_id(TRAY_MENU_OPEN_WINDOW),
            Some(TrayMenuAction::OpenWindow)
        );
        assert_eq!(
            action_from_menu_id(TRAY_MENU_ABOUT),
            Some(TrayMenuAction::About)
        );
        assert_eq!(
            action_from_menu_id(TRAY_MENU_QUIT),
            Some(TrayMenuAction::Quit)
        );
    }

    #[test]
    fn action_from_menu_id_ignores_application_menu_ids() {
        assert_eq!(action_from_menu_id("menu_new_window"), None);
        assert_eq!(action_from_menu_id("unknown-menu"), None);
    }
}
