fn main() {
    // Declaring the command list makes tauri-build generate `allow-*` permissions for each
    // bridge command, so a webview can only reach them through an explicit capability.
    tauri_build::try_build(tauri_build::Attributes::default().app_manifest(
        tauri_build::AppManifest::default().commands(&[
            "bridge_send",
            "bridge_invoke",
            "bridge_subscribe",
            "bridge_unsubscribe",
            "bridge_open_external",
        ]),
    ))
    .expect("failed to run tauri-build");
}
