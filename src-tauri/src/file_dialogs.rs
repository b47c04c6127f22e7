use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Value};
use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, FileDialogBuilder, FilePath};
use tokio::sync::oneshot;

use crate::desktop_bridge::BridgeHandlerError;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub(crate) struct FileFilter {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) extensions: Vec<String>,
}

/// Options content may pass to `dialog:open` / `dialog:save`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct FileDialogOptions {
    pub(crate) title: Option<String>,
    pub(crate) default_path: Option<PathBuf>,
    pub(crate) filters: Vec<FileFilter>,
    pub(crate) properties: Vec<String>,
}

impl FileDialogOptions {
    pub(crate) fn from_payload(data: Option<Value>) -> Result<Self, BridgeHandlerError> {
        match data {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value)
                .map_err(|error| BridgeHandlerError::InvalidArguments(error.to_string())),
        }
    }

    fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|candidate| candidate == property)
    }

    pub(crate) fn wants_directory(&self) -> bool {
        self.has_property("openDirectory")
    }

    pub(crate) fn wants_multiple(&self) -> bool {
        self.has_property("multiSelections")
    }
}

fn configure(app_handle: &AppHandle, options: &FileDialogOptions) -> FileDialogBuilder<tauri::Wry> {
    let mut builder = app_handle.dialog().file();
    if let Some(title) = &options.title {
        builder = builder.set_title(title);
    }
    for filter in &options.filters {
        let extensions: Vec<&str> = filter.extensions.iter().map(String::as_str).collect();
        builder = builder.add_filter(&filter.name, &extensions);
    }
    if let Some(default_path) = &options.default_path {
        builder = apply_default_path(builder, default_path);
    }
    builder
}

fn apply_default_path(
    builder: FileDialogBuilder<tauri::Wry>,
    default_path: &Path,
) -> FileDialogBuilder<tauri::Wry> {
    if default_path.is_dir() {
        return builder.set_directory(default_path);
    }

    let builder = match default_path.parent().filter(|parent| parent.is_dir()) {
        Some(parent) => builder.set_directory(parent),
        None => builder,
    };
    match default_path.file_name().and_then(|name| name.to_str()) {
        Some(file_name) => builder.set_file_name(file_name),
        None => builder,
    }
}

fn paths_to_strings(paths: Vec<FilePath>) -> Vec<String> {
    paths.into_iter().map(|path| path.to_string()).collect()
}

pub(crate) async fn open_file_dialog(
    app_handle: AppHandle,
    data: Option<Value>,
) -> Result<Value, BridgeHandlerError> {
    let options = FileDialogOptions::from_payload(data)?;
    let builder = configure(&app_handle, &options);
    let (reply_tx, reply_rx) = oneshot::channel::<Vec<FilePath>>();

    if options.wants_directory() {
        builder.pick_folder(move |picked| {
            let _ = reply_tx.send(picked.into_iter().collect());
        });
    } else if options.wants_multiple() {
        builder.pick_files(move |picked| {
            let _ = reply_tx.send(picked.unwrap_or_default());
        });
    } else {
        builder.pick_file(move |picked| {
            let _ = reply_tx.send(picked.into_iter().collect());
        });
    }

    let picked = reply_rx.await.map_err(|_| BridgeHandlerError::ReplyDropped)?;
    let file_paths = paths_to_strings(picked);
    Ok(json!({
        "canceled": file_paths.is_empty(),
        "filePaths": file_paths,
    }))
}

pub(crate) async fn save_file_dialog(
    app_handle: AppHandle,
    data: Option<Value>,
) -> Result<Value, BridgeHandlerError> {
    let options = FileDialogOptions::from_payload(data)?;
    let (reply_tx, reply_rx) = oneshot::channel::<Option<FilePath>>();

    configure(&app_handle, &options).save_file(move |picked| {
        let _ = reply_tx.send(picked);
    });

    let picked = reply_rx.await.map_err(|_| BridgeHandlerError::ReplyDropped)?;
    Ok(match picked {
        Some(path) => json!({ "canceled": false, "filePath": path.to_string() }),
        None => json!({ "canceled": true, "filePath": null }),
    })
}
