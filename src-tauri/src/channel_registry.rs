//! Fixed channel allow-lists for the content bridge.
//!
//! Every message that crosses between page content and the shell names one of these channels.
//! Names outside the lists never map to a variant, so nothing downstream can dispatch on them.

use std::time::Duration;

use crate::{DIALOG_INVOKE_TIMEOUT, INVOKE_TIMEOUT};

pub const SEND_MINIMIZE: &str = "app:minimize";
pub const SEND_MAXIMIZE: &str = "app:maximize";
pub const SEND_CLOSE: &str = "app:close";
pub const SEND_RELOAD: &str = "app:reload";

pub const INVOKE_GET_VERSION: &str = "app:getVersion";
pub const INVOKE_GET_PATH: &str = "app:getPath";
pub const INVOKE_OPEN_DIALOG: &str = "dialog:open";
pub const INVOKE_SAVE_DIALOG: &str = "dialog:save";

pub const NOTIFY_UPDATE_AVAILABLE: &str = "app:update-available";
pub const NOTIFY_DOWNLOAD_PROGRESS: &str = "app:download-progress";
pub const NOTIFY_ERROR: &str = "app:error";

/// One-way channels: content to shell, no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendChannel {
    Minimize,
    Maximize,
    Close,
    Reload,
}

impl SendChannel {
    pub const ALL: [Self; 4] = [Self::Minimize, Self::Maximize, Self::Close, Self::Reload];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            SEND_MINIMIZE => Some(Self::Minimize),
            SEND_MAXIMIZE => Some(Self::Maximize),
            SEND_CLOSE => Some(Self::Close),
            SEND_RELOAD => Some(Self::Reload),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimize => SEND_MINIMIZE,
            Self::Maximize => SEND_MAXIMIZE,
            Self::Close => SEND_CLOSE,
            Self::Reload => SEND_RELOAD,
        }
    }
}

/// Request/response channels: content awaits a reply from the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeChannel {
    GetVersion,
    GetPath,
    OpenDialog,
    SaveDialog,
}

impl InvokeChannel {
    pub const ALL: [Self; 4] = [
        Self::GetVersion,
        Self::GetPath,
        Self::OpenDialog,
        Self::SaveDialog,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            INVOKE_GET_VERSION => Some(Self::GetVersion),
            INVOKE_GET_PATH => Some(Self::GetPath),
            INVOKE_OPEN_DIALOG => Some(Self::OpenDialog),
            INVOKE_SAVE_DIALOG => Some(Self::SaveDialog),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetVersion => INVOKE_GET_VERSION,
            Self::GetPath => INVOKE_GET_PATH,
            Self::OpenDialog => INVOKE_OPEN_DIALOG,
            Self::SaveDialog => INVOKE_SAVE_DIALOG,
        }
    }

    /// Upper bound on how long content may stay suspended waiting for the reply.
    /// Native dialogs wait on a person, everything else should answer quickly.
    pub fn timeout(self) -> Duration {
        match self {
            Self::OpenDialog | Self::SaveDialog => DIALOG_INVOKE_TIMEOUT,
            Self::GetVersion | Self::GetPath => INVOKE_TIMEOUT,
        }
    }
}

/// Shell-to-content notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NotifyChannel {
    UpdateAvailable,
    DownloadProgress,
    Error,
}

impl NotifyChannel {
    pub const ALL: [Self; 3] = [Self::UpdateAvailable, Self::DownloadProgress, Self::Error];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            NOTIFY_UPDATE_AVAILABLE => Some(Self::UpdateAvailable),
            NOTIFY_DOWNLOAD_PROGRESS => Some(Self::DownloadProgress),
            NOTIFY_ERROR => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdateAvailable => NOTIFY_UPDATE_AVAILABLE,
            Self::DownloadProgress => NOTIFY_DOWNLOAD_PROGRESS,
            Self::Error => NOTIFY_ERROR,
        }
    }
}
