use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, LazyLock, Mutex},
    time::{Duration, SystemTime},
};

use chrono::NaiveDate;
use regex::Regex;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::{DEFAULT_LOG_LEVEL, LOG_LEVEL_ENV};

static LOG_FILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^app-\d{4}-\d{2}-\d{2}\.log$").expect("log file pattern is a valid regex")
});

#[derive(Debug, thiserror::Error)]
pub(crate) enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to open log file {path}: {source}")]
    OpenFile { path: PathBuf, source: io::Error },
    #[error("failed to read log directory {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),
}

pub(crate) fn log_file_name(date: NaiveDate) -> String {
    format!("app-{}.log", date.format("%Y-%m-%d"))
}

pub(crate) fn is_daily_log_file(file_name: &str) -> bool {
    LOG_FILE_PATTERN.is_match(file_name)
}

/// File half of the subscriber. Writes are dropped until a log directory is attached, which can
/// only happen once the app's data paths are known.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogFileSink {
    file: Arc<Mutex<Option<File>>>,
}

impl LogFileSink {
    pub(crate) fn attach(
        &self,
        logs_dir: &Path,
        today: NaiveDate,
    ) -> Result<PathBuf, LoggingError> {
        fs::create_dir_all(logs_dir).map_err(|source| LoggingError::CreateDir {
            path: logs_dir.to_path_buf(),
            source,
        })?;

        let path = logs_dir.join(log_file_name(today));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggingError::OpenFile {
                path: path.clone(),
                source,
            })?;

        if let Ok(mut guard) = self.file.lock() {
            *guard = Some(file);
        }
        Ok(path)
    }
}

pub(crate) struct LogFileWriter {
    file: Arc<Mutex<Option<File>>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Ok(mut guard) = self.file.lock() else {
            return Ok(buf.len());
        };
        match guard.as_mut() {
            Some(file) => {
                file.write_all(buf)?;
                Ok(buf.len())
            }
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock() {
            Ok(mut guard) => guard.as_mut().map_or(Ok(()), Write::flush),
            Err(_) => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFileSink {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter {
            file: self.file.clone(),
        }
    }
}

/// Installs the global subscriber: stderr plus the daily log file, filtered by `LOG_LEVEL`.
pub(crate) fn init_logging() -> Result<LogFileSink, LoggingError> {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let sink = LogFileSink::default();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(sink.clone()),
        )
        .try_init()
        .map_err(|error| LoggingError::Subscriber(error.to_string()))?;

    Ok(sink)
}

/// Routes panics into the log. Panics inside async tasks are contained by the runtime, so the
/// shell keeps running after logging them.
pub(crate) fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "uncaught panic");
        default_hook(info);
    }));
}

/// Deletes daily log files whose modification time is older than `max_age`. Files that do not
/// follow the `app-YYYY-MM-DD.log` naming are never touched.
pub(crate) fn rotate_old_logs(
    logs_dir: &Path,
    now: SystemTime,
    max_age: Duration,
) -> Result<usize, LoggingError> {
    let entries = fs::read_dir(logs_dir).map_err(|source| LoggingError::ReadDir {
        path: logs_dir.to_path_buf(),
        source,
    })?;

    let mut deleted = 0;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if !is_daily_log_file(file_name) {
            continue;
        }

        let path = entry.path();
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to stat log file");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };

        let age = now.duration_since(modified).unwrap_or_default();
        if age <= max_age {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => deleted += 1,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to delete old log file")
            }
        }
    }

    if deleted > 0 {
        tracing::info!(deleted, "rotated old log files");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LOG_RETENTION;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn write_file_aged(dir: &Path, name: &str, age: Duration) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).expect("create file");
        file.set_modified(SystemTime::now() - age)
            .expect("set modification time");
        path
    }

    #[test]
    fn log_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).expect("valid date");
        assert_eq!(log_file_name(date), "app-2026-03-09.log");
        assert!(is_daily_log_file(&log_file_name(date)));
    }

    #[test]
    fn daily_log_pattern_is_strict() {
        assert!(is_daily_log_file("app-2024-01-31.log"));
        assert!(!is_daily_log_file("app-2024-1-31.log"));
        assert!(!is_daily_log_file("app-latest.log"));
        assert!(!is_daily_log_file("app-2024-01-31.log.bak"));
        assert!(!is_daily_log_file("other-2024-01-31.log"));
    }

    #[test]
    fn rotate_old_logs_deletes_only_old_matching_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let old_log = write_file_aged(dir.path(), "app-2020-01-01.log", 10 * DAY);
        let fresh_log = write_file_aged(dir.path(), "app-2020-01-09.log", DAY);
        let old_notes = write_file_aged(dir.path(), "notes.txt", 30 * DAY);
        let old_backup = write_file_aged(dir.path(), "app-2020-01-01.log.bak", 30 * DAY);
        let old_named = write_file_aged(dir.path(), "app-latest.log", 30 * DAY);

        let deleted =
            rotate_old_logs(dir.path(), SystemTime::now(), LOG_RETENTION).expect("rotate logs");

        assert_eq!(deleted, 1);
        assert!(!old_log.exists());
        assert!(fresh_log.exists());
        assert!(old_notes.exists());
        assert!(old_backup.exists());
        assert!(old_named.exists());
    }

    #[test]
    fn rotate_old_logs_skips_directories_with_log_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("app-2020-01-01.log");
        fs::create_dir(&nested).expect("create dir");

        let far_future = SystemTime::now() + 365 * DAY;
        let deleted = rotate_old_logs(dir.path(), far_future, LOG_RETENTION).expect("rotate logs");

        assert_eq!(deleted, 0);
        assert!(nested.is_dir());
    }

    #[test]
    fn rotate_old_logs_reports_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing");
        assert!(matches!(
            rotate_old_logs(&missing, SystemTime::now(), LOG_RETENTION),
            Err(LoggingError::ReadDir { .. })
        ));
    }

    #[test]
    fn sink_writes_only_after_attach() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = LogFileSink::default();

        sink.make_writer()
            .write_all(b"dropped before attach\n")
            .expect("write before attach");

        let date = NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date");
        let path = sink.attach(&dir.path().join("logs"), date).expect("attach");
        sink.make_writer()
            .write_all(b"kept after attach\n")
            .expect("write after attach");

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("app-2026-10-16.log"));
        let contents = fs::read_to_string(path).expect("read log");
        assert_eq!(contents, "kept after attach\n");
    }
}
