//! Logging setup
//!
//! Console output always goes to stderr, filtered by `MWT_LOG` (default
//! `info`). Setting `MWT_ENABLE_LOGGING=1` additionally appends plain-text
//! records to `<state dir>/logs/winturn.log`, rotated once it grows past
//! 10 MiB.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;
const LOG_FILE: &str = "winturn.log";

fn log_path(state_dir: &Path) -> PathBuf {
    state_dir.join("logs").join(LOG_FILE)
}

fn rotate_if_needed(path: &Path) {
    if let Ok(meta) = fs::metadata(path) {
        if meta.len() > MAX_LOG_BYTES {
            let backup = path.with_extension("log.bak");
            let _ = fs::remove_file(&backup);
            let _ = fs::rename(path, &backup);
        }
    }
}

fn open_log_file(state_dir: &Path) -> Option<File> {
    let path = log_path(state_dir);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok()?;
    }
    rotate_if_needed(&path);
    OpenOptions::new().create(true).append(true).open(&path).ok()
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logger(state_dir: &Path) {
    let filter = EnvFilter::try_from_env("MWT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let file_enabled = std::env::var("MWT_ENABLE_LOGGING")
        .map(|v| v == "1")
        .unwrap_or(false);
    let file_layer = file_enabled
        .then(|| open_log_file(state_dir))
        .flatten()
        .map(|file| fmt::layer().with_ansi(false).with_writer(Mutex::new(file)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();
}
