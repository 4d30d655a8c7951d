//! Process-level logging sink
//!
//! Every line goes to stdout. When a log file is configured, the same lines are also
//! appended to it without ANSI colors. The file is best-effort: if it cannot be opened
//! we warn on stderr and keep logging to stdout.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Max level for the given debug flag
pub fn level_for(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed (e.g. a second programmatic
/// run in the same process); the existing one keeps working.
pub fn init(debug: bool, log_file: Option<&Path>) -> bool {
    let level = level_for(debug);
    let file = log_file.and_then(open_log_file);

    let stdout_layer = fmt::layer()
        .with_ansi(true)
        .with_writer(std::io::stdout)
        .with_filter(level);

    let file_layer = file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .with_filter(level)
    });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!(
            "Warning: cannot create log directory {}: {}",
            parent.display(),
            e
        );
        return None;
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {}", path.display(), e);
            None
        }
    }
}
