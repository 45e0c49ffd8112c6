//! Tracing setup.
//!
//! Logs go to stderr, or to the file named by `KILLONSTART_LOG`. While the
//! TUI owns the terminal, stderr logging is suppressed unless a file is set.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_FILE_ENV: &str = "KILLONSTART_LOG";

/// Install the global subscriber. Returns whether logging is active.
pub fn init_tracing(default_level: &str, allow_stderr: bool) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (writer, ansi) = match log_file_path_from_env() {
        Some(path) => match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
            Err(err) => {
                if allow_stderr {
                    eprintln!(
                        "Warning: failed to open log file {}: {}",
                        path.display(),
                        err
                    );
                }
                return false;
            }
        },
        None if allow_stderr => (
            BoxMakeWriter::new(std::io::stderr),
            atty::is(atty::Stream::Stderr),
        ),
        None => return false,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_names(true)
        .with_ansi(ansi)
        .with_writer(writer);

    subscriber.try_init().is_ok()
}

fn log_file_path_from_env() -> Option<PathBuf> {
    std::env::var_os(LOG_FILE_ENV).map(PathBuf::from)
}
