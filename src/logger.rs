use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn env_filter(verbose: bool) -> EnvFilter {
    std::env::var("SITEWATCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        )
}

fn set_stderr_default(
    filter: EnvFilter,
    no_color: bool,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Installs the global subscriber. With `log_file` set (terminal UI mode) log
/// lines are appended to that file instead of stderr.
pub fn init_logging(verbose: bool, no_color: bool, log_file: Option<&Path>) {
    let filter = env_filter(verbose);

    let opened = log_file.map(|path| {
        (
            path,
            OpenOptions::new().create(true).append(true).open(path),
        )
    });
    let result = match opened {
        Some((_, Ok(file))) => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        Some((path, Err(err))) => {
            eprintln!("Failed to open log file '{}': {}", path.display(), err);
            set_stderr_default(filter, no_color)
        }
        None => set_stderr_default(filter, no_color),
    };

    if let Err(err) = result {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
