//! Tracing setup shared by the binaries.
//!
//! Every line goes through `SanitizingMakeWriter`, whichever sink is chosen.

use std::io::IsTerminal;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::sanitize::SanitizingMakeWriter;
use crate::config::{LogConfig, LogMode};

/// Which binary is logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Server,
    /// Stdout carries the rendered result, so logs never go there.
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stdout,
    Stderr,
    File,
}

/// Resolve the configured mode for `role`.
#[must_use]
pub fn select_sink(mode: LogMode, role: Role) -> LogSink {
    match (mode, role) {
        (LogMode::File, _) => LogSink::File,
        (_, Role::Client) => LogSink::Stderr,
        (LogMode::Stderr, Role::Server) => LogSink::Stderr,
        (LogMode::Stdout | LogMode::Auto, Role::Server) => LogSink::Stdout,
    }
}

/// Colour only a console stream that is a terminal.
#[must_use]
pub fn use_ansi(sink: LogSink) -> bool {
    match sink {
        LogSink::Stdout => std::io::stdout().is_terminal(),
        LogSink::Stderr => std::io::stderr().is_terminal(),
        LogSink::File => false,
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. Keep the returned guard
/// alive for the life of the process or buffered lines are lost.
///
/// # Errors
/// Returns `std::io::Error` if the log file cannot be opened.
pub fn init(config: &LogConfig, role: Role) -> std::io::Result<WorkerGuard> {
    let sink = select_sink(config.mode, role);

    let (writer, guard) = match sink {
        LogSink::File => {
            if let Some(parent) = Path::new(&config.file).parent() {
                // A missing directory surfaces on open below.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.file)?;
            tracing_appender::non_blocking(file)
        }
        LogSink::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogSink::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(use_ansi(sink))
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_never_logs_to_stdout() {
        for mode in [LogMode::Auto, LogMode::Stdout, LogMode::Stderr] {
            assert_eq!(select_sink(mode, Role::Client), LogSink::Stderr, "{mode:?}");
        }
        assert_eq!(select_sink(LogMode::File, Role::Client), LogSink::File);
    }

    #[test]
    fn test_server_defaults_to_stdout() {
        assert_eq!(select_sink(LogMode::Auto, Role::Server), LogSink::Stdout);
        assert_eq!(select_sink(LogMode::Stdout, Role::Server), LogSink::Stdout);
        assert_eq!(select_sink(LogMode::Stderr, Role::Server), LogSink::Stderr);
        assert_eq!(select_sink(LogMode::File, Role::Server), LogSink::File);
    }

    #[test]
    fn test_file_sink_is_never_coloured() {
        assert!(!use_ansi(LogSink::File));
    }
}
