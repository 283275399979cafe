use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "exoprep=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Initializes logging to stderr and, when `log_dir` is given, to a daily
/// rolling JSON file in that directory.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the life of the process.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    match log_dir {
        Some(dir) => {
            // Fall back to console-only logging if the directory cannot be created
            if let Err(e) = fs::create_dir_all(dir) {
                tracing_subscriber::registry()
                    .with(env_filter())
                    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                    .init();
                tracing::warn!("Cannot create log directory '{}': {}", dir.display(), e);
                return None;
            }

            let file_appender = tracing_appender::rolling::daily(dir, "exoprep.log");
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
            let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

            tracing_subscriber::registry()
                .with(env_filter())
                .with(file_layer)
                .with(console_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .init();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_writes_daily_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = init_logging(Some(dir.path()));
        assert!(guard.is_some());

        tracing::info!("logging initialised");
        drop(guard);

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|n| n.starts_with("exoprep.log")), "{:?}", names);
    }
}
