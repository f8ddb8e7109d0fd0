use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "XCSWEEP_LOG";

pub enum LogTarget {
    /// The TUI owns the terminal, so logs go to a file in the cache dir.
    File,
    Stderr,
}

fn default_level(verbose: u8, target: &LogTarget) -> &'static str {
    match (verbose, target) {
        (0, LogTarget::Stderr) => "warn",
        (0, LogTarget::File) | (1, _) => "info",
        _ => "debug",
    }
}

/// Installs the global subscriber. `XCSWEEP_LOG` overrides the level picked
/// from `--verbose`. Keep the returned guard alive until exit so buffered
/// file logs are flushed.
pub fn init(verbose: u8, target: &LogTarget) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, target)));

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
            None
        }
        LogTarget::File => {
            let dir = dirs::cache_dir()?.join("xcsweep");
            std::fs::create_dir_all(&dir).ok()?;
            let appender = tracing_appender::rolling::never(dir, "xcsweep.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init();
            Some(guard)
        }
    }
}
