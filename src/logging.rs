use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging on stderr, optionally mirrored to `log_file`.
///
/// With `debug` the level starts at `debug` and `RUST_LOG` may override it.
/// Without it the level is fixed at `info` so a stray `RUST_LOG` in the
/// environment cannot make the overlay chatty. Calling this twice is a no-op.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    init_with_level(debug, if debug { "debug" } else { "info" }, log_file)
}

/// Like [`init`] but with an explicit non-debug level, used by silent mode.
pub fn init_with_level(debug: bool, level: &str, log_file: Option<PathBuf>) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let file_layer = log_file.and_then(|path| {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path.file_name()?;
        let appender = tracing_appender::rolling::never(dir, name);
        Some(fmt::layer().with_ansi(false).with_writer(appender))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
}
