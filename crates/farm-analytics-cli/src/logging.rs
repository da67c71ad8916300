use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber. stdout carries results only.
///
/// `RUST_LOG` takes precedence, then `--log-level`, then "warn".
pub fn init(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(false)
        .try_init();
}
