use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the stderr subscriber.
///
/// `level` wins when given (from `--log-level` or `[logging] level`), then
/// `RUST_LOG`, then `info`. Python-style names (`WARNING`, `CRITICAL`) are
/// accepted too.
pub fn setup_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => {
            EnvFilter::try_new(normalise_level(level)).unwrap_or_else(|_| EnvFilter::new("info"))
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

fn normalise_level(level: &str) -> String {
    match level.trim().to_uppercase().as_str() {
        "CRITICAL" | "ERROR" => "error".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "INFO" => "info".to_string(),
        "DEBUG" => "debug".to_string(),
        "TRACE" => "trace".to_string(),
        _ => level.trim().to_string(),
    }
}
