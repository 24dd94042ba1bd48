use tracing_subscriber::EnvFilter;

/// Installs the JSON log subscriber used inside the Lambda sandbox.
///
/// `RUST_LOG` selects the filter; `info` otherwise. CloudWatch stamps every
/// line, so timestamps are omitted.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_current_span(false)
        .without_time()
        .init();
}
