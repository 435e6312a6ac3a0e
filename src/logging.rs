use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber on stderr.
///
/// Filtered via `RUST_LOG`; defaults to warnings only so normal CLI
/// output stays clean.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
