//! Console logging setup.
//!
//! Configurable via the RUST_LOG environment variable; defaults to INFO.

use tracing_subscriber::EnvFilter;

/// Initialize console logging.
///
/// `debug_mode` forces debug-level output regardless of RUST_LOG.
pub fn init(debug_mode: bool) -> Result<(), String> {
    let filter = if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| e.to_string())
}
