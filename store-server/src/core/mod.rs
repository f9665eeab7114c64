//! Core infrastructure: configuration and tracing setup

pub mod config;

pub use config::Config;

/// Initialize tracing from `RUST_LOG` (defaults to `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
