//! Tracing subscriber setup.

use rb_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install a formatted stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects debug output for the
/// rawbridge crates and the configured filter applies. Safe to call more than
/// once: only the first call installs a subscriber.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "rawbridge=debug,rb_core=debug,rb_engine=debug".to_string()
        } else {
            config.filter.clone()
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .try_init();
}
