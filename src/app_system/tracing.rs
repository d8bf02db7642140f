//! Log output for the booking client.

use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset. HTTP internals stay quiet unless asked for.
const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,reqwest=warn";

/// Installs a compact `fmt` subscriber with uptime timestamps.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .try_init();
}
