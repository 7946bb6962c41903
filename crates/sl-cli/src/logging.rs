//! Log subscriber setup
//!
//! Library crates log through the `log` facade; the fmt subscriber's
//! `tracing-log` bridge picks those records up.

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins; otherwise `warn`, or
/// `debug` for the sluice crates when `verbose` is set.
pub(crate) fn init(verbose: bool) {
    let default = if verbose {
        "warn,sl_core=debug,sl_db=debug,sl_sql=debug,sl_llm=debug,sl_pipeline=debug,sluice=debug"
    } else {
        "warn"
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .finish();

    if let Err(e) = subscriber.try_init() {
        eprintln!("[warn] Logging already initialized: {}", e);
    }
}
