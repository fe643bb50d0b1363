//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, prelude::*};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` sets the filter when present, otherwise the level is `info`.
/// `verbose` raises this crate to `debug` on top of either. Calling this more
/// than once leaves the first subscriber in place.
pub fn init_logging(verbose: bool) {
    let env_filter = with_verbosity(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        verbose,
    );

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false));

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn with_verbosity(filter: EnvFilter, verbose: bool) -> EnvFilter {
    if !verbose {
        return filter;
    }
    match "wind_sim=debug".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
