//! Subscriber setup for binaries and ad-hoc runs.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for a `-v` count; `-q` maps to a negative verbosity
#[must_use]
pub fn level_for(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-1 => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn filter(verbosity: i8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_for(verbosity);
        EnvFilter::new(format!("{level},peopleops_e2e={level},peopleops_cli={level},peopleops={level}"))
    })
}

/// Install the global subscriber. `RUST_LOG` wins over `verbosity`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(verbosity: i8, json: bool) {
    let registry = tracing_subscriber::registry().with(filter(verbosity));
    let result = if json {
        registry
            .with(fmt::layer().json().with_target(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("subscriber already installed");
    }
}
