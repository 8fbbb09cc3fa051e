//! Tracing subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directive used when neither `RUST_LOG` nor the configuration is usable.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// First valid directive of `RUST_LOG`, the configured level, `warn`.
fn directive(from_env: Option<String>, configured: &str) -> String {
    if let Some(env) = from_env.filter(|d| EnvFilter::try_new(d).is_ok()) {
        return env;
    }
    if EnvFilter::try_new(configured).is_ok() {
        return configured.to_string();
    }
    eprintln!("invalid log level '{}'; using {}", configured, DEFAULT_DIRECTIVE);
    DEFAULT_DIRECTIVE.to_string()
}

/// Build the filter for a configured level.
pub fn filter(configured: &str) -> EnvFilter {
    let directive = directive(std::env::var(EnvFilter::DEFAULT_ENV).ok(), configured);
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Logs go to stderr so stdout carries only results.
pub fn init(configured: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(configured))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
