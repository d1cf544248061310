//! Tracing subscriber bootstrap.
//!
//! Development builds log at `debug` with targets, production at `info` in a
//! compact layout. A configured filter directive, then `RUST_LOG`, take
//! precedence over the environment default.

use anyhow::Context;
use bib_kernel::settings::{Environment, LogFormat, Settings};
use tracing_subscriber::EnvFilter;

/// Resolve the filter directive for the given settings.
pub fn filter_directive(settings: &Settings) -> String {
    if let Some(filter) = &settings.telemetry.filter {
        return filter.clone();
    }
    if let Ok(filter) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !filter.trim().is_empty() {
            return filter;
        }
    }
    default_directive(settings.environment).to_string()
}

/// Level used when neither settings nor `RUST_LOG` name a filter.
pub fn default_directive(environment: Environment) -> &'static str {
    match environment {
        Environment::Development => "debug",
        Environment::Production => "info",
    }
}

/// Initialize the global tracing subscriber.
///
/// Calling this more than once is harmless; later calls keep the first
/// subscriber.
pub fn init(settings: &Settings) -> anyhow::Result<()> {
    let directive = filter_directive(settings);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter '{}'", directive))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match (settings.telemetry.log_format, settings.environment) {
        (LogFormat::Json, _) => builder.json().try_init().is_ok(),
        (LogFormat::Pretty, Environment::Development) => builder.with_target(true).try_init().is_ok(),
        (LogFormat::Pretty, Environment::Production) => {
            builder.compact().with_target(false).try_init().is_ok()
        }
    };

    if installed {
        tracing::info!(
            target: "bib-telemetry",
            environment = settings.environment.as_str(),
            filter = %directive,
            "logging configured"
        );
    }

    Ok(())
}
