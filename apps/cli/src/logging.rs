//! Logging initialization for the CLI
//!
//! Logs always go to stderr so that anything written to stdout stays machine readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging; `RUST_LOG` overrides the level derived from `verbosity`
pub fn init_logging(verbosity: u8, json: bool) -> anyhow::Result<()> {
    let env_filter = build_env_filter(verbosity);
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr);
        subscriber.with(layer).try_init()?;
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr);
        subscriber.with(layer).try_init()?;
    }

    tracing::debug!(verbosity, json, "Logging initialized");
    Ok(())
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_for(verbosity);
        EnvFilter::new(format!(
            "fhirspec_cli={},fhirspec_extractor={},warn",
            level, level
        ))
    })
}
