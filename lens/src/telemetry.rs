//! Tracing subscriber setup
//!
//! Filter precedence: `RUST_LOG`, then the CLI/env override, then the
//! config file value.

use lens_config::{LogConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
pub fn init(config: &LogConfig, filter_override: Option<&str>) -> anyhow::Result<()> {
    let directive = filter_override.unwrap_or(&config.filter);
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directive))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}
