use std::path::PathBuf;

use clap::Parser;

/// CultureLens backend
#[derive(Debug, Parser)]
#[command(name = "lens", about = "Consent-based conversation recording and analysis API")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "lens.toml", env = "LENS_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "LENS_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Override the log filter directive
    #[arg(long, env = "LENS_LOG")]
    pub log_filter: Option<String>,
}
