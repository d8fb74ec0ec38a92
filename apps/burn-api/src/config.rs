//! Server configuration from flags and environment

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments, each with an environment fallback
#[derive(Parser, Debug, Clone)]
#[command(name = "burn-api")]
#[command(about = "Burn form fields into PDFs and record an audit trail")]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8090")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory that receives burned PDFs
    #[arg(long, env = "STORAGE_DIR", default_value = "./storage")]
    pub storage_dir: PathBuf,

    /// SQLite connection string for the audit trail
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Base for returned file URLs; derived from request headers when unset
    #[arg(long, env = "PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Comma-separated allowed origins; any origin when empty
    #[arg(long, env = "CORS_ORIGIN", default_value = "")]
    pub cors_origin: String,

    /// Maximum request body size in megabytes
    #[arg(long, env = "BODY_LIMIT_MB", default_value = "25")]
    pub body_limit_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_origin
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.saturating_mul(1024 * 1024)
    }
}
