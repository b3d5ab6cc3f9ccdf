use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use directories::ProjectDirs;
use dotenvy::dotenv;
use serde::Deserialize;

/// Command-line overrides. The same settings can come from the
/// environment (`THEBAZ_DATA_DIR`, `THEBAZ_EXPORT_DIR`); a flag wins.
#[derive(Debug, Parser)]
#[command(name = "thebaz-invoice", about = "محرر فواتير THEBAZ SHOWROOM")]
struct Cli {
    /// Directory holding drafts and the log file
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Directory receiving exported invoices
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

/// Configuration for the application
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    data_dir: Option<PathBuf>,
    export_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize `THEBAZ_`-prefixed variables into Config
    pub fn load() -> Result<Self> {
        dotenv().ok();
        let config = envy::prefixed("THEBAZ_").from_env::<Config>()?;
        Ok(config)
    }

    /// Where drafts and the log live; defaults to the platform data dir.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Where exported documents land; defaults to `exports/` under the
    /// data directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("exports"))
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "thebaz", "invoice")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".thebaz-invoice"))
}

/// Initialize configuration: environment first, CLI flags on top.
pub fn init() -> Result<Config> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir;
    }
    if cli.export_dir.is_some() {
        config.export_dir = cli.export_dir;
    }
    Ok(config)
}
