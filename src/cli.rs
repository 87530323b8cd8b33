use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::{ServerConfig, SlizzConfig};

#[derive(Parser, Debug)]
#[command(name = "slizzai")]
#[command(about = "Run the SlizzAi asset-processing pipeline")]
#[command(version)]
pub struct Args {
    /// Engine asset path to import and process [default: the configured default asset]
    #[arg(long, value_name = "PATH")]
    pub asset: Option<String>,

    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Enable verbose logging output (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Serve the pipeline over HTTP instead of running once
    #[arg(long)]
    pub serve: bool,

    /// Override the configured bind address
    #[arg(long, value_name = "ADDR")]
    pub bind_addr: Option<String>,

    /// Override the configured port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the configured request concurrency limit
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,
}

impl Args {
    /// Asset to process: `--asset` when given, otherwise the configured default
    pub fn asset_path<'a>(&'a self, config: &'a SlizzConfig) -> &'a str {
        self.asset.as_deref().unwrap_or(&config.default_asset)
    }

    /// Server settings after applying command-line overrides
    pub fn server_config(&self, configured: &ServerConfig) -> ServerConfig {
        ServerConfig {
            bind_addr: self
                .bind_addr
                .clone()
                .unwrap_or_else(|| configured.bind_addr.clone()),
            port: self.port.unwrap_or(configured.port),
            max_concurrent: self.max_concurrent.unwrap_or(configured.max_concurrent),
        }
    }

    /// Log filter derived from `-v`
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

// ============================================================================
// SBIO: Pure display logic (no I/O - returns formatted strings)
// ============================================================================

use crate::provenance::BuildInfo;
use crate::runtime::StageResults;

/// Format the end-of-run summary printed by the one-shot mode.
/// Pure function - returns a formatted string.
pub fn format_run_summary(
    results: &StageResults,
    build: &BuildInfo,
    signature: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "SlizzAi v{} - Run Summary\n\n",
        env!("CARGO_PKG_VERSION")
    ));
    output.push_str(&format!("Serial Number:     {}\n", build.serial_number));
    output.push_str(&format!("Build Time (UTC):  {}\n", build.build_time));
    output.push_str(&format!("Host:              {}\n", build.host));
    output.push_str(&format!("Digital Signature: {}\n\n", signature));

    if results.is_empty() {
        output.push_str("No results: asset import failed.\n");
        return output;
    }

    let json = serde_json::to_string_pretty(results).unwrap_or_else(|_| "{}".to_string());
    output.push_str("Final Processing Results:\n");
    output.push_str(&json);
    output.push('\n');

    output
}
