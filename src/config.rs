use anyhow::{bail, Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::calendar::Calendar;
use crate::controller::Mode;
use crate::remote::DEFAULT_REMOTE_TIMEOUT_SECS;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_DATA_FILE: &str = "commerce-data.json";

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub data_file: PathBuf,
    /// `None` means the process can only run local-only
    pub remote_url: Option<String>,
    pub remote_timeout: Duration,
    pub mode_override: Option<Mode>,
    pub calendar: Calendar,
}

impl AppConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            bind,
            data_file,
            remote_url,
            remote_timeout_secs,
            mode,
            calendar_offset_minutes,
        } = args;

        let bind = match bind {
            Some(addr) => addr,
            None => DEFAULT_BIND.parse().context("invalid default bind address")?,
        };

        let remote_url = remote_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if let Some(url) = &remote_url {
            reqwest::Url::parse(url).with_context(|| format!("invalid remote base URL `{url}`"))?;
        }

        let remote_timeout_secs = remote_timeout_secs.unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS);
        if remote_timeout_secs == 0 {
            bail!("remote timeout must be at least one second");
        }

        let offset_minutes = calendar_offset_minutes.unwrap_or(0);
        let Some(calendar) = Calendar::with_offset_minutes(offset_minutes) else {
            bail!("calendar offset of {offset_minutes} minutes is out of range");
        };

        Ok(Self {
            bind,
            data_file: data_file.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            remote_url,
            remote_timeout: Duration::from_secs(remote_timeout_secs),
            mode_override: mode,
            calendar,
        })
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "commerce-analytics", about = "Dual-mode commerce data and analytics service", version)]
pub struct CliArgs {
    #[arg(long, env = "COMMERCE_BIND", value_name = "ADDR", help = "HTTP bind address")]
    pub bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "COMMERCE_DATA_FILE",
        value_name = "FILE",
        help = "JSON file holding the local products and orders"
    )]
    pub data_file: Option<PathBuf>,

    #[arg(
        long,
        env = "COMMERCE_REMOTE_URL",
        value_name = "URL",
        help = "Base URL of the remote aggregation API"
    )]
    pub remote_url: Option<String>,

    #[arg(
        long,
        env = "COMMERCE_REMOTE_TIMEOUT_SECS",
        value_name = "SECS",
        help = "Per-request timeout for remote calls",
        value_parser = clap::value_parser!(u64)
    )]
    pub remote_timeout_secs: Option<u64>,

    #[arg(
        long,
        env = "COMMERCE_DATA_MODE",
        value_name = "MODE",
        help = "Pin the data mode (remote or local), ignoring the saved preference"
    )]
    pub mode: Option<Mode>,

    #[arg(
        long,
        env = "COMMERCE_CALENDAR_OFFSET_MINUTES",
        value_name = "MINUTES",
        allow_hyphen_values = true,
        help = "Fixed UTC offset used for day, week and month boundaries"
    )]
    pub calendar_offset_minutes: Option<i32>,
}
