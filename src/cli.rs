//! Command-line interface definitions for portsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing, then turns the
//! raw arguments into a validated [`ScanConfig`].

use crate::config::AppSettings;
use crate::error::{ConfigError, ConfigResult};
use crate::scanner::ScanConfig;
use crate::types::PortRange;
use clap::Parser;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// A multi-worker TCP connect port scanner.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan a range of TCP ports for open services", long_about = None)]
pub struct Cli {
    /// Target IP address or hostname to scan
    #[arg(value_name = "HOST")]
    pub host: String,

    /// The port where scanning will start
    #[arg(value_name = "START_PORT")]
    pub start_port: u32,

    /// The port where scanning will end (inclusive)
    #[arg(value_name = "END_PORT")]
    pub end_port: u32,

    /// Append open ports to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Connection timeout in seconds (fractions allowed)
    #[arg(short = 'T', long, visible_alias = "to", value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Path to a settings file
    #[arg(short, long, value_name = "PATH", env = "PORTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress the end-of-scan summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Load the settings file named by `--config`, or the default one.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        match &self.config {
            Some(path) => AppSettings::load_from(path),
            None => AppSettings::load(),
        }
    }

    /// Validate the arguments and resolve the host.
    pub async fn into_config(self, settings: &AppSettings) -> ConfigResult<ScanConfig> {
        let range = PortRange::from_bounds(self.start_port, self.end_port)?;

        let threads = self
            .threads
            .or(settings.default_threads)
            .map(|n| NonZeroUsize::new(n).ok_or(ConfigError::InvalidThreadCount))
            .transpose()?;

        let timeout = match self.timeout {
            Some(secs) => timeout_from_secs(secs)?,
            None if settings.default_timeout_ms == 0 => {
                return Err(ConfigError::InvalidTimeout(0.0));
            }
            None => Duration::from_millis(settings.default_timeout_ms),
        };

        let addr = resolve_target(&self.host).await?;

        let mut config = ScanConfig::new(self.host, addr, range).with_timeout(timeout);
        if let Some(threads) = threads {
            config = config.with_threads(threads);
        }
        if let Some(path) = self.output {
            config = config.with_output(path);
        }
        Ok(config)
    }
}

/// Convert a user-supplied number of seconds into a timeout.
pub fn timeout_from_secs(secs: f64) -> ConfigResult<Duration> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(ConfigError::InvalidTimeout(secs));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(secs))
}

/// Resolve a hostname or IP address string to an IpAddr.
pub async fn resolve_target(target: &str) -> ConfigResult<IpAddr> {
    // First, try parsing as IP address
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }

    // Otherwise, perform DNS resolution
    use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
    use trust_dns_resolver::TokioAsyncResolver;

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let response = resolver
        .lookup_ip(target)
        .await
        .map_err(|e| ConfigError::HostResolution {
            host: target.to_string(),
            reason: e.to_string(),
        })?;

    response
        .iter()
        .next()
        .ok_or_else(|| ConfigError::HostResolution {
            host: target.to_string(),
            reason: "no addresses returned".to_string(),
        })
}
