// # ddnsd - one-shot DDNS updater
//
// Thin integration layer: parse flags, set up logging, wire the
// collaborators into `DdnsEngine` and run a single check-and-update cycle.
// All update logic lives in ddns-core.
//
// Intended to be run periodically by an external scheduler (cron, systemd
// timer). A failed run is retried by the next scheduled invocation.
//
// ## Configuration
//
// Every flag can also be given through the environment:
//
// - `--account` / `DDNS_CF_ACCOUNT`: Cloudflare account e-mail (required)
// - `--api-key` / `DDNS_CF_API_KEY`: Cloudflare global API key (required)
// - `--zone` / `DDNS_CF_ZONE`: Zone holding the hosts (required)
// - `--host` / `DDNS_CF_HOSTS`: Host to update; repeat the flag or
//   comma-separate the variable (at least one required)
// - `--wan-ip-source` / `DDNS_WAN_IP_SOURCE`: Plain-text IP service
// - `--state-file` / `DDNS_STATE_FILE`: State file path
// - `--api-base` / `DDNS_CF_API_BASE`: Cloudflare API base URL
// - `--verbose`: Debug-level logging
// - `--log-level` / `DDNS_LOG_LEVEL`: Explicit log level (wins over --verbose)
//
// ## Example
//
// ```bash
// ddnsd --account me@example.com --api-key "$CF_KEY" \
//       --zone example.com --host home.example.com --host nas.example.com
// ```
//
// Delete the state file to force a full update on the next run.

use anyhow::Result;
use clap::Parser;
use ddns_core::config::DEFAULT_WAN_IP_SOURCE;
use ddns_core::{DdnsEngine, FileStateStore, RunOutcome, UpdaterConfig};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::{CLOUDFLARE_API_BASE, CloudflareProvider};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Run succeeded (IP unchanged, or every host updated)
/// - 1: Configuration or startup error
/// - 2: Run-time error in the update pipeline
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Run completed successfully
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The update pipeline failed
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Point Cloudflare A records at this machine's current WAN IP.
#[derive(Parser)]
#[command(name = "ddnsd", version, about, long_about = None)]
struct Args {
    /// Cloudflare account e-mail
    #[arg(long, env = "DDNS_CF_ACCOUNT")]
    account: String,

    /// Global API key from My Account > API Keys
    #[arg(long, env = "DDNS_CF_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Name of the zone containing the hosts to update
    #[arg(long, env = "DDNS_CF_ZONE")]
    zone: String,

    /// Host entry to update (repeatable)
    #[arg(
        long = "host",
        env = "DDNS_CF_HOSTS",
        value_delimiter = ',',
        required = true
    )]
    hosts: Vec<String>,

    /// URL of a service returning the WAN IP as the entire response body
    #[arg(long, env = "DDNS_WAN_IP_SOURCE", default_value = DEFAULT_WAN_IP_SOURCE)]
    wan_ip_source: String,

    /// Path of the state file [default: ./cloudflare-ddns-saved.json]
    #[arg(long, env = "DDNS_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Cloudflare API base URL
    #[arg(long, env = "DDNS_CF_API_BASE", default_value = CLOUDFLARE_API_BASE)]
    api_base: String,

    /// Enable verbose logging output
    #[arg(long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        env = "DDNS_LOG_LEVEL",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: Option<String>,
}

impl Args {
    fn log_level(&self) -> Level {
        match self.log_level.as_deref() {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            Some("warn") => Level::WARN,
            Some("error") => Level::ERROR,
            Some(_) => Level::INFO,
            None if self.verbose => Level::DEBUG,
            None => Level::INFO,
        }
    }

    fn updater_config(&self) -> UpdaterConfig {
        UpdaterConfig::new(self.zone.trim()).with_hosts(self.hosts.iter().map(|h| h.trim()))
    }
}

fn main() -> ExitCode {
    // Missing required flags print usage and exit before any network activity
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let engine = match build_engine(&args) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    match rt.block_on(engine.run_once()) {
        Ok(RunOutcome::Unchanged { ip }) => {
            info!("WAN IP {} already applied", ip);
            DdnsExitCode::Success.into()
        }
        Ok(RunOutcome::Updated { hosts, new_ip, .. }) => {
            info!("Updated {} -> {}", hosts.join(", "), new_ip);
            DdnsExitCode::Success.into()
        }
        Err(e) => {
            error!("Update failed: {}", e);
            DdnsExitCode::RuntimeError.into()
        }
    }
}

/// Wire the collaborators described by `args` into an engine
fn build_engine(args: &Args) -> Result<DdnsEngine> {
    let state_store = match &args.state_file {
        Some(path) => FileStateStore::new(path),
        None => FileStateStore::in_working_dir()?,
    };
    info!("State file: {}", state_store.path().display());

    let ip_source = HttpIpSource::new(args.wan_ip_source.clone())?;
    let provider = CloudflareProvider::with_api_base(
        args.account.clone(),
        args.api_key.clone(),
        args.api_base.clone(),
    )?;

    let engine = DdnsEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        Box::new(state_store),
        args.updater_config(),
    )?;

    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const REQUIRED: [&str; 7] = [
        "ddnsd",
        "--account",
        "me@example.com",
        "--api-key",
        "key",
        "--zone",
        "example.com",
    ];

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(REQUIRED.iter().chain(extra).copied())
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn repeated_hosts_keep_their_order() {
        let args = parse(&["--host", "home", "--host", "nas"]).unwrap();
        let config = args.updater_config();

        assert_eq!(config.zone_name, "example.com");
        assert_eq!(config.hosts, vec!["home", "nas"]);
        assert_eq!(args.wan_ip_source, DEFAULT_WAN_IP_SOURCE);
        assert_eq!(args.api_base, CLOUDFLARE_API_BASE);
    }

    #[test]
    fn comma_separated_hosts_are_split() {
        let args = parse(&["--host", "home,nas"]).unwrap();
        assert_eq!(args.hosts, vec!["home", "nas"]);
    }

    #[test]
    fn missing_host_is_a_usage_error() {
        let err = parse(&[]).err().expect("host is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn verbose_selects_debug_unless_level_given() {
        let args = parse(&["--host", "home"]).unwrap();
        assert_eq!(args.log_level(), Level::INFO);

        let args = parse(&["--host", "home", "--verbose"]).unwrap();
        assert_eq!(args.log_level(), Level::DEBUG);

        let args = parse(&["--host", "home", "--verbose", "--log-level", "warn"]).unwrap();
        assert_eq!(args.log_level(), Level::WARN);
    }

    #[test]
    fn build_engine_rejects_blank_host() {
        let path = std::env::temp_dir().join("ddnsd-state.json");
        let state = path.to_string_lossy().into_owned();
        let args = parse(&["--host", " ", "--state-file", &state]).unwrap();

        assert!(build_engine(&args).is_err());
    }
}
