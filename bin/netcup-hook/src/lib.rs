use clap::Parser;
use lib_netcup::dns::config::{HookConfig, NETCUP_ENDPOINT, RECORD_NAME_CHALLENGE};
use lib_netcup::dns::{ChallengeManager, Credentials, HookErrors, HookMode, PropagationChecker};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

const CREDENTIALS_FILE: &str = "credentials";

/// DNS-01 hook for netcup: publishes or removes `_acme-challenge` TXT records.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct CliInput {
    /// Domain the certificate is issued for
    pub domain: String,
    /// Challenge value to publish
    #[arg(allow_hyphen_values = true)]
    pub challenge: String,
    /// `update` publishes the challenge, `clean` removes all challenges
    pub mode: String,
    /// Base64-encoded JSON credentials file (defaults to `credentials` next to the executable)
    #[arg(short = 'c', long, env = "NETCUP_CREDENTIALS")]
    pub credentials: Option<PathBuf>,
    #[arg(short = 'e', long, env = "NETCUP_ENDPOINT", default_value = NETCUP_ENDPOINT)]
    pub endpoint: Url,
    #[arg(short = 'r', long, env = "NETCUP_RESOLVER", default_value = "8.8.8.8:53")]
    pub resolver: SocketAddr,
    /// Seconds to wait for the challenge to become visible
    #[arg(short = 't', long, env = "NETCUP_PROPAGATION_TIMEOUT", default_value_t = 1800)]
    pub timeout: u64,
    /// Seconds between two propagation checks
    #[arg(long, env = "NETCUP_POLL_INTERVAL", default_value_t = 10)]
    pub poll_interval: u64,
    #[arg(long, env = "NETCUP_SKIP_PROPAGATION")]
    pub skip_propagation: bool,
}

impl CliInput {
    pub fn new() -> Self {
        CliInput::parse()
    }

    pub fn mode(&self) -> HookMode {
        HookMode::from(self.mode.as_str())
    }

    pub fn config(&self) -> HookConfig {
        HookConfig {
            endpoint: self.endpoint.clone(),
            resolver: self.resolver,
            record_name: RECORD_NAME_CHALLENGE.to_string(),
            poll_interval: Duration::from_secs(self.poll_interval),
            propagation_timeout: Duration::from_secs(self.timeout),
        }
    }

    pub fn credentials_path(&self) -> Result<PathBuf, HookErrors> {
        if let Some(path) = &self.credentials {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(dir.join(CREDENTIALS_FILE))
    }
}

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Carries out the hook action selected by `args.mode`.
pub async fn run(args: CliInput) -> Result<(), HookErrors> {
    let domain = args.domain.as_str();
    match args.mode() {
        HookMode::Update => {
            let config = args.config();
            let manager = manager(&args, &config)?;
            if !manager.add_challenge(domain, &args.challenge).await? {
                return Err(HookErrors::ChallengeNotPublished {
                    domain: domain.to_string(),
                });
            }
            if args.skip_propagation {
                tracing::info!(domain, "Skipping propagation check");
                return Ok(());
            }
            let checker = PropagationChecker::new(&config);
            if !checker
                .await_propagation(domain, &args.challenge, config.propagation_timeout)
                .await
            {
                tracing::warn!(domain, "Continuing without confirmed propagation");
            }
            Ok(())
        }
        HookMode::Clean => {
            let config = args.config();
            let manager = manager(&args, &config)?;
            if !manager.remove_all_challenges(domain).await? {
                return Err(HookErrors::ChallengeNotRemoved {
                    domain: domain.to_string(),
                });
            }
            Ok(())
        }
        HookMode::Unknown(mode) => {
            tracing::warn!(domain, %mode, "Unknown mode, nothing to do");
            Ok(())
        }
    }
}

fn manager(args: &CliInput, config: &HookConfig) -> Result<ChallengeManager, HookErrors> {
    let path = args.credentials_path()?;
    tracing::debug!(path = %path.display(), "Loading credentials");
    let credentials = Credentials::from_file(&path)?;
    Ok(ChallengeManager::new(config, credentials))
}
