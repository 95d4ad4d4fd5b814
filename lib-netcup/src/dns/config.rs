use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use url::Url;

use super::errors::HookErrors;

pub const NETCUP_ENDPOINT: &str = "https://ccp.netcup.net/run/webservice/servers/endpoint.php?JSON";
pub const RECORD_NAME_CHALLENGE: &str = "_acme-challenge";
pub const EXTERNAL_REFERENCE_DNS_SERVER: IpAddr = IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8));
pub const PROPAGATION_TIMEOUT: Duration = Duration::from_secs(1800);
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Everything the hook would otherwise hard-code.
#[derive(Debug, Clone, PartialEq)]
pub struct HookConfig {
    /// JSON endpoint of the registrar API.
    pub endpoint: Url,
    /// Resolver asked whether the challenge is publicly visible.
    pub resolver: SocketAddr,
    /// Host label of the challenge record.
    pub record_name: String,
    /// Sleep between two propagation checks.
    pub poll_interval: Duration,
    /// Budget for the whole propagation wait.
    pub propagation_timeout: Duration,
}

impl HookConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, HookErrors> {
        self.endpoint = Url::parse(endpoint)?;
        Ok(self)
    }

    /// `_acme-challenge.<domain>.`
    pub fn challenge_fqdn(&self, domain: &str) -> String {
        challenge_fqdn(&self.record_name, domain)
    }
}

pub(crate) fn challenge_fqdn(record_name: &str, domain: &str) -> String {
    format!("{}.{}.", record_name, domain.trim_end_matches('.'))
}

impl Default for HookConfig {
    fn default() -> Self {
        HookConfig {
            endpoint: Url::parse(NETCUP_ENDPOINT).expect("endpoint constant is a valid URL"),
            resolver: SocketAddr::new(EXTERNAL_REFERENCE_DNS_SERVER, 53),
            record_name: RECORD_NAME_CHALLENGE.to_string(),
            poll_interval: POLL_INTERVAL,
            propagation_timeout: PROPAGATION_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HookConfig::default();
        assert_eq!(config.endpoint.host_str(), Some("ccp.netcup.net"));
        assert_eq!(config.endpoint.query(), Some("JSON"));
        assert_eq!(config.resolver.to_string(), "8.8.8.8:53");
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.propagation_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn test_challenge_fqdn() {
        let config = HookConfig::default();
        assert_eq!(
            config.challenge_fqdn("example.com"),
            "_acme-challenge.example.com."
        );
        assert_eq!(
            config.challenge_fqdn("example.com."),
            "_acme-challenge.example.com."
        );
    }

    #[test]
    fn test_bad_endpoint() {
        assert!(matches!(
            HookConfig::default().with_endpoint("not a url"),
            Err(HookErrors::ParseError(_))
        ));
    }
}
