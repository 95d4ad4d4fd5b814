extern crate tracing;
use super::config::HookConfig;
use super::credentials::Credentials;
use super::errors::HookErrors;
use super::http_request::Transport;
use super::records::RecordRepository;
use super::session::SessionManager;
use super::types::{filter_records_for_type, DnsRecord, TXT};

/// Publishes and removes the DNS-01 challenge record of a domain.
///
/// Holds no state between calls; every operation starts from the registrar's
/// current record set.
#[derive(Debug, Clone)]
pub struct ChallengeManager {
    records: RecordRepository,
    record_name: String,
}

impl ChallengeManager {
    /// Constructs a new `ChallengeManager`.
    ///
    /// # Parameters
    /// * `config` - Endpoint and challenge record name.
    /// * `credentials` - netcup API key, API password and customer number.
    pub fn new(config: &HookConfig, credentials: Credentials) -> Self {
        let transport = Transport::new(config.endpoint.clone(), credentials);
        Self::with_repository(
            RecordRepository::new(SessionManager::new(transport)),
            &config.record_name,
        )
    }

    pub fn with_repository(records: RecordRepository, record_name: &str) -> Self {
        ChallengeManager {
            records,
            record_name: record_name.to_string(),
        }
    }

    pub fn records(&self) -> &RecordRepository {
        &self.records
    }

    /// Publishes `challenge` as a TXT record at the challenge name of `domain`.
    ///
    /// # Returns
    /// `Ok(true)` if the registrar's record set contains the challenge afterwards. Nothing
    /// is written when an identical challenge record already exists.
    pub async fn add_challenge(&self, domain: &str, challenge: &str) -> Result<bool, HookErrors> {
        let existing = self.existing_challenges(domain).await?;
        if self.lookup_challenge(&existing, challenge).is_some() {
            tracing::info!(domain, "Challenge already present, nothing to add");
            return Ok(true);
        }

        tracing::info!(domain, "Adding challenge to DNS server");
        let new_record = DnsRecord::new_txt(&self.record_name, challenge);
        let records = self
            .records
            .replace_records(std::slice::from_ref(&new_record), domain)
            .await?;

        let txt_records = filter_records_for_type(records, TXT);
        Ok(self.lookup_challenge(&txt_records, challenge).is_some())
    }

    /// Deletes every challenge record of `domain`, whatever its value.
    ///
    /// # Returns
    /// `Ok(true)` if no challenge record is left. Nothing is written when there was none.
    pub async fn remove_all_challenges(&self, domain: &str) -> Result<bool, HookErrors> {
        tracing::info!(domain, "Removing all challenges from DNS server");
        let existing = self.existing_challenges(domain).await?;
        if existing.is_empty() {
            tracing::debug!(domain, "No challenge records to remove");
            return Ok(true);
        }

        let delete_records: Vec<DnsRecord> = existing
            .iter()
            .map(DnsRecord::marked_for_deletion)
            .collect();
        let records_left = self.records.replace_records(&delete_records, domain).await?;

        let remaining = self.filter_challenges(records_left).len();
        if remaining > 0 {
            tracing::warn!(domain, remaining, "Challenge records survived deletion");
        }
        Ok(remaining == 0)
    }

    /// TXT records of `domain` whose hostname is the challenge name.
    pub async fn existing_challenges(&self, domain: &str) -> Result<Vec<DnsRecord>, HookErrors> {
        let txt_records = self.records.list_records(domain, TXT).await?;
        Ok(self.filter_challenges(txt_records))
    }

    /// Challenge records only: TXT type and the challenge hostname.
    fn filter_challenges(&self, records: Vec<DnsRecord>) -> Vec<DnsRecord> {
        filter_records_for_type(records, TXT)
            .into_iter()
            .filter(|record| record.hostname == self.record_name)
            .collect()
    }

    fn lookup_challenge<'r>(&self, records: &'r [DnsRecord], challenge: &str) -> Option<&'r DnsRecord> {
        records
            .iter()
            .find(|record| record.hostname == self.record_name && record.destination == challenge)
    }
}
