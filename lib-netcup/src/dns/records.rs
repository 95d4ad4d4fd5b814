use super::errors::HookErrors;
use super::session::SessionManager;
use super::types::{
    filter_records_for_type, Action, DnsRecord, DnsRecordSet, DnsRecordsData,
    InfoDnsRecordsParams, UpdateDnsRecordsParams,
};

/// Reads and writes the record set of a domain, one session per call.
#[derive(Debug, Clone)]
pub struct RecordRepository {
    sessions: SessionManager,
}

impl RecordRepository {
    pub fn new(sessions: SessionManager) -> Self {
        RecordRepository { sessions }
    }

    /// All records of `domain`, or only those whose type matches `type_filter`
    /// (case-insensitive) when it is not empty.
    pub async fn list_records(
        &self,
        domain: &str,
        type_filter: &str,
    ) -> Result<Vec<DnsRecord>, HookErrors> {
        let records = self
            .sessions
            .with_session(domain, |transport, session| async move {
                let params = InfoDnsRecordsParams {
                    domainname: domain,
                    apisessionid: session.as_str(),
                };
                let data: DnsRecordsData =
                    transport.send(Action::InfoDnsRecords, &params).await?;
                Ok(data.dnsrecords)
            })
            .await?;
        tracing::debug!(domain, count = records.len(), "Fetched DNS records");
        Ok(filter_records_for_type(records, type_filter))
    }

    /// Submits `records` as one bulk update and returns the registrar's record set afterwards.
    ///
    /// The call is authoritative: callers must include every record that has to survive.
    /// An empty list only reads the current set.
    pub async fn replace_records(
        &self,
        records: &[DnsRecord],
        domain: &str,
    ) -> Result<Vec<DnsRecord>, HookErrors> {
        if records.is_empty() {
            return self.list_records(domain, "").await;
        }

        tracing::debug!(domain, count = records.len(), "Submitting DNS record set");
        self.sessions
            .with_session(domain, |transport, session| async move {
                let params = UpdateDnsRecordsParams {
                    domainname: domain,
                    apisessionid: session.as_str(),
                    dnsrecordset: DnsRecordSet {
                        dnsrecords: records,
                    },
                };
                let data: DnsRecordsData =
                    transport.send(Action::UpdateDnsRecords, &params).await?;
                Ok(data.dnsrecords)
            })
            .await
    }
}
