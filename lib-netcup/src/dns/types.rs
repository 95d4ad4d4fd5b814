use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull};
use std::fmt::Display;

/// Record type used for DNS-01 challenges.
pub const TXT: &str = "TXT";

/// Actions of the netcup CCP API used by the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Logout,
    InfoDnsRecords,
    UpdateDnsRecords,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Login => "login",
            Action::Logout => "logout",
            Action::InfoDnsRecords => "infoDnsRecords",
            Action::UpdateDnsRecords => "updateDnsRecords",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record as the registrar stores it.
///
/// `id` is empty for records that do not exist yet. `deleterecord` is an
/// intent flag: a record submitted with it set is removed by the registrar.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub id: String,
    pub hostname: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub priority: String,
    pub destination: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub deleterecord: bool,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub state: String,
}

impl DnsRecord {
    /// A not-yet-existing TXT record.
    pub fn new_txt(hostname: &str, destination: &str) -> Self {
        DnsRecord {
            id: String::new(),
            hostname: hostname.to_string(),
            record_type: TXT.to_string(),
            priority: String::new(),
            destination: destination.to_string(),
            deleterecord: false,
            state: "yes".to_string(),
        }
    }

    /// Copy of this record flagged for deletion.
    pub fn marked_for_deletion(&self) -> Self {
        DnsRecord {
            deleterecord: true,
            ..self.clone()
        }
    }

    pub fn is_type(&self, record_type: &str) -> bool {
        self.record_type.eq_ignore_ascii_case(record_type)
    }
}

/// Keeps records whose type matches `type_filter` case-insensitively.
/// An empty filter keeps everything.
pub fn filter_records_for_type(records: Vec<DnsRecord>, type_filter: &str) -> Vec<DnsRecord> {
    if type_filter.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| record.is_type(type_filter))
        .collect()
}

/// Envelope the registrar answers every action with.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResponseEnvelope {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) clientrequestid: Option<String>,
    #[serde(default)]
    pub(crate) statuscode: Option<i64>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub(crate) shortmessage: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub(crate) longmessage: String,
    #[serde(default)]
    pub(crate) responsedata: Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginParams<'a> {
    pub(crate) apipassword: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub(crate) apisessionid: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LogoutParams<'a> {
    pub(crate) apisessionid: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct InfoDnsRecordsParams<'a> {
    pub(crate) domainname: &'a str,
    pub(crate) apisessionid: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateDnsRecordsParams<'a> {
    pub(crate) domainname: &'a str,
    pub(crate) apisessionid: &'a str,
    pub(crate) dnsrecordset: DnsRecordSet<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DnsRecordSet<'a> {
    pub(crate) dnsrecords: &'a [DnsRecord],
}

/// `responsedata` of `infoDnsRecords` and `updateDnsRecords`.
#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct DnsRecordsData {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub(crate) dnsrecords: Vec<DnsRecord>,
}

/// What the ACME client asked the hook to do.
#[derive(Debug, PartialEq, Clone)]
pub enum HookMode {
    Update,
    Clean,
    Unknown(String), // anything else is ignored
}

impl From<&str> for HookMode {
    fn from(mode: &str) -> Self {
        match mode {
            "update" => HookMode::Update,
            "clean" => HookMode::Clean,
            other => HookMode::Unknown(other.to_string()),
        }
    }
}

impl Display for HookMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookMode::Update => write!(f, "update"),
            HookMode::Clean => write!(f, "clean"),
            HookMode::Unknown(other) => write!(f, "{}", other),
        }
    }
}
