//! In-memory stand-in for the netcup JSON endpoint.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use lib_netcup::dns::{ChallengeManager, Credentials, DnsRecord, HookConfig};
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const API_PASSWORD: &str = "test-password";
pub const CUSTOMER_ID: &str = "12345";
pub const DOMAIN: &str = "example.com";

/// How `updateDnsRecords` treats the submitted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSemantics {
    /// New records are added, known ids updated, flagged records deleted; the rest stays.
    Additive,
    /// The submitted set (minus flagged records) becomes the whole zone.
    Replace,
}

#[derive(Debug)]
struct State {
    semantics: UpdateSemantics,
    records: Vec<DnsRecord>,
    next_id: u32,
    writes: usize,
    logins: usize,
    logouts: usize,
    open_sessions: HashSet<String>,
    failing_action: Option<String>,
    corrupt_request_ids: bool,
}

#[derive(Debug, Clone)]
pub struct FakeRegistrar {
    state: Arc<Mutex<State>>,
}

impl FakeRegistrar {
    pub fn new(semantics: UpdateSemantics, records: Vec<DnsRecord>) -> Self {
        FakeRegistrar {
            state: Arc::new(Mutex::new(State {
                semantics,
                records,
                next_id: 100,
                writes: 0,
                logins: 0,
                logouts: 0,
                open_sessions: HashSet::new(),
                failing_action: None,
                corrupt_request_ids: false,
            })),
        }
    }

    pub async fn start(&self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(self.clone())
            .mount(&server)
            .await;
        server
    }

    pub fn fail_action(&self, action: &str) {
        self.state.lock().unwrap().failing_action = Some(action.to_string());
    }

    pub fn corrupt_request_ids(&self) {
        self.state.lock().unwrap().corrupt_request_ids = true;
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn challenge_values(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.hostname == "_acme-challenge" && r.record_type == "TXT")
            .map(|r| r.destination)
            .collect()
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn logins(&self) -> usize {
        self.state.lock().unwrap().logins
    }

    pub fn logouts(&self) -> usize {
        self.state.lock().unwrap().logouts
    }

    pub fn open_sessions(&self) -> usize {
        self.state.lock().unwrap().open_sessions.len()
    }
}

impl State {
    fn handle(&mut self, action: &str, param: &Value) -> Result<Value, (i64, &'static str)> {
        if param["apikey"] != API_KEY || param["customernumber"] != CUSTOMER_ID {
            return Err((4013, "Api key or customer number invalid."));
        }
        if self.failing_action.as_deref() == Some(action) {
            return Err((5029, "Can not complete the request."));
        }

        match action {
            "login" => {
                if param["apipassword"] != API_PASSWORD {
                    return Err((4013, "Api password invalid."));
                }
                self.logins += 1;
                let session = format!("session-{}", self.logins);
                self.open_sessions.insert(session.clone());
                Ok(json!({ "apisessionid": session }))
            }
            "logout" => {
                self.require_session(param)?;
                let session = param["apisessionid"].as_str().unwrap_or_default();
                self.open_sessions.remove(session);
                self.logouts += 1;
                Ok(json!(""))
            }
            "infoDnsRecords" => {
                self.require_session(param)?;
                Ok(json!({ "dnsrecords": self.records }))
            }
            "updateDnsRecords" => {
                self.require_session(param)?;
                let submitted: Vec<DnsRecord> =
                    serde_json::from_value(param["dnsrecordset"]["dnsrecords"].clone())
                        .map_err(|_| (4013, "Invalid record set."))?;
                self.writes += 1;
                self.apply(submitted);
                Ok(json!({ "dnsrecords": self.records }))
            }
            _ => Err((4013, "Unknown action.")),
        }
    }

    fn require_session(&self, param: &Value) -> Result<(), (i64, &'static str)> {
        let session = param["apisessionid"].as_str().unwrap_or_default();
        if self.open_sessions.contains(session) {
            Ok(())
        } else {
            Err((4001, "The session id is not in a valid format."))
        }
    }

    fn apply(&mut self, submitted: Vec<DnsRecord>) {
        match self.semantics {
            UpdateSemantics::Additive => {
                for record in submitted {
                    if record.deleterecord {
                        self.records.retain(|existing| existing.id != record.id);
                    } else if record.id.is_empty() {
                        let stored = self.stored(record);
                        self.records.push(stored);
                    } else if let Some(existing) =
                        self.records.iter_mut().find(|existing| existing.id == record.id)
                    {
                        *existing = record;
                    }
                }
            }
            UpdateSemantics::Replace => {
                let kept: Vec<DnsRecord> = submitted
                    .into_iter()
                    .filter(|record| !record.deleterecord)
                    .collect();
                let mut zone = Vec::with_capacity(kept.len());
                for record in kept {
                    if record.id.is_empty() {
                        zone.push(self.stored(record));
                    } else {
                        zone.push(record);
                    }
                }
                self.records = zone;
            }
        }
    }

    fn stored(&mut self, record: DnsRecord) -> DnsRecord {
        self.next_id += 1;
        DnsRecord {
            id: self.next_id.to_string(),
            priority: "0".to_string(),
            ..record
        }
    }
}

impl Respond for FakeRegistrar {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return ResponseTemplate::new(400);
        };
        let action = body["action"].as_str().unwrap_or_default().to_string();
        let param = &body["param"];

        let mut state = self.state.lock().unwrap();
        let request_id = if state.corrupt_request_ids {
            json!("corrupted")
        } else {
            param["clientrequestid"].clone()
        };

        let envelope = match state.handle(&action, param) {
            Ok(data) => json!({
                "serverrequestid": "server-1",
                "clientrequestid": request_id,
                "action": action,
                "status": "success",
                "statuscode": 2000,
                "shortmessage": "Request successful",
                "longmessage": "",
                "responsedata": data
            }),
            Err((code, message)) => json!({
                "serverrequestid": "server-1",
                "clientrequestid": request_id,
                "action": action,
                "status": "error",
                "statuscode": code,
                "shortmessage": "Request failed",
                "longmessage": message,
                "responsedata": ""
            }),
        };
        ResponseTemplate::new(200).set_body_json(envelope)
    }
}

pub fn record(id: &str, hostname: &str, record_type: &str, destination: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        hostname: hostname.to_string(),
        record_type: record_type.to_string(),
        priority: "0".to_string(),
        destination: destination.to_string(),
        deleterecord: false,
        state: "yes".to_string(),
    }
}

/// A small zone without any challenge record.
pub fn base_zone() -> Vec<DnsRecord> {
    vec![
        record("1", "@", "A", "192.0.2.10"),
        record("2", "www", "CNAME", "@"),
        record("3", "@", "TXT", "v=spf1 mx -all"),
    ]
}

pub fn config(server: &MockServer) -> HookConfig {
    HookConfig::default()
        .with_endpoint(&server.uri())
        .expect("mock server uri is a valid URL")
}

pub fn manager(server: &MockServer) -> ChallengeManager {
    let credentials = Credentials::new(API_KEY, API_PASSWORD, CUSTOMER_ID).unwrap();
    ChallengeManager::new(&config(server), credentials)
}
