//! netcup DNS API client for DNS-01 challenges.
//!
//! Layering, leaf first: [`http_request::Transport`] sends single actions,
//! [`session::SessionManager`] scopes them in a login/logout pair,
//! [`records::RecordRepository`] reads and writes record sets,
//! [`challenge::ChallengeManager`] handles the `_acme-challenge` record and
//! [`propagation::PropagationChecker`] watches a public resolver.

pub mod challenge;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod http_request;
pub mod propagation;
pub mod records;
pub mod session;
pub mod types;

pub use challenge::ChallengeManager;
pub use config::HookConfig;
pub use credentials::Credentials;
pub use errors::HookErrors;
pub use propagation::{PropagationChecker, TxtLookup};
pub use records::RecordRepository;
pub use types::{DnsRecord, HookMode};
