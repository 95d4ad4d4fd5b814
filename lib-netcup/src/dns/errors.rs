use base64::DecodeError;
use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeError;
use thiserror::Error;

/// Represents all possible errors that can occur while talking to the netcup DNS API
/// or while preparing a DNS-01 challenge.
///
/// # Variants
///
/// - `RequestFailed`: The HTTP layer failed (connection, TLS, non-2xx status, unreadable body).
/// - `SerdeError`: A request could not be serialized or a response body was not the expected JSON.
/// - `RequestIdMismatch`: The `clientrequestid` echoed by the registrar is not the one that was sent.
///   The response belongs to another request (redirect, proxy, race) and must not be trusted.
/// - `RegistrarRejected`: The registrar answered with a status other than `success`. Carries the
///   registrar's status code, messages and the raw envelope for diagnostics.
/// - `MissingResponseData`: A successful response lacked a field the action is documented to return.
/// - `ResolveError`: The reference resolver could not be queried.
/// - `InvalidCredentials`: The credentials file decoded but is missing one of `key`, `pw`, `id`.
/// - `ChallengeNotPublished`: The registrar accepted the update but the challenge record is absent
///   from the returned record set.
/// - `ChallengeNotRemoved`: Challenge records survived a delete request.

#[derive(Debug, Error)]
pub enum HookErrors {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] ReqwestError),

    #[error("Serialization or deserialization error using Serde: {0}")]
    SerdeError(#[from] SerdeError),

    #[error("Mismatched client request ID for '{action}', corrupt response (sent {expected}, got {received:?})")]
    RequestIdMismatch {
        action: String,
        expected: String,
        received: Option<String>,
    },

    #[error("Registrar rejected '{action}' with status '{status}' ({status_code:?}): {short_message} {long_message}")]
    RegistrarRejected {
        action: String,
        status: String,
        status_code: Option<i64>,
        short_message: String,
        long_message: String,
        payload: serde_json::Value,
    },

    #[error("Response to '{action}' is missing '{field}'")]
    MissingResponseData {
        action: String,
        field: &'static str,
    },

    #[error("Credentials are incomplete: '{0}' is empty")]
    InvalidCredentials(&'static str),

    #[error("Data decoding error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("OpenSSL related error: {0}")]
    ErrorStack(#[from] openssl::error::ErrorStack),

    #[error("Error in parsing url")]
    ParseError(#[from] url::ParseError),

    #[error("DNS lookup failed: {0}")]
    ResolveError(#[from] hickory_resolver::error::ResolveError),

    #[error("Error in opening/reading file: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Challenge record for '{domain}' is missing from the registrar's record set")]
    ChallengeNotPublished { domain: String },

    #[error("Challenge records for '{domain}' survived the delete request")]
    ChallengeNotRemoved { domain: String },
}

impl HookErrors {
    /// True when the registrar answered, but the answer was wrong or negative.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            HookErrors::RequestIdMismatch { .. }
                | HookErrors::RegistrarRejected { .. }
                | HookErrors::MissingResponseData { .. }
        )
    }

    /// True when no usable answer came back at all.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, HookErrors::RequestFailed(_) | HookErrors::SerdeError(_))
    }
}
