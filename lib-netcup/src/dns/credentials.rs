use base64::prelude::{Engine, BASE64_STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::errors::HookErrors;

/// netcup API credentials.
///
/// Stored on disk as base64-encoded JSON `{"key": ..., "pw": ..., "id": ...}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "key")]
    api_key: String,
    #[serde(rename = "pw")]
    api_password: String,
    #[serde(rename = "id")]
    customer_id: String,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        api_password: impl Into<String>,
        customer_id: impl Into<String>,
    ) -> Result<Self, HookErrors> {
        Credentials {
            api_key: api_key.into(),
            api_password: api_password.into(),
            customer_id: customer_id.into(),
        }
        .validated()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HookErrors> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_encoded(&data)
    }

    pub fn from_encoded(data: &str) -> Result<Self, HookErrors> {
        let decoded = BASE64_STANDARD.decode(data.trim())?;
        let credentials: Credentials = serde_json::from_slice(&decoded)?;
        credentials.validated()
    }

    /// Inverse of [`Credentials::from_encoded`].
    pub fn encode(&self) -> Result<String, HookErrors> {
        Ok(BASE64_STANDARD.encode(serde_json::to_vec(self)?))
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn api_password(&self) -> &str {
        &self.api_password
    }

    pub(crate) fn customer_id(&self) -> &str {
        &self.customer_id
    }

    fn validated(self) -> Result<Self, HookErrors> {
        if self.api_key.is_empty() {
            return Err(HookErrors::InvalidCredentials("key"));
        }
        if self.api_password.is_empty() {
            return Err(HookErrors::InvalidCredentials("pw"));
        }
        if self.customer_id.is_empty() {
            return Err(HookErrors::InvalidCredentials("id"));
        }
        Ok(self)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_password", &"<redacted>")
            .field("customer_id", &"<redacted>")
            .finish()
    }
}
