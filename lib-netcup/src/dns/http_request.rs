use openssl::hash::{hash, MessageDigest};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use super::credentials::Credentials;
use super::errors::HookErrors;
use super::types::{Action, ResponseEnvelope};

const APPLICATION_JSON: &str = "application/json";
const STATUS_SUCCESS: &str = "success";

/// Sends single actions to the registrar endpoint.
///
/// Every request carries the API key and customer number and is stamped with a
/// `clientrequestid`; the echoed id and the status of the answer are checked before
/// `responsedata` is handed back. Nothing is retried.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
}

impl Transport {
    pub fn new(endpoint: Url, credentials: Credentials) -> Self {
        Transport {
            client: Client::new(),
            endpoint,
            credentials,
        }
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Posts `action` with `params` and decodes the `responsedata` of a successful answer.
    pub(crate) async fn send<P, R>(&self, action: Action, params: &P) -> Result<R, HookErrors>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let (body, request_id) = self.envelope(action, params)?;
        tracing::debug!(action = %action, client_request_id = %request_id, "Sending registrar request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, APPLICATION_JSON)
            .body(serde_json::to_vec(&body)?)
            .send()
            .await?
            .error_for_status()?;
        let envelope: ResponseEnvelope = response.json().await?;

        let data = validate_response(action, &request_id, envelope)?;
        tracing::trace!(action = %action, "Registrar request succeeded");
        Ok(serde_json::from_value(data)?)
    }

    fn envelope<P: Serialize>(&self, action: Action, params: &P) -> Result<(Value, String), HookErrors> {
        let Value::Object(mut param) = serde_json::to_value(params)? else {
            return Err(serde_json::Error::custom("action parameters must be a JSON object").into());
        };
        param.insert(
            "apikey".to_string(),
            Value::String(self.credentials.api_key().to_string()),
        );
        param.insert(
            "customernumber".to_string(),
            Value::String(self.credentials.customer_id().to_string()),
        );

        let mut body = json!({
            "action": action.as_str(),
            "param": param,
        });
        let request_id = client_request_id(action, &body)?;
        body["param"]["clientrequestid"] = Value::String(request_id.clone());
        Ok((body, request_id))
    }
}

/// Lowercase action name followed by the MD5 of the serialized request.
///
/// The id only serves to match answers to requests; identical bodies yield identical ids.
pub(crate) fn client_request_id(action: Action, request: &Value) -> Result<String, HookErrors> {
    let digest = hash(MessageDigest::md5(), &serde_json::to_vec(request)?)?;
    Ok(format!(
        "{}{}",
        action.as_str().to_lowercase(),
        hex::encode(digest)
    ))
}

pub(crate) fn validate_response(
    action: Action,
    expected_id: &str,
    envelope: ResponseEnvelope,
) -> Result<Value, HookErrors> {
    if envelope.clientrequestid.as_deref() != Some(expected_id) {
        tracing::error!(action = %action, "Mismatched client request ID, corrupt response");
        return Err(HookErrors::RequestIdMismatch {
            action: action.to_string(),
            expected: expected_id.to_string(),
            received: envelope.clientrequestid,
        });
    }
    if envelope.status != STATUS_SUCCESS {
        tracing::error!(
            action = %action,
            status = %envelope.status,
            status_code = ?envelope.statuscode,
            message = %envelope.longmessage,
            "Registrar request failed"
        );
        let payload = json!({
            "status": envelope.status,
            "statuscode": envelope.statuscode,
            "shortmessage": envelope.shortmessage,
            "longmessage": envelope.longmessage,
            "responsedata": envelope.responsedata,
        });
        return Err(HookErrors::RegistrarRejected {
            action: action.to_string(),
            status: envelope.status,
            status_code: envelope.statuscode,
            short_message: envelope.shortmessage,
            long_message: envelope.longmessage,
            payload,
        });
    }
    Ok(envelope.responsedata)
}
