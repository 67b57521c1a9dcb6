use crate::error::KeygateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inbound lookup parameters, as sent in the query string.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub credential_type: Option<String>,
}

impl CredentialRequest {
    pub fn new(device_id: impl Into<String>, credential_type: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
            credential_type: Some(credential_type.into()),
        }
    }

    /// Both fields must be present and non-empty.
    pub fn validate(&self) -> Result<(&str, &str), KeygateError> {
        let device_id = self.device_id.as_deref().filter(|s| !s.is_empty());
        let credential_type = self.credential_type.as_deref().filter(|s| !s.is_empty());
        match (device_id, credential_type) {
            (Some(d), Some(t)) => Ok((d, t)),
            _ => Err(KeygateError::Validation),
        }
    }
}

/// Success body: `{ "deviceId", "type", "value" }`.
#[derive(Clone, Serialize, PartialEq)]
pub struct CredentialResponse {
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub value: String,
}

impl fmt::Debug for CredentialResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResponse")
            .field("device_id", &self.device_id)
            .field("credential_type", &self.credential_type)
            .field("value", &"<redacted>")
            .finish()
    }
}
