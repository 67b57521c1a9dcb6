use crate::db::models::DbCredential;
use crate::db::store::CredentialStore;
use crate::error::KeygateError;
use crate::types::credential::{CredentialRequest, CredentialResponse};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Stateless lookup service: validate, query the store, pick one row, respond.
#[derive(Clone)]
pub struct CredentialQueryService {
    store: Arc<dyn CredentialStore>,
}

impl CredentialQueryService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        request: CredentialRequest,
    ) -> Result<CredentialResponse, KeygateError> {
        info!(
            device_id = request.device_id.as_deref().unwrap_or("<none>"),
            credential_type = request.credential_type.as_deref().unwrap_or("<none>"),
            "received credential request"
        );

        let (device_id, credential_type) = match request.validate() {
            Ok(fields) => fields,
            Err(e) => {
                warn!("bad request: missing deviceId or credentialType");
                return Err(e);
            }
        };

        let rows = match self.store.lookup(device_id, credential_type).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(device_id, credential_type, error = %e, "credential lookup failed");
                return Err(e);
            }
        };

        let Some(selected) = select_latest(rows) else {
            info!(device_id, credential_type, "no credential found");
            return Err(KeygateError::NotFound);
        };

        warn!(
            device_id,
            credential_type,
            credential_id = selected.credential_id,
            "[AUDIT] credential released for device {device_id}"
        );
        Ok(CredentialResponse {
            device_id: device_id.to_string(),
            credential_type: credential_type.to_string(),
            value: selected.value,
        })
    }
}

/// Tie-break for duplicate `(deviceId, type)` rows: the most recently created
/// row, i.e. the highest `credential_id`, regardless of the order rows arrive in.
pub(crate) fn select_latest(rows: Vec<DbCredential>) -> Option<DbCredential> {
    rows.into_iter().max_by_key(|row| row.credential_id)
}
