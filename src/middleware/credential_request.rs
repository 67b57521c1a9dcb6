use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use tracing::warn;

use crate::error::KeygateError;
use crate::types::credential::CredentialRequest;

/// Query-string extractor for `/credentials`.
///
/// An undecodable query string is reported like missing parameters, so every
/// rejection carries the same JSON body as the rest of the API.
pub struct CredentialQuery(pub CredentialRequest);

impl<S> FromRequestParts<S> for CredentialQuery
where
    S: Send + Sync,
{
    type Rejection = KeygateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<CredentialRequest>::from_request_parts(parts, state).await {
            Ok(Query(request)) => Ok(CredentialQuery(request)),
            Err(rejection) => {
                warn!(error = %rejection, "rejected undecodable query string");
                Err(KeygateError::Validation)
            }
        }
    }
}
