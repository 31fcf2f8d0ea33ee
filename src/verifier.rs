//! Attestation provider (verifier) HTTP API.

use reqwest::StatusCode;
use tracing::{debug, info};
use url::Url;

use crate::{
    error::FdcError,
    types::{AttestationRequest, PreparedRequest},
};

/// Client of the verifier `prepareRequest` endpoints.
#[derive(Clone, derive_more::Debug)]
pub struct VerifierClient {
    client: reqwest::Client,
    #[debug(skip)]
    api_key: String,
}

impl VerifierClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Post `request` to the verifier at `url`.
    ///
    /// Any status other than 200 is an error, the verifier verdict is
    /// returned as is in [`PreparedRequest::status`].
    pub async fn prepare_request(
        &self,
        url: &Url,
        request: &AttestationRequest,
    ) -> Result<PreparedRequest, FdcError> {
        info!(%url, "Preparing attestation request");
        debug!(?request, "Prepared request");

        let response = self
            .client
            .post(url.clone())
            .header("X-API-KEY", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FdcError::http_status(status));
        }
        debug!("Response status is OK");

        Ok(response.json().await?)
    }
}

/// Verifier endpoint preparing requests of `attestation_type` from
/// `source`, e.g. `verifier/web2/Web2Json/prepareRequest`.
pub fn prepare_request_endpoint(
    base_url: &Url,
    source: &str,
    attestation_type: &str,
) -> Result<Url, FdcError> {
    crate::join_url(
        base_url,
        &format!("verifier/{source}/{attestation_type}/prepareRequest"),
    )
}
