//! Data availability layer access.

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::{
    error::FdcError,
    types::{ProofRequest, ProofResponse},
};

/// Path of the raw proof query relative to the DA layer base URL.
pub const PROOF_BY_REQUEST_ROUND_PATH: &str = "api/v1/fdc/proof-by-request-round-raw";

/// Serves proofs for finalized attestation requests.
pub trait DaLayer {
    /// Query the proof of `request`.
    ///
    /// With `strict` set, a non-200 status is an error. Otherwise it means the
    /// proof is not available yet and an empty [`ProofResponse`] is returned.
    fn proof_by_request_round(
        &self,
        request: &ProofRequest,
        strict: bool,
    ) -> impl Future<Output = Result<ProofResponse, FdcError>>;
}

/// HTTP client of the DA layer.
#[derive(Clone, derive_more::Debug)]
pub struct DaLayerClient {
    client: reqwest::Client,
    url: Url,
    #[debug(skip)]
    api_key: Option<String>,
}

impl DaLayerClient {
    /// Client posting to the given endpoint as is.
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self {
            client,
            url,
            api_key: None,
        }
    }

    /// Client of the raw proof endpoint under the given DA layer base URL.
    pub fn for_base_url(client: reqwest::Client, base_url: &Url) -> Result<Self, FdcError> {
        Ok(Self::new(client, proof_endpoint(base_url)?))
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl DaLayer for DaLayerClient {
    async fn proof_by_request_round(
        &self,
        request: &ProofRequest,
        strict: bool,
    ) -> Result<ProofResponse, FdcError> {
        let mut builder = self.client.post(self.url.clone()).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("X-API-KEY", api_key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            if strict {
                return Err(FdcError::http_status(status));
            }
            debug!(%status, voting_round_id = request.voting_round_id, "Proof not available yet");
            return Ok(ProofResponse::pending());
        }
        if strict {
            debug!("Response status is OK");
        }

        Ok(response.json().await?)
    }
}

/// Raw proof endpoint under the given DA layer base URL.
pub fn proof_endpoint(base_url: &Url) -> Result<Url, FdcError> {
    crate::join_url(base_url, PROOF_BY_REQUEST_ROUND_PATH)
}
