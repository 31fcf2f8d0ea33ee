//! End to end attestation workflow for a single network.

use std::time::Duration;

use alloy::{
    primitives::{Bytes, U256},
    providers::Provider,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

use crate::{
    Network,
    da::DaLayerClient,
    error::FdcError,
    finality::FinalityWaiter,
    proof::ProofRetriever,
    registry::ContractRegistry,
    submit::Submitter,
    types::{AttestationRequest, ProofResponse, SubmittedRequest},
    verifier::VerifierClient,
};

/// Flare Data Connector client.
///
/// Owns the contract registry cache, so a single instance should be reused
/// for consecutive requests on the same network.
#[derive(Debug)]
pub struct FdcClient<P> {
    network: Network,
    registry: ContractRegistry<P>,
    verifier: VerifierClient,
    da: DaLayerClient,
    retriever: ProofRetriever,
    tx_timeout: Option<Duration>,
    max_fee: Option<U256>,
}

impl<P: Provider + Clone> FdcClient<P> {
    pub fn new(network: Network, provider: P, verifier: VerifierClient, da: DaLayerClient) -> Self {
        let retriever = ProofRetriever::default().with_waiter(FinalityWaiter::new(
            network.protocol_id(),
            FinalityWaiter::default().interval(),
        ));
        Self {
            registry: ContractRegistry::new(&network, provider),
            network,
            verifier,
            da,
            retriever,
            tx_timeout: None,
            max_fee: None,
        }
    }

    pub fn with_retriever(mut self, retriever: ProofRetriever) -> Self {
        self.retriever = retriever;
        self
    }

    /// Give up waiting for the submission receipt after `timeout`.
    pub fn with_tx_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tx_timeout = timeout;
        self
    }

    /// Refuse to pay request fees above `max_fee` wei.
    pub fn with_max_fee(mut self, max_fee: Option<U256>) -> Self {
        self.max_fee = max_fee;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn registry(&self) -> &ContractRegistry<P> {
        &self.registry
    }

    /// Have the verifier at `url` ABI encode `request`.
    ///
    /// Requests the verifier does not consider valid are rejected.
    pub async fn prepare_request(
        &self,
        url: &Url,
        request: &AttestationRequest,
    ) -> Result<Bytes, FdcError> {
        let prepared = self.verifier.prepare_request(url, request).await?;
        if !prepared.is_valid() {
            return Err(FdcError::InvalidRequest(format!(
                "verifier rejected request: {}",
                prepared.status
            )));
        }
        prepared
            .abi_encoded_request
            .ok_or_else(|| FdcError::InvalidRequest("verifier returned no request".to_string()))
    }

    /// Submit an ABI encoded request, see [`Submitter::submit`].
    pub async fn submit(&self, abi_encoded_request: Bytes) -> Result<SubmittedRequest, FdcError> {
        Submitter::new(&self.network, &self.registry)
            .with_timeout(self.tx_timeout)
            .with_max_fee(self.max_fee)
            .submit(abi_encoded_request)
            .await
    }

    /// Wait for the request's round to finalize and fetch its proof, see
    /// [`ProofRetriever::retrieve_with_retry`].
    pub async fn retrieve_proof<S, SFut>(
        &self,
        submitted: &SubmittedRequest,
        sleep: S,
        cancel: &CancellationToken,
    ) -> Result<ProofResponse, FdcError>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
    {
        let relay = self.registry.relay().await?;
        self.retriever
            .retrieve_with_retry(
                &relay,
                &self.da,
                submitted.abi_encoded_request(),
                submitted.voting_round_id(),
                sleep,
                cancel,
            )
            .await
    }

    /// Prepare, submit and prove `request` in one go.
    pub async fn attest<S, SFut>(
        &self,
        verifier_url: &Url,
        request: &AttestationRequest,
        sleep: S,
        cancel: &CancellationToken,
    ) -> Result<(SubmittedRequest, ProofResponse), FdcError>
    where
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
    {
        let abi_encoded_request = self.prepare_request(verifier_url, request).await?;
        let submitted = self.submit(abi_encoded_request).await?;
        info!(
            voting_round_id = submitted.voting_round_id(),
            transaction_hash = %submitted.receipt().transaction_hash,
            "Attestation request submitted"
        );
        let proof = self.retrieve_proof(&submitted, sleep, cancel).await?;
        Ok((submitted, proof))
    }
}
