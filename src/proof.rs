use std::time::Duration;

use alloy::primitives::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    da::DaLayer,
    error::FdcError,
    finality::{FinalitySource, FinalityWaiter},
    poll::{self, Poller},
    retry::{self, RetryPolicy},
    types::{ProofRequest, ProofResponse, VotingRoundId},
};

/// Fetches proofs of finalized attestation requests from the DA layer.
///
/// A single attempt waits for round finality, pauses `settle_delay`, queries
/// the DA layer with strict status checking and then keeps polling every
/// `poll_interval` with relaxed status checking until the proof is ready.
/// [`Self::retrieve_with_retry`] repeats whole attempts under a [`RetryPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofRetriever {
    waiter: FinalityWaiter,
    settle_delay: Duration,
    poll_interval: Duration,
    retry: RetryPolicy,
}

impl Default for ProofRetriever {
    fn default() -> Self {
        Self {
            waiter: FinalityWaiter::default(),
            settle_delay: Duration::from_secs(10),
            poll_interval: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

impl ProofRetriever {
    pub fn with_waiter(mut self, waiter: FinalityWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn waiter(&self) -> &FinalityWaiter {
        &self.waiter
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Single retrieval attempt, see [`ProofRetriever`].
    ///
    /// The returned proof always carries the proof-ready marker.
    pub async fn retrieve<F, D, S, SFut>(
        &self,
        finality: &F,
        da: &D,
        abi_encoded_request: &Bytes,
        round_id: VotingRoundId,
        sleep: S,
        cancel: &CancellationToken,
    ) -> Result<ProofResponse, FdcError>
    where
        F: FinalitySource,
        D: DaLayer,
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
    {
        self.waiter.wait(finality, round_id, sleep, cancel).await?;

        let request = ProofRequest::new(round_id, abi_encoded_request.clone());
        debug!(?request, "Prepared request");

        poll::sleep_or_cancel(sleep, self.settle_delay, cancel).await?;
        let proof = da.proof_by_request_round(&request, true).await?;
        if proof.is_ready() {
            info!(round_id, "Proof generated!");
            return Ok(proof);
        }

        info!(round_id, "Waiting for the DA Layer to generate the proof...");
        let request = &request;
        let proof = Poller::new(self.poll_interval)
            .delay_first()
            .until_ready(
                move || async move {
                    let proof = da.proof_by_request_round(request, false).await?;
                    Ok(proof.is_ready().then_some(proof))
                },
                sleep,
                cancel.clone(),
            )
            .await?;

        info!(round_id, "Proof generated!");
        Ok(proof)
    }

    /// [`Self::retrieve`] under the configured [`RetryPolicy`].
    ///
    /// Every attempt starts over from the finality wait. Exhausting the policy
    /// yields [`FdcError::RetriesExhausted`].
    pub async fn retrieve_with_retry<F, D, S, SFut>(
        &self,
        finality: &F,
        da: &D,
        abi_encoded_request: &Bytes,
        round_id: VotingRoundId,
        sleep: S,
        cancel: &CancellationToken,
    ) -> Result<ProofResponse, FdcError>
    where
        F: FinalitySource,
        D: DaLayer,
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
    {
        retry::retry(
            &self.retry,
            "Proof retrieval",
            sleep,
            cancel,
            move |_| self.retrieve(finality, da, abi_encoded_request, round_id, sleep, cancel),
        )
        .await
    }
}
