use std::{pin::pin, time::Duration};

use alloy::{primitives::U256, providers::Provider};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    FDC_PROTOCOL_ID,
    abi::system::IRelay::IRelayInstance,
    error::FdcError,
    poll::{PollState, Poller},
    types::VotingRoundId,
};

/// Source of voting round finality, normally the `Relay` contract.
pub trait FinalitySource {
    fn is_finalized(
        &self,
        protocol_id: u8,
        round_id: VotingRoundId,
    ) -> impl Future<Output = Result<bool, FdcError>>;
}

impl<P: Provider> FinalitySource for IRelayInstance<P> {
    async fn is_finalized(&self, protocol_id: u8, round_id: VotingRoundId) -> Result<bool, FdcError> {
        Ok(self
            .isFinalized(U256::from(protocol_id), U256::from(round_id))
            .call()
            .await?)
    }
}

/// Suspends until a voting round is finalized.
///
/// There is no attempt limit, finality timing is decided by the network.
/// Abandon the wait through the cancellation token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinalityWaiter {
    protocol_id: u8,
    poller: Poller,
}

impl Default for FinalityWaiter {
    fn default() -> Self {
        Self::new(FDC_PROTOCOL_ID, Duration::from_secs(30))
    }
}

impl FinalityWaiter {
    pub fn new(protocol_id: u8, interval: Duration) -> Self {
        Self {
            protocol_id,
            poller: Poller::new(interval),
        }
    }

    pub fn protocol_id(&self) -> u8 {
        self.protocol_id
    }

    pub fn interval(&self) -> Duration {
        self.poller.interval()
    }

    /// Returns once `source` reports `round_id` finalized for the configured protocol.
    pub async fn wait<F, S, SFut>(
        &self,
        source: &F,
        round_id: VotingRoundId,
        sleep: S,
        cancel: &CancellationToken,
    ) -> Result<(), FdcError>
    where
        F: FinalitySource,
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
    {
        let protocol_id = self.protocol_id;
        info!(round_id, protocol_id, "Waiting for the round to finalize...");

        let mut states = pin!(self.poller.states(
            move || async move {
                let finalized = source.is_finalized(protocol_id, round_id).await?;
                Ok(finalized.then_some(()))
            },
            sleep,
            cancel.clone(),
        ));

        let mut checks = 0usize;
        while let Some(state) = states.next().await {
            checks += 1;
            match state {
                PollState::Waiting => {
                    debug!(round_id, checks, "Round not finalized yet");
                }
                PollState::Ready(()) => {
                    info!(round_id, checks, "Round finalized!");
                    return Ok(());
                }
                PollState::Failed(err) => return Err(err),
            }
        }
        Err(FdcError::Fatal("finality poll ended without a result".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;
    use crate::testing::{RecordingSleep, ScriptedFinality};

    #[tokio::test]
    async fn test_waits_for_exact_pair() {
        let clock = RecordingSleep::new();
        let relay = ScriptedFinality::new(200, 1_024_500, 3);

        assert_ok!(
            FinalityWaiter::default()
                .wait(&relay, 1_024_500, clock.sleep(), &CancellationToken::new())
                .await
        );

        assert_eq!(relay.checks(), vec![(200, 1_024_500); 4]);
        assert_eq!(clock.slept(), vec![Duration::from_secs(30); 3]);
    }

    #[tokio::test]
    async fn test_finalized_immediately() {
        let clock = RecordingSleep::new();
        let relay = ScriptedFinality::new(200, 7, 0);

        assert_ok!(
            FinalityWaiter::default()
                .wait(&relay, 7, clock.sleep(), &CancellationToken::new())
                .await
        );
        assert_eq!(relay.checks().len(), 1);
        assert!(clock.slept().is_empty());
    }

    #[tokio::test]
    async fn test_other_protocol_never_finalizes() {
        let relay = ScriptedFinality::new(200, 7, 0);
        let cancel = CancellationToken::new();
        let waiter = FinalityWaiter::new(100, Duration::from_secs(1));

        let cancel_after = |_: Duration| {
            // Give up instead of pausing after the fifth check
            if relay.checks().len() >= 5 {
                cancel.cancel();
            }
            std::future::ready(())
        };
        let result = waiter.wait(&relay, 7, cancel_after, &cancel).await;

        assert!(matches!(result, Err(FdcError::Cancelled)));
        assert!(relay.checks().iter().all(|pair| *pair == (100, 7)));
        assert_eq!(relay.checks().len(), 5);
    }

    #[tokio::test]
    async fn test_relay_failure_propagates() {
        let clock = RecordingSleep::new();
        let relay = ScriptedFinality::new(200, 7, 0).with_failures(1);

        let result = FinalityWaiter::default()
            .wait(&relay, 7, clock.sleep(), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(FdcError::Transport(_))));
        assert_eq!(relay.checks().len(), 1);
    }
}
