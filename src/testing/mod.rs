//! Scripted test doubles for the attestation workflow.
//!
//! [`ScriptedFinality`] stands in for the `Relay` contract and reports a single
//! `(protocol_id, round_id)` pair finalized after a configurable number of
//! checks. [`ScriptedDaLayer`] replays a script of DA layer replies with the
//! same status handling as [`crate::da::DaLayerClient`].
//!
//! [`RecordingSleep`] provides a `sleep` function that returns immediately
//! and records the requested delays, so poll and retry loops can be tested
//! without real time passing.

#[cfg(test)]
pub(crate) mod http;

use std::{
    collections::VecDeque,
    future::{Ready, ready},
    sync::Mutex,
    time::Duration,
};

use crate::{
    da::DaLayer,
    error::FdcError,
    finality::FinalitySource,
    types::{ProofRequest, ProofResponse, VotingRoundId},
};

/// Sleep function stand-in that only records requested durations.
#[derive(Debug, Default)]
pub struct RecordingSleep {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleep {
    pub fn new() -> Self {
        Self::default()
    }

    /// `sleep` function to pass in place of [`tokio::time::sleep`].
    pub fn sleep(&self) -> impl Fn(Duration) -> Ready<()> + Copy + '_ {
        move |duration| {
            self.slept.lock().expect("sleep log poisoned").push(duration);
            ready(())
        }
    }

    /// All recorded sleeps, in order.
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().expect("sleep log poisoned").clone()
    }

    /// Simulated time passed.
    pub fn elapsed(&self) -> Duration {
        self.slept().iter().sum()
    }
}

/// `Relay` stand-in finalizing exactly one voting round.
#[derive(Debug)]
pub struct ScriptedFinality {
    protocol_id: u8,
    round_id: VotingRoundId,
    pending_checks: usize,
    failures: Mutex<usize>,
    checks: Mutex<Vec<(u8, VotingRoundId)>>,
}

impl ScriptedFinality {
    /// Reports `(protocol_id, round_id)` finalized starting with the check
    /// following `pending_checks` not finalized ones.
    pub fn new(protocol_id: u8, round_id: VotingRoundId, pending_checks: usize) -> Self {
        Self {
            protocol_id,
            round_id,
            pending_checks,
            failures: Mutex::new(0),
            checks: Mutex::new(Vec::new()),
        }
    }

    /// Fail the first `failures` checks with a transport error.
    pub fn with_failures(self, failures: usize) -> Self {
        *self.failures.lock().expect("finality script poisoned") = failures;
        self
    }

    /// All queried `(protocol_id, round_id)` pairs, in order.
    pub fn checks(&self) -> Vec<(u8, VotingRoundId)> {
        self.checks.lock().expect("finality script poisoned").clone()
    }

    fn check(&self, protocol_id: u8, round_id: VotingRoundId) -> Result<bool, FdcError> {
        let mut checks = self.checks.lock().expect("finality script poisoned");
        checks.push((protocol_id, round_id));

        let mut failures = self.failures.lock().expect("finality script poisoned");
        if *failures > 0 {
            *failures -= 1;
            return Err(FdcError::Transport("relay unreachable".to_string()));
        }

        let matching = checks
            .iter()
            .filter(|pair| **pair == (self.protocol_id, self.round_id))
            .count();
        Ok((protocol_id, round_id) == (self.protocol_id, self.round_id)
            && matching > self.pending_checks)
    }
}

impl FinalitySource for ScriptedFinality {
    fn is_finalized(
        &self,
        protocol_id: u8,
        round_id: VotingRoundId,
    ) -> impl Future<Output = Result<bool, FdcError>> {
        ready(self.check(protocol_id, round_id))
    }
}

/// Single scripted DA layer reply.
#[derive(Clone, Debug)]
pub enum DaReply {
    /// 200 with the proof-ready marker.
    Ready(ProofResponse),
    /// 200 without the marker.
    Pending,
    /// Non-200 status.
    Status(u16),
    /// Transport level failure.
    Unreachable,
}

/// DA layer stand-in replaying [`DaReply`]s; answers [`DaReply::Pending`]
/// once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedDaLayer {
    script: Mutex<VecDeque<DaReply>>,
    requests: Mutex<Vec<(ProofRequest, bool)>>,
}

impl ScriptedDaLayer {
    pub fn new(script: impl IntoIterator<Item = DaReply>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All received requests along with their strict status flag.
    pub fn requests(&self) -> Vec<(ProofRequest, bool)> {
        self.requests.lock().expect("DA script poisoned").clone()
    }

    fn reply(&self, request: &ProofRequest, strict: bool) -> Result<ProofResponse, FdcError> {
        self.requests
            .lock()
            .expect("DA script poisoned")
            .push((request.clone(), strict));

        let reply = self
            .script
            .lock()
            .expect("DA script poisoned")
            .pop_front()
            .unwrap_or(DaReply::Pending);
        match reply {
            DaReply::Ready(proof) => Ok(proof),
            DaReply::Pending => Ok(ProofResponse::pending()),
            DaReply::Status(status) if strict => Err(FdcError::HttpStatus {
                status,
                reason: "scripted".to_string(),
            }),
            DaReply::Status(_) => Ok(ProofResponse::pending()),
            DaReply::Unreachable => Err(FdcError::Http("connection refused".to_string())),
        }
    }
}

impl DaLayer for ScriptedDaLayer {
    fn proof_by_request_round(
        &self,
        request: &ProofRequest,
        strict: bool,
    ) -> impl Future<Output = Result<ProofResponse, FdcError>> {
        ready(self.reply(request, strict))
    }
}

/// Proof response carrying the ready marker.
pub fn ready_proof(response_hex: &str) -> ProofResponse {
    ProofResponse {
        response_hex: Some(response_hex.to_string()),
        proof: vec![format!("0x{}", "ab".repeat(32))],
        ..ProofResponse::default()
    }
}
