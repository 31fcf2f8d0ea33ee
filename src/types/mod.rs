mod proof;
mod request;

use alloy::primitives::{Bytes, TxHash, U256};

use crate::error::FdcError;

pub use proof::{ProofRequest, ProofResponse};
pub use request::{AttestationRequest, PreparedRequest};

/// ID of the voting round (voting epoch) of the Flare systems protocol.
pub type VotingRoundId = u64;

/// Voting epoch timing read from `FlareSystemsManager`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VotingEpochs {
    first_voting_round_start_ts: u64,
    voting_epoch_duration_seconds: u64,
}

impl VotingEpochs {
    pub fn new(first_voting_round_start_ts: u64, voting_epoch_duration_seconds: u64) -> Self {
        Self {
            first_voting_round_start_ts,
            voting_epoch_duration_seconds,
        }
    }

    pub fn first_voting_round_start_ts(&self) -> u64 {
        self.first_voting_round_start_ts
    }

    pub fn voting_epoch_duration_seconds(&self) -> u64 {
        self.voting_epoch_duration_seconds
    }

    /// Voting round the given block timestamp falls into.
    pub fn round_id_at(&self, timestamp: u64) -> Result<VotingRoundId, FdcError> {
        derive_round_id(
            timestamp,
            self.first_voting_round_start_ts,
            self.voting_epoch_duration_seconds,
        )
    }

    /// Timestamp the given voting round starts at.
    pub fn round_start_ts(&self, round_id: VotingRoundId) -> u64 {
        self.first_voting_round_start_ts
            .saturating_add(round_id.saturating_mul(self.voting_epoch_duration_seconds))
    }
}

/// `floor((timestamp - start) / duration)`.
///
/// Timestamps before the first round and zero durations are rejected
/// instead of wrapping.
pub fn derive_round_id(
    timestamp: u64,
    start: u64,
    duration: u64,
) -> Result<VotingRoundId, FdcError> {
    if duration == 0 || timestamp < start {
        return Err(FdcError::InvalidRoundParameters {
            timestamp,
            start,
            duration,
        });
    }
    Ok((timestamp - start) / duration)
}

/// Receipt data kept after the submission transaction is mined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiptInfo {
    pub block_number: u64,
    pub transaction_hash: TxHash,
}

/// Attestation request accepted by `FdcHub`.
#[derive(Clone, Debug)]
pub struct SubmittedRequest {
    abi_encoded_request: Bytes,
    fee_paid: U256,
    receipt: ReceiptInfo,
    block_timestamp: u64,
    voting_round_id: VotingRoundId,
}

impl SubmittedRequest {
    pub(crate) fn new(
        abi_encoded_request: Bytes,
        fee_paid: U256,
        receipt: ReceiptInfo,
        block_timestamp: u64,
        voting_round_id: VotingRoundId,
    ) -> Self {
        Self {
            abi_encoded_request,
            fee_paid,
            receipt,
            block_timestamp,
            voting_round_id,
        }
    }

    pub fn abi_encoded_request(&self) -> &Bytes {
        &self.abi_encoded_request
    }

    pub fn fee_paid(&self) -> U256 {
        self.fee_paid
    }

    pub fn receipt(&self) -> ReceiptInfo {
        self.receipt
    }

    pub fn block_timestamp(&self) -> u64 {
        self.block_timestamp
    }

    pub fn voting_round_id(&self) -> VotingRoundId {
        self.voting_round_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_round_id() {
        assert_eq!(derive_round_id(1000, 100, 90).unwrap(), 10);
        assert_eq!(derive_round_id(100, 100, 90).unwrap(), 0);
        // floor, not round
        assert_eq!(derive_round_id(189, 100, 90).unwrap(), 0);
        assert_eq!(derive_round_id(190, 100, 90).unwrap(), 1);
    }

    #[test]
    fn test_derive_round_id_epoch_boundaries() {
        let epochs = VotingEpochs::new(1_658_430_000, 90);
        for k in [0, 1, 7, 912_345] {
            let ts = epochs.round_start_ts(k);
            assert_eq!(epochs.round_id_at(ts).unwrap(), k);
            assert_eq!(epochs.round_id_at(ts + 89).unwrap(), k);
            if k > 0 {
                assert_eq!(epochs.round_id_at(ts - 1).unwrap(), k - 1);
            }
        }
    }

    #[test]
    fn test_derive_round_id_rejects_invalid() {
        assert!(matches!(
            derive_round_id(99, 100, 90),
            Err(FdcError::InvalidRoundParameters { timestamp: 99, .. })
        ));
        assert!(matches!(
            derive_round_id(1000, 100, 0),
            Err(FdcError::InvalidRoundParameters { duration: 0, .. })
        ));
    }
}
