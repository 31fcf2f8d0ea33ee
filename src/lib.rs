//! Flare Data Connector SDK.
//!
//! # Overview
//!
//! Drives the attestation workflow of the Flare Data Connector (FDC):
//!
//! 1. [`verifier::VerifierClient`] turns a human-readable attestation request
//!    into an ABI encoded one.
//! 2. [`submit::Submitter`] pays the quoted fee to `FdcHub`, waits for the
//!    receipt and derives the voting round the request falls into.
//! 3. [`finality::FinalityWaiter`] suspends until `Relay` reports that round
//!    finalized.
//! 4. [`proof::ProofRetriever`] polls the data availability layer until the
//!    proof is served, retrying the whole sequence under a [`retry::RetryPolicy`].
//!
//! [`client::FdcClient`] wires all of the above for a single [`Network`].
//!
//! Every unbounded wait takes a `sleep` function and a
//! [`tokio_util::sync::CancellationToken`], so callers decide how time passes
//! and when to give up.
//!
//! # Limitations/follow-ups
//!
//! * Merkle proofs are returned as served by the DA layer, no verification
//!   against the `Relay` merkle root is done.
//!
//! * The request fee is quoted once per submission and is not re-quoted if
//!   the transaction fails.
//!
//! # Testing
//!
//! [`testing`] module provides scripted stand-ins for the `Relay` finality
//! source and the DA layer, plus a sleep function that only records the
//! requested delays.

pub mod abi;
pub mod client;
pub mod da;
pub mod encoding;
pub mod error;
pub mod finality;
pub mod num;
pub mod poll;
pub mod proof;
pub mod registry;
pub mod retry;
pub mod submit;
pub mod testing;
pub mod types;
pub mod verifier;

use alloy::primitives::{Address, address};

/// Address of `FlareContractRegistry`, identical on every Flare network.
pub const FLARE_CONTRACT_REGISTRY: Address =
    address!("0xaD67FE66660Fb8dFE9d6b1b4240d8650e30F6019");

/// Protocol id the FDC uses in `Relay`.
pub const FDC_PROTOCOL_ID: u8 = 200;

#[derive(Clone, Debug)]
/// Network the attestation workflow is operating on.
pub struct Network {
    name: String,
    chain_id: u64,
    registry: Address,
    protocol_id: u8,
}

impl Network {
    pub fn flare() -> Self {
        Self::named("flare", 14)
    }

    pub fn songbird() -> Self {
        Self::named("songbird", 19)
    }

    pub fn coston() -> Self {
        Self::named("coston", 16)
    }

    pub fn coston2() -> Self {
        Self::named("coston2", 114)
    }

    /// Look up one of the public networks by its name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "flare" => Some(Self::flare()),
            "songbird" => Some(Self::songbird()),
            "coston" => Some(Self::coston()),
            "coston2" => Some(Self::coston2()),
            _ => None,
        }
    }

    pub fn custom(name: impl Into<String>, chain_id: u64, registry: Address, protocol_id: u8) -> Self {
        Self {
            name: name.into(),
            chain_id,
            registry,
            protocol_id,
        }
    }

    fn named(name: &str, chain_id: u64) -> Self {
        Self::custom(name, chain_id, FLARE_CONTRACT_REGISTRY, FDC_PROTOCOL_ID)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn registry(&self) -> Address {
        self.registry
    }

    pub fn protocol_id(&self) -> u8 {
        self.protocol_id
    }

    /// Systems explorer page showing FDC progress of the given voting round.
    pub fn round_explorer_url(&self, round_id: types::VotingRoundId) -> String {
        format!(
            "https://{}-systems-explorer.flare.rocks/voting-epoch/{}?tab=fdc",
            self.name, round_id
        )
    }
}

/// Join `path` under `base`, keeping the last segment of `base`.
pub(crate) fn join_url(base: &url::Url, path: &str) -> Result<url::Url, error::FdcError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path)
        .map_err(|err| error::FdcError::InvalidRequest(err.to_string()))
}
