use alloy::primitives::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::VotingRoundId;

/// Body of the DA layer `proof-by-request-round` query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub voting_round_id: VotingRoundId,
    pub request_bytes: Bytes,
}

impl ProofRequest {
    pub fn new(voting_round_id: VotingRoundId, request_bytes: Bytes) -> Self {
        Self {
            voting_round_id,
            request_bytes,
        }
    }
}

/// DA layer response.
///
/// `response_hex` is present only once the proof has been generated, all the
/// remaining fields are kept as served. Until then the body may carry
/// anything, so only a ready response has its `proof` decoded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ProofResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_hex: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proof: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProofResponse {
    /// Response standing in for a DA layer that has nothing to serve yet.
    pub fn pending() -> Self {
        Self::default()
    }

    /// Whether the proof-ready marker is present and non-empty.
    pub fn is_ready(&self) -> bool {
        self.response_hex.as_deref().is_some_and(|hex| !hex.is_empty())
    }
}

impl TryFrom<Map<String, Value>> for ProofResponse {
    type Error = serde_json::Error;

    fn try_from(mut extra: Map<String, Value>) -> Result<Self, Self::Error> {
        let response_hex = match extra.remove("response_hex") {
            Some(Value::String(hex)) => Some(hex),
            Some(Value::Null) | None => None,
            // Not a marker, kept as served
            Some(other) => {
                extra.insert("response_hex".to_string(), other);
                None
            }
        };

        let mut response = Self {
            response_hex,
            proof: Vec::new(),
            extra,
        };
        if response.is_ready() {
            response.proof = match response.extra.remove("proof") {
                Some(Value::Null) | None => Vec::new(),
                Some(proof) => serde_json::from_value(proof)?,
            };
        }
        Ok(response)
    }
}
