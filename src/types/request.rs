use alloy::primitives::Bytes;
use serde::{Deserialize, Serialize};

use crate::encoding;

/// Attestation request in the form accepted by the verifier's
/// `prepareRequest` endpoint.
///
/// Attestation type and source id are kept already encoded as `0x`-prefixed
/// 32 byte hex strings, the request body is specific to the attestation type
/// and is passed through untouched.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRequest {
    attestation_type: String,
    source_id: String,
    request_body: serde_json::Value,
}

impl AttestationRequest {
    /// Build a request from human-readable identifiers, e.g.
    /// `AttestationRequest::new("Web2Json", "PublicWeb2", body)`.
    pub fn new(attestation_type: &str, source_id: &str, request_body: serde_json::Value) -> Self {
        Self {
            attestation_type: encoding::to_utf8_hex_string(attestation_type),
            source_id: encoding::to_utf8_hex_string(source_id),
            request_body,
        }
    }

    pub fn attestation_type(&self) -> &str {
        &self.attestation_type
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn request_body(&self) -> &serde_json::Value {
        &self.request_body
    }
}

/// Verifier response to a prepared attestation request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedRequest {
    pub status: String,
    #[serde(default)]
    pub abi_encoded_request: Option<Bytes>,
}

impl PreparedRequest {
    /// Verifier marks requests it can attest with this status.
    pub const VALID: &'static str = "VALID";

    pub fn is_valid(&self) -> bool {
        self.status == Self::VALID && self.abi_encoded_request.is_some()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = AttestationRequest::new(
            "Web2Json",
            "PublicWeb2",
            json!({ "url": "https://example.com", "httpMethod": "GET" }),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["attestationType"],
            "0x576562324a736f6e000000000000000000000000000000000000000000000000"
        );
        assert_eq!(
            value["sourceId"],
            "0x5075626c69635765623200000000000000000000000000000000000000000000"
        );
        assert_eq!(value["requestBody"]["httpMethod"], "GET");
    }

    #[test]
    fn test_prepared_request() {
        let prepared: PreparedRequest = serde_json::from_value(json!({
            "status": "VALID",
            "abiEncodedRequest": "0x576562324a736f6e"
        }))
        .unwrap();
        assert!(prepared.is_valid());
        assert_eq!(prepared.abi_encoded_request.unwrap().len(), 8);

        let rejected: PreparedRequest =
            serde_json::from_value(json!({ "status": "INVALID: bad url" })).unwrap();
        assert!(!rejected.is_valid());
    }
}
