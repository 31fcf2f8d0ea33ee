use std::time::Duration;

use alloy::{
    primitives::{Bytes, address},
    providers::ProviderBuilder,
    sol_types::SolValue,
    transports::mock::Asserter,
};
use fdc_sdk::{
    FDC_PROTOCOL_ID, Network,
    error::FdcError,
    proof::ProofRetriever,
    registry::ContractRegistry,
    retry::RetryPolicy,
    testing::{DaReply, RecordingSleep, ScriptedDaLayer, ScriptedFinality, ready_proof},
    types::{AttestationRequest, ProofRequest, VotingEpochs},
};
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

fn respond<T: SolValue>(asserter: &Asserter, value: T) {
    asserter.push_success(&Bytes::from(value.abi_encode()));
}

fn encoded_request() -> Bytes {
    Bytes::from(vec![0x11; 96])
}

/// Request body as posted to the verifier.
#[test]
fn test_attestation_request_json() {
    let request = AttestationRequest::new(
        "Web2Json",
        "PublicWeb2",
        serde_json::json!({ "url": "https://swapi.info/api/people/3", "httpMethod": "GET" }),
    );
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(
        json["attestationType"],
        "0x576562324a736f6e000000000000000000000000000000000000000000000000"
    );
    assert_eq!(
        json["sourceId"],
        "0x5075626c69635765623200000000000000000000000000000000000000000000"
    );
    assert_eq!(json["requestBody"]["httpMethod"], "GET");
}

/// Round derived from the block timestamp is the one queried for finality
/// and proof.
#[tokio::test]
async fn test_round_flows_into_retrieval() {
    let epochs = VotingEpochs::new(1_658_430_000, 90);
    let round_id = assert_ok!(epochs.round_id_at(1_658_430_000 + 90 * 1_000 + 45));
    assert_eq!(round_id, 1_000);

    let clock = RecordingSleep::new();
    let relay = ScriptedFinality::new(FDC_PROTOCOL_ID, round_id, 3);
    let da = ScriptedDaLayer::new([DaReply::Pending, DaReply::Ready(ready_proof("0xbeef"))]);

    let proof = ProofRetriever::default()
        .retrieve_with_retry(
            &relay,
            &da,
            &encoded_request(),
            round_id,
            clock.sleep(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(assert_ok!(proof).response_hex.as_deref(), Some("0xbeef"));
    assert!(relay.checks().iter().all(|check| *check == (FDC_PROTOCOL_ID, 1_000)));
    assert!(
        da.requests()
            .iter()
            .all(|(request, _)| *request == ProofRequest::new(1_000, encoded_request()))
    );
    // Three finality pauses, the settle delay and one poll pause
    assert_eq!(clock.elapsed(), Duration::from_secs(3 * 30 + 10 + 10));
}

/// `Relay` resolved through the registry serves as the finality source.
#[tokio::test]
async fn test_retrieval_against_relay_contract() {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
    let registry = ContractRegistry::new(&Network::coston2(), provider);

    respond(&asserter, address!("0x97702e350CaEda540935d92aAf213307e9069784"));
    let relay = assert_ok!(registry.relay().await);

    respond(&asserter, false);
    respond(&asserter, false);
    respond(&asserter, true);
    let da = ScriptedDaLayer::new([DaReply::Ready(ready_proof("0x01"))]);
    let clock = RecordingSleep::new();

    let proof = ProofRetriever::default()
        .retrieve(
            &relay,
            &da,
            &encoded_request(),
            1_024_500,
            clock.sleep(),
            &CancellationToken::new(),
        )
        .await;

    assert!(assert_ok!(proof).is_ready());
    assert_eq!(
        clock.slept(),
        vec![
            Duration::from_secs(30),
            Duration::from_secs(30),
            Duration::from_secs(10),
        ]
    );
}

/// DA layer that never serves the proof keeps the caller waiting until
/// cancelled.
#[tokio::test]
async fn test_cancel_while_polling_da_layer() {
    let relay = ScriptedFinality::new(FDC_PROTOCOL_ID, 7, 0);
    let da = ScriptedDaLayer::default();
    let cancel = CancellationToken::new();

    let cancel_after_polls = |_: Duration| {
        if da.requests().len() >= 25 {
            cancel.cancel();
        }
        std::future::ready(())
    };
    let result = ProofRetriever::default()
        .retrieve_with_retry(&relay, &da, &encoded_request(), 7, cancel_after_polls, &cancel)
        .await;

    assert!(matches!(assert_err!(result), FdcError::Cancelled));
    assert_eq!(da.requests().len(), 25);
    assert_eq!(relay.checks().len(), 1, "single attempt, never retried");
}

/// Custom policy bounds the number of whole attempts.
#[tokio::test]
async fn test_custom_retry_policy() {
    let clock = RecordingSleep::new();
    let relay = ScriptedFinality::new(FDC_PROTOCOL_ID, 7, 0).with_failures(usize::MAX);
    let da = ScriptedDaLayer::default();

    let result = ProofRetriever::default()
        .with_retry(RetryPolicy::new(3, Duration::from_secs(5)))
        .retrieve_with_retry(
            &relay,
            &da,
            &encoded_request(),
            7,
            clock.sleep(),
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(assert_err!(result), FdcError::RetriesExhausted(3)));
    assert_eq!(relay.checks().len(), 3);
    assert_eq!(clock.slept(), vec![Duration::from_secs(5); 2]);
}
