use std::time::Duration;

use alloy::{
    eips::BlockId,
    primitives::{Address, Bytes, U256},
    providers::Provider,
    rpc::types::TransactionReceipt,
    sol_types::SolEvent,
};
use tracing::{debug, info, warn};

use crate::{
    Network,
    abi::fdc::IFdcHub::AttestationRequest,
    error::FdcError,
    num,
    registry::ContractRegistry,
    types::{ReceiptInfo, SubmittedRequest},
};

/// Submits ABI encoded attestation requests to `FdcHub`.
///
/// Nothing is retried here, failures to quote, send or confirm propagate
/// to the caller as they are.
#[derive(Debug)]
pub struct Submitter<'a, P> {
    network: &'a Network,
    registry: &'a ContractRegistry<P>,
    timeout: Option<Duration>,
    max_fee: Option<U256>,
}

impl<'a, P: Provider + Clone> Submitter<'a, P> {
    pub fn new(network: &'a Network, registry: &'a ContractRegistry<P>) -> Self {
        Self {
            network,
            registry,
            timeout: None,
            max_fee: None,
        }
    }

    /// Give up waiting for the receipt after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Refuse to submit when the quoted fee exceeds `max_fee` wei.
    pub fn with_max_fee(mut self, max_fee: Option<U256>) -> Self {
        self.max_fee = max_fee;
        self
    }

    /// Pay the quoted fee for `abi_encoded_request` and wait for the receipt.
    ///
    /// The voting round is derived from the block timestamp with the voting
    /// epoch parameters read at this point.
    pub async fn submit(&self, abi_encoded_request: Bytes) -> Result<SubmittedRequest, FdcError> {
        let hub = self.registry.fdc_hub().await?;
        let fee = self.quote(&abi_encoded_request).await?;

        info!(
            fee = %num::Converter::native().from_unsigned(fee),
            hub = %hub.address(),
            "Submitting attestation request"
        );
        let receipt = hub
            .requestAttestation(abi_encoded_request.clone())
            .value(fee)
            .send()
            .await?
            .with_timeout(self.timeout)
            .get_receipt()
            .await?;

        self.confirm(*hub.address(), abi_encoded_request, fee, &receipt)
            .await
    }

    /// Request fee of `abi_encoded_request`, refused above the maximum fee.
    async fn quote(&self, abi_encoded_request: &Bytes) -> Result<U256, FdcError> {
        let fee = self.registry.request_fee(abi_encoded_request).await?;
        match self.max_fee {
            Some(max_fee) if fee > max_fee => Err(FdcError::InvalidRequest(format!(
                "request fee {} exceeds the maximum of {}",
                num::Converter::native().from_unsigned(fee),
                num::Converter::native().from_unsigned(max_fee)
            ))),
            _ => Ok(fee),
        }
    }

    /// Derive the [`SubmittedRequest`] from the receipt of the `FdcHub` call.
    async fn confirm(
        &self,
        hub: Address,
        abi_encoded_request: Bytes,
        quoted_fee: U256,
        receipt: &TransactionReceipt,
    ) -> Result<SubmittedRequest, FdcError> {
        let transaction_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(FdcError::Reverted(format!(
                "attestation request {transaction_hash}"
            )));
        }
        let block_number = receipt
            .block_number
            .ok_or(FdcError::InvalidRequest("receipt without block number".to_string()))?;
        info!(%transaction_hash, block_number, "Submitted request");

        let fee_paid = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == hub)
            .find_map(|log| AttestationRequest::decode_log(&log.inner).ok())
            .map(|event| event.data.fee)
            .unwrap_or(quoted_fee);

        let block_timestamp = self.block_timestamp(block_number).await?;
        let epochs = self.registry.voting_epochs().await?;
        let voting_round_id = epochs.round_id_at(block_timestamp)?;
        info!(
            block_timestamp,
            start = epochs.first_voting_round_start_ts(),
            duration = epochs.voting_epoch_duration_seconds(),
            voting_round_id,
            "Calculated round id"
        );

        // The chain's own epoch id is informational, the request is already in
        match self.registry.current_voting_epoch_id().await {
            Ok(current) => debug!(current, voting_round_id, "Actual round id"),
            Err(err) => warn!(%err, "Failed to read current voting epoch id"),
        }
        info!(
            url = %self.network.round_explorer_url(voting_round_id),
            "Check round progress"
        );

        Ok(SubmittedRequest::new(
            abi_encoded_request,
            fee_paid,
            ReceiptInfo {
                block_number,
                transaction_hash,
            },
            block_timestamp,
            voting_round_id,
        ))
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, FdcError> {
        let header = self
            .registry
            .provider()
            .get_block(BlockId::number(block_number))
            .await
            .map_err(FdcError::from)?
            .map(|b| b.into_header())
            .ok_or(FdcError::InvalidRequest("block not found".to_string()))?;
        Ok(header.timestamp)
    }
}
