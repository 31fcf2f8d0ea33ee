//! Configuration for the attestation tool.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): endpoints, keys
//! - CLI arguments: the attestation request and workflow timing

use std::time::Duration;

use alloy::primitives::U256;
use clap::Parser;
use fdc_sdk::{
    finality::FinalityWaiter,
    num,
    proof::ProofRetriever,
    retry::RetryPolicy,
    types::AttestationRequest,
};
use fastnum::{UD256, decimal::Context};
use url::Url;

/// Environment configuration (endpoints, credentials).
#[derive(derive_more::Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// Network name: flare, songbird, coston or coston2
    pub network: String,

    /// RPC URL for the node
    pub node_rpc_url: Url,

    /// Private key paying for the attestation requests
    #[debug(skip)]
    pub private_key: String,

    /// Base URL of the verifier (attestation provider)
    pub verifier_url: Url,

    /// API key of the verifier
    #[debug(skip)]
    pub verifier_api_key: String,

    /// Base URL of the data availability layer
    pub da_layer_url: Url,

    /// Optional API key of the data availability layer
    #[debug(skip)]
    pub da_layer_api_key: Option<String>,

    /// Optional timeout for the submission receipt (default: 60s)
    pub timeout_seconds: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

/// CLI arguments describing the attestation request.
#[derive(Debug, Parser)]
#[command(name = "fdc-attest")]
#[command(about = "Request a Flare Data Connector attestation and fetch its proof")]
pub struct CliConfig {
    /// Attestation type, e.g. Web2Json or EVMTransaction
    #[arg(long, default_value = "Web2Json")]
    pub attestation_type: String,

    /// Source id, e.g. PublicWeb2 or testETH
    #[arg(long, default_value = "PublicWeb2")]
    pub source_id: String,

    /// Verifier path segment of the source, e.g. web2 or eth
    #[arg(long, default_value = "web2")]
    pub verifier_source: String,

    /// Request body as JSON, specific to the attestation type
    #[arg(long)]
    pub request_body: String,

    /// Maximum request fee in native units (e.g. 1.5)
    #[arg(long)]
    pub max_fee: Option<String>,

    /// Maximum number of proof retrieval attempts
    #[arg(long, default_value_t = 10)]
    pub max_attempts: usize,

    /// Pause between proof retrieval attempts
    #[arg(long, default_value_t = 20)]
    pub retry_interval_secs: u64,

    /// Pause between round finality checks
    #[arg(long, default_value_t = 30)]
    pub finality_interval_secs: u64,

    /// Pause between DA layer queries
    #[arg(long, default_value_t = 10)]
    pub poll_interval_secs: u64,

    /// Give up on the whole workflow after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

/// Attestation workflow parameters derived from the CLI.
#[derive(Debug)]
pub struct AttestConfig {
    pub request: AttestationRequest,
    pub attestation_type: String,
    pub verifier_source: String,
    pub retriever: ProofRetriever,
    pub max_fee: Option<U256>,
    pub deadline: Option<Duration>,
}

impl CliConfig {
    /// Convert CLI config to the workflow parameters.
    pub fn to_attest_config(&self, protocol_id: u8) -> Result<AttestConfig, ConfigError> {
        let request_body: serde_json::Value = serde_json::from_str(&self.request_body)
            .map_err(|e| ConfigError::InvalidRequestBody(e.to_string()))?;
        if !request_body.is_object() {
            return Err(ConfigError::InvalidRequestBody(
                "expected a JSON object".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }

        let max_fee = self
            .max_fee
            .as_deref()
            .map(|fee| {
                UD256::from_str(fee, Context::default())
                    .ok()
                    .and_then(|parsed| num::Converter::native().try_to_unsigned(parsed))
                    .ok_or_else(|| ConfigError::InvalidMaxFee(fee.to_string()))
            })
            .transpose()?;

        let retriever = ProofRetriever::default()
            .with_waiter(FinalityWaiter::new(
                protocol_id,
                Duration::from_secs(self.finality_interval_secs),
            ))
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_retry(RetryPolicy::new(
                self.max_attempts,
                Duration::from_secs(self.retry_interval_secs),
            ));

        Ok(AttestConfig {
            request: AttestationRequest::new(&self.attestation_type, &self.source_id, request_body),
            attestation_type: self.attestation_type.clone(),
            verifier_source: self.verifier_source.clone(),
            retriever,
            max_fee,
            deadline: self.deadline_secs.map(Duration::from_secs),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    #[error("Invalid maximum fee: {0}")]
    InvalidMaxFee(String),

    #[error("max_attempts cannot be zero")]
    ZeroMaxAttempts,

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
}
