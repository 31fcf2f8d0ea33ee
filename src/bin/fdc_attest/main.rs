//! Flare Data Connector attestation tool.
//!
//! Prepares an attestation request with the verifier, submits it to `FdcHub`,
//! waits for the voting round to finalize and prints the proof served by the
//! data availability layer.

mod config;
mod error;

use std::{process::exit, time::Duration};

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
};
use clap::Parser;
use fdc_sdk::{
    Network, client::FdcClient, da::DaLayerClient, verifier::VerifierClient,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use config::{AttestConfig, CliConfig, ConfigError, EnvConfig};
use error::{Error, Result};

/// Default timeout of the submission receipt.
const DEFAULT_TX_TIMEOUT_SECS: u64 = 60;

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Parse CLI arguments
    let cli_config = CliConfig::parse();

    let Some(network) = Network::by_name(&env_config.network) else {
        eprintln!("Invalid configuration: {}", ConfigError::UnknownNetwork(env_config.network));
        exit(1);
    };

    let attest_config = match cli_config.to_attest_config(network.protocol_id()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            exit(1);
        }
    };

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(env_config, network, attest_config).await {
        error!(%e, "Attestation failed");
        exit(1);
    }
}

async fn run(env_config: EnvConfig, network: Network, config: AttestConfig) -> Result<()> {
    let signer: PrivateKeySigner = env_config.private_key.parse()?;
    let wallet = EthereumWallet::new(signer);
    let provider = DynProvider::new(
        ProviderBuilder::new()
            .wallet(wallet)
            .connect_client(RpcClient::new_http(env_config.node_rpc_url)),
    );

    let chain_id = provider.get_chain_id().await.map_err(fdc_sdk::error::FdcError::from)?;
    if chain_id != network.chain_id() {
        warn!(
            chain_id,
            expected = network.chain_id(),
            network = network.name(),
            "RPC node chain id does not match the network"
        );
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let verifier = VerifierClient::new(http.clone(), env_config.verifier_api_key);
    let mut da = DaLayerClient::for_base_url(http, &env_config.da_layer_url)?;
    if let Some(api_key) = env_config.da_layer_api_key {
        da = da.with_api_key(api_key);
    }

    let verifier_url = fdc_sdk::verifier::prepare_request_endpoint(
        &env_config.verifier_url,
        &config.verifier_source,
        &config.attestation_type,
    )?;

    let client = FdcClient::new(network, provider, verifier, da)
        .with_retriever(config.retriever)
        .with_tx_timeout(Some(Duration::from_secs(
            env_config.timeout_seconds.unwrap_or(DEFAULT_TX_TIMEOUT_SECS),
        )))
        .with_max_fee(config.max_fee);

    // Ctrl-C abandons the workflow at the next suspension point
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling");
                cancel.cancel();
            }
        }
    });

    let attest = client.attest(&verifier_url, &config.request, tokio::time::sleep, &cancel);
    let (submitted, proof) = match config.deadline {
        Some(deadline) => tokio::time::timeout(deadline, attest)
            .await
            .map_err(|_| Error::Deadline(deadline.as_secs()))??,
        None => attest.await?,
    };

    info!(
        voting_round_id = submitted.voting_round_id(),
        transaction_hash = %submitted.receipt().transaction_hash,
        "Proof retrieved"
    );
    println!("{}", serde_json::to_string_pretty(&proof)?);
    Ok(())
}
