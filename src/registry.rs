//! Resolution of Flare system contracts and protocol parameters.
//!
//! [`ContractRegistry`] looks contract addresses up by name in
//! `FlareContractRegistry` and keeps them in an explicit cache. The cache is
//! never invalidated implicitly, call [`ContractRegistry::refresh`] after a
//! system contract upgrade.

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::Provider,
};
use dashmap::DashMap;
use tracing::debug;

use crate::{
    Network,
    abi::{
        fdc::{
            IFdcHub::{self, IFdcHubInstance},
            IFdcRequestFeeConfigurations::{self, IFdcRequestFeeConfigurationsInstance},
        },
        names,
        registry::IFlareContractRegistry::{self, IFlareContractRegistryInstance},
        system::{
            IFlareSystemsManager::{self, IFlareSystemsManagerInstance},
            IRelay::{self, IRelayInstance},
        },
    },
    error::FdcError,
    types::VotingEpochs,
};

/// Cached view of `FlareContractRegistry`.
#[derive(Debug)]
pub struct ContractRegistry<P> {
    provider: P,
    instance: IFlareContractRegistryInstance<P>,
    addresses: DashMap<String, Address>,
}

impl<P: Provider + Clone> ContractRegistry<P> {
    pub fn new(network: &Network, provider: P) -> Self {
        Self {
            instance: IFlareContractRegistry::new(network.registry(), provider.clone()),
            provider,
            addresses: DashMap::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Address the contract is registered under `name`.
    pub async fn address_of(&self, name: &str) -> Result<Address, FdcError> {
        if let Some(address) = self.addresses.get(name) {
            return Ok(*address);
        }

        let address = self
            .instance
            .getContractAddressByName(name.to_string())
            .call()
            .await?;
        if address.is_zero() {
            return Err(FdcError::ContractNotFound(name.to_string()));
        }

        debug!(name, %address, "Resolved contract address");
        self.addresses.insert(name.to_string(), address);
        Ok(address)
    }

    /// Forget all resolved addresses.
    pub fn refresh(&self) {
        self.addresses.clear();
    }

    pub async fn fdc_hub(&self) -> Result<IFdcHubInstance<P>, FdcError> {
        let address = self.address_of(names::FDC_HUB).await?;
        Ok(IFdcHub::new(address, self.provider.clone()))
    }

    pub async fn fee_configurations(
        &self,
    ) -> Result<IFdcRequestFeeConfigurationsInstance<P>, FdcError> {
        let address = self.address_of(names::FDC_REQUEST_FEE_CONFIGURATIONS).await?;
        Ok(IFdcRequestFeeConfigurations::new(address, self.provider.clone()))
    }

    pub async fn systems_manager(&self) -> Result<IFlareSystemsManagerInstance<P>, FdcError> {
        let address = self.address_of(names::FLARE_SYSTEMS_MANAGER).await?;
        Ok(IFlareSystemsManager::new(address, self.provider.clone()))
    }

    pub async fn relay(&self) -> Result<IRelayInstance<P>, FdcError> {
        let address = self.address_of(names::RELAY).await?;
        Ok(IRelay::new(address, self.provider.clone()))
    }

    /// Fee in wei required to submit `abi_encoded_request`.
    pub async fn request_fee(&self, abi_encoded_request: &Bytes) -> Result<U256, FdcError> {
        let fee_configurations = self.fee_configurations().await?;
        Ok(fee_configurations
            .getRequestFee(abi_encoded_request.clone())
            .call()
            .await?)
    }

    /// Current voting epoch timing.
    pub async fn voting_epochs(&self) -> Result<VotingEpochs, FdcError> {
        let systems_manager = self.systems_manager().await?;
        let start = systems_manager.firstVotingRoundStartTs().call().await?;
        let duration = systems_manager.votingEpochDurationSeconds().call().await?;
        Ok(VotingEpochs::new(start, duration))
    }

    /// Voting epoch the chain considers current.
    pub async fn current_voting_epoch_id(&self) -> Result<u64, FdcError> {
        let systems_manager = self.systems_manager().await?;
        Ok(systems_manager.getCurrentVotingEpochId().call().await?.into())
    }
}
