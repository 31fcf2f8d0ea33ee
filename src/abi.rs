//! Bindings of the Flare system contracts the attestation workflow talks to.

pub mod registry {
    alloy::sol!(
        /// Name to address registry of the Flare system contracts.
        #[derive(Debug)]
        #[sol(rpc)]
        interface IFlareContractRegistry {
            function getContractAddressByName(string calldata _name) external view returns (address);
        }
    );
}

pub mod fdc {
    alloy::sol!(
        /// Entry point accepting attestation requests.
        #[derive(Debug)]
        #[sol(rpc)]
        interface IFdcHub {
            event AttestationRequest(bytes data, uint256 fee);

            function requestAttestation(bytes calldata _data) external payable;
        }

        /// Fee quotes for attestation requests.
        #[derive(Debug)]
        #[sol(rpc)]
        interface IFdcRequestFeeConfigurations {
            function getRequestFee(bytes calldata _data) external view returns (uint256);
        }
    );
}

pub mod system {
    alloy::sol!(
        /// Voting epoch timing of the Flare systems protocol.
        #[derive(Debug)]
        #[sol(rpc)]
        interface IFlareSystemsManager {
            function firstVotingRoundStartTs() external view returns (uint64);
            function votingEpochDurationSeconds() external view returns (uint64);
            function getCurrentVotingEpochId() external view returns (uint32);
        }

        /// Finalized merkle roots per protocol and voting round.
        #[derive(Debug)]
        #[sol(rpc)]
        interface IRelay {
            function isFinalized(uint256 _protocolId, uint256 _votingRoundId) external view returns (bool);
        }
    );
}

/// Names the system contracts are registered under in `FlareContractRegistry`.
pub mod names {
    pub const FDC_HUB: &str = "FdcHub";
    pub const FDC_REQUEST_FEE_CONFIGURATIONS: &str = "FdcRequestFeeConfigurations";
    pub const FLARE_SYSTEMS_MANAGER: &str = "FlareSystemsManager";
    pub const RELAY: &str = "Relay";
}
