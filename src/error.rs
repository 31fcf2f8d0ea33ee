use std::fmt::Display;

use alloy::{
    contract,
    providers::PendingTransactionError,
    sol_types,
    transports,
};

/// Error returned by any step of the attestation workflow.
#[derive(Debug, thiserror::Error)]
pub enum FdcError {
    #[error("fatal error: {0}")]
    Fatal(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unexpected empty RPC response")]
    NullResp,

    #[error("transaction ran out of gas")]
    OutOfGas,

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction timed out")]
    Timeout,

    #[error("contract not registered: {0}")]
    ContractNotFound(String),

    #[error("invalid voting round parameters, timestamp: {timestamp}, start: {start}, duration: {duration}")]
    InvalidRoundParameters {
        timestamp: u64,
        start: u64,
        duration: u64,
    },

    #[error("response status is not OK: {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("http error: {0}")]
    Http(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("failed to retrieve data and proofs after {0} attempts")]
    RetriesExhausted(usize),

    #[error("operation cancelled")]
    Cancelled,
}

impl FdcError {
    /// Whether the retry wrapper should give up immediately on this error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::RetriesExhausted(_))
    }

    pub(crate) fn http_status(status: reqwest::StatusCode) -> Self {
        Self::HttpStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}

impl From<contract::Error> for FdcError {
    fn from(value: contract::Error) -> Self {
        match value {
            contract::Error::UnknownFunction(_) => Self::Fatal(value.to_string()),
            contract::Error::UnknownSelector(_) => Self::Fatal(value.to_string()),
            contract::Error::NotADeploymentTransaction => Self::Fatal(value.to_string()),
            contract::Error::ContractNotDeployed => Self::Fatal(value.to_string()),
            contract::Error::ZeroData(_, _) => Self::Fatal(value.to_string()),
            contract::Error::AbiError(_) => Self::Fatal(value.to_string()),
            contract::Error::TransportError(rpc_err) => Self::from(rpc_err),
            contract::Error::PendingTransactionError(err) => err.into(),
        }
    }
}

impl From<PendingTransactionError> for FdcError {
    fn from(value: PendingTransactionError) -> Self {
        match value {
            PendingTransactionError::FailedToRegister => Self::Fatal(value.to_string()),
            PendingTransactionError::TransportError(rpc_err) => Self::from(rpc_err),
            PendingTransactionError::Recv(_) => Self::Transport(value.to_string()),
            PendingTransactionError::TxWatcher(err) => match err {
                alloy::providers::WatchTxError::Timeout => Self::Timeout,
            },
        }
    }
}

impl<E: Display> From<transports::RpcError<E>> for FdcError {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp) => {
                // Heuristic to determine if eth_call failed due to OutOfGas or
                // if transaction was reverted during the gas estimation
                let msg = resp.message.to_ascii_lowercase();
                if (resp.code == -32603) && (msg.contains("gas") || msg.contains("oog")) {
                    Self::OutOfGas
                } else if (resp.code == -32600 || resp.code == -32601 || resp.code == -32602)
                    && (msg.contains("invalid") || msg.contains("not found"))
                {
                    Self::InvalidRequest(msg)
                } else if resp.code == 3 && msg.contains("reverted") {
                    Self::Reverted(value.to_string())
                } else {
                    Self::Transport(value.to_string())
                }
            }
            transports::RpcError::NullResp => Self::NullResp,
            _ => Self::Transport(value.to_string()),
        }
    }
}

impl From<sol_types::Error> for FdcError {
    fn from(value: sol_types::Error) -> Self {
        Self::Fatal(value.to_string())
    }
}

impl From<reqwest::Error> for FdcError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Http(value.to_string())
        }
    }
}

impl From<serde_json::Error> for FdcError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use alloy::transports::{RpcError, TransportErrorKind};

    use super::*;

    #[test]
    fn test_http_status_message() {
        let err = FdcError::http_status(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            err.to_string(),
            "response status is not OK: 503 Service Unavailable"
        );
    }

    #[test]
    fn test_exhausted_message_names_attempts() {
        assert_eq!(
            FdcError::RetriesExhausted(10).to_string(),
            "failed to retrieve data and proofs after 10 attempts"
        );
    }

    #[test]
    fn test_null_resp() {
        let err: FdcError = RpcError::<TransportErrorKind>::NullResp.into();
        assert!(matches!(err, FdcError::NullResp));
    }

    #[test]
    fn test_terminal() {
        assert!(FdcError::Cancelled.is_terminal());
        assert!(!FdcError::Timeout.is_terminal());
    }
}
