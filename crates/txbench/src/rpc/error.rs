//! RPC-specific error types.

use alloy_transport::TransportError;
use thiserror::Error;

/// RPC-specific error type.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Transport error from alloy: the endpoint could not be reached or the
    /// response envelope could not be decoded.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rejected {
        /// JSON-RPC error code.
        code: i64,
        /// Error message returned by the node.
        message: String,
    },

    /// Invalid response from RPC.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),
}

impl RpcError {
    /// Returns true if the node itself rejected the request, as opposed to the
    /// request never completing.
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl From<TransportError> for RpcError {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => {
                Self::Rejected { code: payload.code, message: payload.message.to_string() }
            }
            None => Self::Transport(err.to_string()),
        }
    }
}

/// Result type alias for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;
