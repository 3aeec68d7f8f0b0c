//! Unified error type for the collaborator boundary
//!
//! The hashing/signing/verification modules carry their own typed
//! errors; everything that crosses the chain-collaborator boundary
//! (queries, submission, schema CRUD) flows through this coded error
//! for consistent handling and serialization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error carried across the collaborator boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl AttestError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn verification_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::VerificationFailed, msg)
    }

    pub fn provider_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderUnavailable, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for AttestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for AttestError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidAddress,

    // Collaborator errors
    NetworkError,
    ProviderUnavailable,
    Timeout,
    NotFound,

    // Crypto errors
    SigningFailed,
    VerificationFailed,

    // Parse errors
    ParseError,
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for collaborator operations
pub type AttestResult<T> = Result<T, AttestError>;

// Conversions from common error types

impl From<serde_json::Error> for AttestError {
    fn from(e: serde_json::Error) -> Self {
        AttestError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for AttestError {
    fn from(e: hex::FromHexError) -> Self {
        AttestError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<crate::types::ParseError> for AttestError {
    fn from(e: crate::types::ParseError) -> Self {
        AttestError::new(ErrorCode::ParseError, e.to_string())
    }
}

impl From<crate::eip712::types::Eip712Error> for AttestError {
    fn from(e: crate::eip712::types::Eip712Error) -> Self {
        use crate::eip712::types::Eip712Error::*;
        let code = match &e {
            InvalidAddress(_) => ErrorCode::InvalidAddress,
            SigningFailed(_) => ErrorCode::SigningFailed,
            InvalidSignature(_) => ErrorCode::VerificationFailed,
            _ => ErrorCode::InvalidInput,
        };
        AttestError::new(code, e.to_string())
    }
}

impl From<crate::capability::CapabilityError> for AttestError {
    fn from(e: crate::capability::CapabilityError) -> Self {
        AttestError::new(ErrorCode::ProviderUnavailable, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_serialization_keeps_code_and_message() {
        let err = AttestError::network_error("RPC unreachable")
            .with_details("https://rpc.example invalid response");

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("network_error"));
        assert!(json.contains("RPC unreachable"));
    }

    #[test]
    fn eip712_error_maps_to_codes() {
        let err: AttestError =
            crate::eip712::types::Eip712Error::InvalidAddress("bad".to_string()).into();
        assert_eq!(err.code, ErrorCode::InvalidAddress);

        let err: AttestError =
            crate::eip712::types::Eip712Error::UnknownType("Ghost".to_string()).into();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }
}
