//! Envelope Verifier
//!
//! Structural validation of a received envelope against the expected
//! domain and versioned schema, then digest recomputation and signer
//! recovery. The checks run in a fixed order so the first violated
//! invariant determines the reported error.

use super::signer::SignedEnvelope;
use crate::eip712::hasher::typed_data_digest;
use crate::eip712::signer::recover_address;
use crate::eip712::types::{Eip712Domain, Eip712Error};
use crate::log_warn;
use crate::registry::{schema_for, MessageKind};
use crate::types::{Address, ProtocolVersion};
use std::fmt;

/// Which strict domain field failed the structural check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainField {
    Name,
    ChainId,
    VerifyingContract,
}

impl fmt::Display for DomainField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DomainField::Name => "name",
            DomainField::ChainId => "chainId",
            DomainField::VerifyingContract => "verifyingContract",
        };
        write!(f, "{}", name)
    }
}

/// Structural and cryptographic verification failures.
///
/// Structural variants always indicate a caller bug or a tampered
/// envelope and are never retried; `SignatureMismatch` is only raised
/// by the strict path: the boolean path reports that case as
/// `Ok(false)`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VerifyError {
    #[error("invalid address: expected signer must not be the zero address")]
    InvalidAddress,

    #[error("invalid domain: {field} mismatch (expected {expected}, found {found})")]
    InvalidDomain {
        field: DomainField,
        expected: String,
        found: String,
    },

    #[error("invalid primary type: expected {expected}, found {found}")]
    InvalidPrimaryType { expected: String, found: String },

    #[error("invalid types for primary type {primary_type}")]
    InvalidTypes { primary_type: String },

    #[error("signature recovers to {recovered}, expected {expected}")]
    SignatureMismatch {
        expected: Address,
        recovered: Address,
    },

    #[error(transparent)]
    Encoding(#[from] Eip712Error),
}

/// Verifies envelopes for one (domain, version, kind) triple.
#[derive(Debug, Clone)]
pub struct EnvelopeVerifier {
    domain: Eip712Domain,
    version: ProtocolVersion,
    kind: MessageKind,
}

impl EnvelopeVerifier {
    pub fn new(version: ProtocolVersion, kind: MessageKind, domain: Eip712Domain) -> Self {
        Self {
            domain,
            version,
            kind,
        }
    }

    /// Verify an envelope.
    ///
    /// Structural defects surface as errors; a well-formed envelope
    /// whose signature recovers to a different address yields
    /// `Ok(false)`: the expected, recoverable outcome.
    pub fn verify(
        &self,
        expected_signer: &Address,
        envelope: &SignedEnvelope,
    ) -> Result<bool, VerifyError> {
        self.check_structure(expected_signer, envelope)?;
        let recovered = self.recover(envelope)?;
        Ok(recovered == *expected_signer)
    }

    /// Like [`verify`](Self::verify), but raises `SignatureMismatch`
    /// instead of returning `false`
    pub fn verify_strict(
        &self,
        expected_signer: &Address,
        envelope: &SignedEnvelope,
    ) -> Result<(), VerifyError> {
        self.check_structure(expected_signer, envelope)?;
        let recovered = self.recover(envelope)?;
        if recovered != *expected_signer {
            return Err(VerifyError::SignatureMismatch {
                expected: *expected_signer,
                recovered,
            });
        }
        Ok(())
    }

    /// Checks 1-4, in order. The domain `version` string is
    /// intentionally not checked here: a tampered version changes the
    /// domain separator and is caught by recovery instead, so callers
    /// see that one field as a signature mismatch rather than a
    /// structural error.
    fn check_structure(
        &self,
        expected_signer: &Address,
        envelope: &SignedEnvelope,
    ) -> Result<(), VerifyError> {
        if expected_signer.is_zero() {
            return Err(VerifyError::InvalidAddress);
        }

        let domain = &envelope.domain;
        if domain.name != self.domain.name {
            return Err(self.domain_error(DomainField::Name, &self.domain.name, &domain.name));
        }
        if domain.chain_id != self.domain.chain_id {
            return Err(self.domain_error(
                DomainField::ChainId,
                &self.domain.chain_id.to_string(),
                &domain.chain_id.to_string(),
            ));
        }
        if domain.verifying_contract != self.domain.verifying_contract {
            return Err(self.domain_error(
                DomainField::VerifyingContract,
                &self.domain.verifying_contract.to_checksum(),
                &domain.verifying_contract.to_checksum(),
            ));
        }

        let schema = schema_for(self.version, self.kind)?;
        if envelope.primary_type != schema.primary_type {
            return Err(VerifyError::InvalidPrimaryType {
                expected: schema.primary_type.to_string(),
                found: envelope.primary_type.clone(),
            });
        }

        // The envelope's type table must be exactly the expected
        // schema: same single key, same field names/types/order.
        let matches_schema = envelope.types.len() == 1
            && envelope
                .types
                .get(schema.primary_type)
                .is_some_and(|fields| *fields == schema.fields);
        if !matches_schema {
            log_warn!(
                "offchain::verifier",
                "envelope type table does not match expected schema",
                primary_type = schema.primary_type,
            );
            return Err(VerifyError::InvalidTypes {
                primary_type: schema.primary_type.to_string(),
            });
        }

        Ok(())
    }

    fn recover(&self, envelope: &SignedEnvelope) -> Result<Address, VerifyError> {
        let digest = typed_data_digest(&envelope.typed_data())?;
        Ok(recover_address(&digest, &envelope.signature)?)
    }

    fn domain_error(&self, field: DomainField, expected: &str, found: &str) -> VerifyError {
        log_warn!(
            "offchain::verifier",
            "envelope domain mismatch",
            field = field,
        );
        VerifyError::InvalidDomain {
            field,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
