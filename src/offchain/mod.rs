//! Offchain Attestation Envelopes
//!
//! Building, signing and verifying the self-describing typed-data
//! envelopes that carry attestations, revocations and their delegated
//! variants.

pub mod message;
pub mod signer;
pub mod verifier;

pub use message::{
    DelegatedAttestationItem, DelegatedProxyAttestationItem, DelegatedProxyRevocationItem,
    DelegatedRevocationItem, EnvelopeMessage, OffchainAttestationItem, OffchainRevocationItem,
};
pub use signer::{EnvelopeSigner, SignError, SignedEnvelope, SignedOffchainAttestation};
pub use verifier::{DomainField, EnvelopeVerifier, VerifyError};

#[cfg(test)]
mod tests;
