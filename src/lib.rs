//! Attestation Signing SDK
//!
//! Produce cryptographically verifiable, replay-resistant claims
//! ("attestations") over schema-typed payloads without submitting a
//! transaction, and verify such claims by recomputing their digest and
//! recovering the signer.
//!
//! # Architecture
//!
//! This crate provides:
//! - **eip712**: the typed-data engine: canonical type strings,
//!   domain separator, struct hash, final digest, ECDSA primitives
//! - **registry**: versioned type schemas per message kind + the
//!   domain resolver
//! - **uid**: content-addressed identifiers for schemas and
//!   attestations (on-chain and offchain layouts)
//! - **offchain**: envelope assembly, signing and verification
//! - **capability**: the external signing capability boundary
//! - **chain**: collaborator interfaces for nonce/timestamp queries,
//!   transaction submission and schema-registry CRUD
//!
//! Hashing, encoding and structural verification are pure and
//! synchronous; the only suspension point is the signer's delegation
//! to the external signing capability.
//!
//! # Example
//!
//! ```rust,ignore
//! use attest_sdk::{
//!     DomainResolver, EnvelopeSigner, EnvelopeVerifier, LocalSigningKey,
//!     MessageKind, OffchainAttestationItem, ProtocolVersion,
//! };
//!
//! let resolver = DomainResolver::new(ProtocolVersion::Version2);
//! let domain = resolver.offchain("1.2.0", chain_id, contract);
//!
//! let signer = EnvelopeSigner::new(ProtocolVersion::Version2, domain.clone());
//! let signed = signer.sign_offchain_attestation(item, &key).await?;
//!
//! let verifier = EnvelopeVerifier::new(ProtocolVersion::Version2, MessageKind::Attestation, domain);
//! assert!(verifier.verify(&key.address(), &signed.envelope)?);
//! ```

pub mod capability;
pub mod chain;
pub mod eip712;
pub mod error;
pub mod offchain;
pub mod registry;
pub mod types;
pub mod uid;
pub mod utils;

// Re-export key types for convenience
pub use error::{AttestError, AttestResult, ErrorCode};
pub use types::{Address, Bytes32, ProtocolVersion, Uid};

pub use capability::{CapabilityError, LocalSigningKey, SigningCapability};
pub use eip712::{Eip712Domain, Eip712Error, Eip712Signature, TypedData, TypedDataField};
pub use offchain::{
    DelegatedAttestationItem, DelegatedProxyAttestationItem, DelegatedProxyRevocationItem,
    DelegatedRevocationItem, EnvelopeSigner, EnvelopeVerifier, OffchainAttestationItem,
    OffchainRevocationItem, SignError, SignedEnvelope, SignedOffchainAttestation, VerifyError,
};
pub use registry::{DomainResolver, MessageKind, TypeSchema};
pub use uid::{attestation_uid, offchain_attestation_uid, schema_uid};

// Re-export crypto utilities used by downstream harnesses
pub use utils::crypto::{keccak256, to_checksum_address};
