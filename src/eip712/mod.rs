//! EIP-712 Typed Data Engine
//!
//! Canonical type-string construction, domain separator and struct
//! hashing, and the ECDSA primitives that sign and recover the final
//! digest.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>

pub mod encoder;
pub mod hasher;
pub mod signer;
pub mod types;

pub use encoder::{encode_type, encode_value, type_hash};
pub use hasher::{digest_parts, domain_separator, hash_struct, typed_data_digest, DigestParts, EIP712_DOMAIN_TYPE};
pub use signer::{public_key_to_address, recover_address, sign_digest, verify_digest};
pub use types::{Eip712Domain, Eip712Error, Eip712Signature, TypeMap, TypedData, TypedDataField};
