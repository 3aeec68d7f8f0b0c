//! EIP-712 Type Definitions
//!
//! Core data structures for typed structured data: field descriptors,
//! the signing domain, the self-describing typed-data envelope body
//! and the recoverable signature.

use crate::types::{Address, Bytes32};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A field in a struct type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint64", "bytes32")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Ordered map of struct name to field list, the `types` member of a
/// typed-data request. BTreeMap keeps serialization deterministic.
pub type TypeMap = BTreeMap<String, Vec<TypedDataField>>;

/// The EIP-712 signing domain.
///
/// Immutable once constructed; one instance per
/// (protocol version, contract address, chain) triple. All four
/// fields are always present in this protocol family, so the domain
/// type string is a fixed constant rather than derived per envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    /// The human-readable name of the signing domain
    pub name: String,
    /// The version string of the verifying contract
    pub version: String,
    /// The EIP-155 chain id
    pub chain_id: u64,
    /// The contract that will verify signatures scoped to this domain
    pub verifying_contract: Address,
}

impl Eip712Domain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// The canonical field descriptors of the domain struct
    pub fn type_fields() -> Vec<TypedDataField> {
        vec![
            TypedDataField::new("name", "string"),
            TypedDataField::new("version", "string"),
            TypedDataField::new("chainId", "uint256"),
            TypedDataField::new("verifyingContract", "address"),
        ]
    }
}

/// Complete typed-data request: the unit a wallet is asked to sign
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    /// Type definitions (struct name -> ordered fields)
    pub types: TypeMap,
    /// The name of the primary type being signed
    pub primary_type: String,
    /// The signing domain
    pub domain: Eip712Domain,
    /// Field name -> value for the primary type
    pub message: serde_json::Map<String, serde_json::Value>,
}

/// A recoverable ECDSA signature in Ethereum's r/s/v layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Signature {
    /// r component (32 bytes)
    pub r: Bytes32,
    /// s component (32 bytes)
    pub s: Bytes32,
    /// recovery id, offset to 27/28 per Ethereum convention
    pub v: u8,
}

impl Eip712Signature {
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self {
            r: Bytes32(r),
            s: Bytes32(s),
            v,
        }
    }

    /// Parse a 65-byte signature (r || s || v)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Eip712Error> {
        if bytes.len() != 65 {
            return Err(Eip712Error::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self::new(r, s, bytes[64]))
    }

    /// Serialize to the 65-byte wire layout (r || s || v)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0..32].copy_from_slice(&self.r.0);
        bytes[32..64].copy_from_slice(&self.s.0);
        bytes[64] = self.v;
        bytes
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

/// Errors raised while encoding or hashing typed data
#[derive(Debug, Clone, thiserror::Error)]
pub enum Eip712Error {
    /// A referenced struct type is absent from the `types` map
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A field's declared type has no encoding rule
    #[error("no encoding rule for field type: {0}")]
    UnknownFieldType(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid value for type {type_name}: {value}")]
    InvalidValue { type_name: String, value: String },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn signature_byte_roundtrip() {
        let sig = Eip712Signature::new([1u8; 32], [2u8; 32], 27);
        let bytes = sig.to_bytes();
        let recovered = Eip712Signature::from_bytes(&bytes).unwrap();
        assert_eq!(sig, recovered);
        assert_eq!(sig.to_hex().len(), 132); // 0x + 65 bytes * 2
    }

    #[test]
    fn signature_rejects_short_input() {
        assert!(Eip712Signature::from_bytes(&[0u8; 64]).is_err());
    }

    #[test]
    fn signature_json_shape() {
        let sig = Eip712Signature::new([0xaa; 32], [0xbb; 32], 28);
        let json = serde_json::to_value(&sig).unwrap();
        assert_eq!(json["v"], 28);
        assert!(json["r"].as_str().unwrap().starts_with("0xaaaa"));
    }

    #[test]
    fn domain_serializes_camel_case() {
        let domain = Eip712Domain::new("Ether Mail", "1", 1, Address::ZERO);
        let json = serde_json::to_value(&domain).unwrap();
        assert_eq!(json["chainId"], 1);
        assert_eq!(
            json["verifyingContract"],
            "0x0000000000000000000000000000000000000000"
        );
    }
}
