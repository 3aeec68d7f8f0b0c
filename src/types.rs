//! Core Value Types
//!
//! Fixed-width primitives shared by every module: 20-byte addresses,
//! 32-byte words/UIDs and the protocol version tag carried inside
//! signed envelopes.

use crate::utils::crypto::to_checksum_address;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors from parsing the fixed-width value types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("invalid 32-byte value: {0}")]
    Word(String),

    #[error("unknown protocol version: {0}")]
    Version(u16),
}

// =============================================================================
// Address
// =============================================================================

/// A 20-byte account or contract address.
///
/// Parsing accepts hex with or without a `0x` prefix in any case;
/// display always renders the EIP-55 checksummed form. Equality is
/// byte equality, so two differently-cased renderings of the same
/// address compare equal once parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (also used as the absent-resolver marker)
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 checksummed rendering
    pub fn to_checksum(&self) -> String {
        to_checksum_address(&self.0)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if stripped.len() != 40 {
            return Err(ParseError::Address(format!(
                "expected 40 hex chars, got {}",
                stripped.len()
            )));
        }
        let bytes = hex::decode(stripped).map_err(|e| ParseError::Address(e.to_string()))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(DeError::custom)
    }
}

// =============================================================================
// Bytes32 / Uid
// =============================================================================

/// A 32-byte word: digests, salts, schema ids and reference UIDs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bytes32(pub [u8; 32]);

/// Content-addressed identifier for schemas and attestations
pub type Uid = Bytes32;

impl Bytes32 {
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex, the interchange rendering for UIDs
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Bytes32(bytes)
    }
}

impl FromStr for Bytes32 {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if stripped.len() != 64 {
            return Err(ParseError::Word(format!(
                "expected 64 hex chars, got {}",
                stripped.len()
            )));
        }
        let bytes = hex::decode(stripped).map_err(|e| ParseError::Word(e.to_string()))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Bytes32(out))
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Bytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(DeError::custom)
    }
}

// =============================================================================
// ProtocolVersion
// =============================================================================

/// Protocol revision a signed envelope was produced under.
///
/// Selects the type-schema shape and the UID formula. Ordering is
/// meaningful: `Version2` introduced the `salt` field absent from the
/// earlier layouts, so version comparisons gate salt handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolVersion {
    Legacy,
    Version1,
    Version2,
}

impl ProtocolVersion {
    /// The `uint16 version` value embedded in Version1+ message layouts
    pub fn attest_version(&self) -> u16 {
        match self {
            ProtocolVersion::Legacy => 0,
            ProtocolVersion::Version1 => 1,
            ProtocolVersion::Version2 => 2,
        }
    }

    /// Whether this revision's message layouts carry a `salt` field
    pub fn has_salt(&self) -> bool {
        *self >= ProtocolVersion::Version2
    }

    pub fn from_u16(value: u16) -> Result<Self, ParseError> {
        match value {
            0 => Ok(ProtocolVersion::Legacy),
            1 => Ok(ProtocolVersion::Version1),
            2 => Ok(ProtocolVersion::Version2),
            other => Err(ParseError::Version(other)),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attest_version())
    }
}

impl Serialize for ProtocolVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.attest_version())
    }
}

impl<'de> Deserialize<'de> for ProtocolVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u16::deserialize(deserializer)?;
        ProtocolVersion::from_u16(value).map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parse_normalizes_case_and_prefix() {
        let a: Address = "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826".parse().unwrap();
        let b: Address = "cd2a3d9f938e13cd947ec05abc7fe734df8dd826".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826");
    }

    #[test]
    fn address_rejects_bad_lengths() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn zero_address_detection() {
        assert!(Address::ZERO.is_zero());
        let a: Address = "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826".parse().unwrap();
        assert!(!a.is_zero());
    }

    #[test]
    fn bytes32_roundtrip() {
        let w: Bytes32 = "0x1122334455667788112233445566778811223344556677881122334455667788"
            .parse()
            .unwrap();
        assert_eq!(w.to_hex().parse::<Bytes32>().unwrap(), w);
        assert!(Bytes32::ZERO.is_zero());
    }

    #[test]
    fn protocol_version_ordering_and_salt() {
        assert!(ProtocolVersion::Legacy < ProtocolVersion::Version2);
        assert!(!ProtocolVersion::Legacy.has_salt());
        assert!(!ProtocolVersion::Version1.has_salt());
        assert!(ProtocolVersion::Version2.has_salt());
        assert_eq!(ProtocolVersion::from_u16(2).unwrap(), ProtocolVersion::Version2);
        assert!(ProtocolVersion::from_u16(9).is_err());
    }

    #[test]
    fn version_serde_as_integer() {
        let json = serde_json::to_string(&ProtocolVersion::Version2).unwrap();
        assert_eq!(json, "2");
        let back: ProtocolVersion = serde_json::from_str("1").unwrap();
        assert_eq!(back, ProtocolVersion::Version1);
    }
}
