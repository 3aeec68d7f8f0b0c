//! Signable Message Kinds
//!
//! Typed request structs for each message flavor. Every struct renders
//! its fields into a name -> value map; the envelope builder then
//! selects and orders fields according to the registry schema for the
//! target protocol version, so version-shape logic lives in exactly
//! one place.

use crate::registry::MessageKind;
use crate::types::{Address, Bytes32, ProtocolVersion, Uid};
use serde_json::{Map, Value};

/// A request that can be rendered into a typed-data message
pub trait EnvelopeMessage {
    fn kind(&self) -> MessageKind;

    /// Every field this request can supply, keyed by typed-data field
    /// name. Superset semantics: the envelope builder picks the subset
    /// the target version's schema declares.
    fn field_values(&self, version: ProtocolVersion) -> Map<String, Value>;
}

fn hex_value(data: &[u8]) -> Value {
    Value::String(format!("0x{}", hex::encode(data)))
}

/// u64 fields ride as JSON numbers, u128 fields as decimal strings
/// (JSON numbers stop being lossless past 2^53 in most consumers)
fn u128_value(value: u128) -> Value {
    Value::String(value.to_string())
}

/// An offchain attestation to be signed.
///
/// `salt` may be left `None`; the signer fills in a random salt for
/// Version2 envelopes before hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffchainAttestationItem {
    pub schema: Uid,
    pub recipient: Address,
    pub time: u64,
    pub expiration_time: u64,
    pub revocable: bool,
    pub ref_uid: Uid,
    pub data: Vec<u8>,
    pub salt: Option<Bytes32>,
}

impl EnvelopeMessage for OffchainAttestationItem {
    fn kind(&self) -> MessageKind {
        MessageKind::Attestation
    }

    fn field_values(&self, version: ProtocolVersion) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("version".into(), Value::from(version.attest_version()));
        map.insert("schema".into(), Value::String(self.schema.to_hex()));
        map.insert("recipient".into(), Value::String(self.recipient.to_checksum()));
        map.insert("time".into(), Value::from(self.time));
        map.insert("expirationTime".into(), Value::from(self.expiration_time));
        map.insert("revocable".into(), Value::Bool(self.revocable));
        map.insert("refUID".into(), Value::String(self.ref_uid.to_hex()));
        map.insert("data".into(), hex_value(&self.data));
        if let Some(salt) = &self.salt {
            map.insert("salt".into(), Value::String(salt.to_hex()));
        }
        map
    }
}

/// An offchain revocation of a previously issued attestation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffchainRevocationItem {
    pub schema: Uid,
    pub uid: Uid,
    pub time: u64,
    pub salt: Option<Bytes32>,
}

impl EnvelopeMessage for OffchainRevocationItem {
    fn kind(&self) -> MessageKind {
        MessageKind::Revocation
    }

    fn field_values(&self, version: ProtocolVersion) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("version".into(), Value::from(version.attest_version()));
        map.insert("schema".into(), Value::String(self.schema.to_hex()));
        map.insert("uid".into(), Value::String(self.uid.to_hex()));
        map.insert("time".into(), Value::from(self.time));
        if let Some(salt) = &self.salt {
            map.insert("salt".into(), Value::String(salt.to_hex()));
        }
        map
    }
}

/// A delegated attestation: signed off-chain, submitted on-chain by a
/// third party. The nonce comes from the chain-query collaborator and
/// is threaded through explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedAttestationItem {
    pub attester: Address,
    pub schema: Uid,
    pub recipient: Address,
    pub expiration_time: u64,
    pub revocable: bool,
    pub ref_uid: Uid,
    pub data: Vec<u8>,
    pub value: u128,
    pub nonce: u128,
    pub deadline: u64,
}

impl EnvelopeMessage for DelegatedAttestationItem {
    fn kind(&self) -> MessageKind {
        MessageKind::DelegatedAttestation
    }

    fn field_values(&self, _version: ProtocolVersion) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("attester".into(), Value::String(self.attester.to_checksum()));
        map.insert("schema".into(), Value::String(self.schema.to_hex()));
        map.insert("recipient".into(), Value::String(self.recipient.to_checksum()));
        map.insert("expirationTime".into(), Value::from(self.expiration_time));
        map.insert("revocable".into(), Value::Bool(self.revocable));
        map.insert("refUID".into(), Value::String(self.ref_uid.to_hex()));
        map.insert("data".into(), hex_value(&self.data));
        map.insert("value".into(), u128_value(self.value));
        map.insert("nonce".into(), u128_value(self.nonce));
        map.insert("deadline".into(), Value::from(self.deadline));
        map
    }
}

/// A delegated revocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedRevocationItem {
    pub revoker: Address,
    pub schema: Uid,
    pub uid: Uid,
    pub value: u128,
    pub nonce: u128,
    pub deadline: u64,
}

impl EnvelopeMessage for DelegatedRevocationItem {
    fn kind(&self) -> MessageKind {
        MessageKind::DelegatedRevocation
    }

    fn field_values(&self, _version: ProtocolVersion) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("revoker".into(), Value::String(self.revoker.to_checksum()));
        map.insert("schema".into(), Value::String(self.schema.to_hex()));
        map.insert("uid".into(), Value::String(self.uid.to_hex()));
        map.insert("value".into(), u128_value(self.value));
        map.insert("nonce".into(), u128_value(self.nonce));
        map.insert("deadline".into(), Value::from(self.deadline));
        map
    }
}

/// A delegated attestation routed through an intermediary proxy
/// contract; replay is bounded by the deadline, not a nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedProxyAttestationItem {
    pub attester: Address,
    pub schema: Uid,
    pub recipient: Address,
    pub expiration_time: u64,
    pub revocable: bool,
    pub ref_uid: Uid,
    pub data: Vec<u8>,
    pub value: u128,
    pub deadline: u64,
}

impl EnvelopeMessage for DelegatedProxyAttestationItem {
    fn kind(&self) -> MessageKind {
        MessageKind::DelegatedProxyAttestation
    }

    fn field_values(&self, _version: ProtocolVersion) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("attester".into(), Value::String(self.attester.to_checksum()));
        map.insert("schema".into(), Value::String(self.schema.to_hex()));
        map.insert("recipient".into(), Value::String(self.recipient.to_checksum()));
        map.insert("expirationTime".into(), Value::from(self.expiration_time));
        map.insert("revocable".into(), Value::Bool(self.revocable));
        map.insert("refUID".into(), Value::String(self.ref_uid.to_hex()));
        map.insert("data".into(), hex_value(&self.data));
        map.insert("value".into(), u128_value(self.value));
        map.insert("deadline".into(), Value::from(self.deadline));
        map
    }
}

/// A delegated revocation routed through an intermediary proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedProxyRevocationItem {
    pub revoker: Address,
    pub schema: Uid,
    pub uid: Uid,
    pub value: u128,
    pub deadline: u64,
}

impl EnvelopeMessage for DelegatedProxyRevocationItem {
    fn kind(&self) -> MessageKind {
        MessageKind::DelegatedProxyRevocation
    }

    fn field_values(&self, _version: ProtocolVersion) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("revoker".into(), Value::String(self.revoker.to_checksum()));
        map.insert("schema".into(), Value::String(self.schema.to_hex()));
        map.insert("uid".into(), Value::String(self.uid.to_hex()));
        map.insert("value".into(), u128_value(self.value));
        map.insert("deadline".into(), Value::from(self.deadline));
        map
    }
}
