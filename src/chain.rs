//! Chain Collaborator Interfaces
//!
//! This crate never talks to a chain. Replay-protection nonces, block
//! timestamps, transaction submission and schema-registry CRUD are
//! capabilities of external collaborators, specified here as trait
//! boundaries only. Implementations live with the runtime that owns
//! the connection.

use crate::error::AttestResult;
use crate::types::{Address, Uid};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A registered schema record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRecord {
    pub uid: Uid,
    pub schema: String,
    pub resolver: Address,
    pub revocable: bool,
}

/// Payload of an on-chain attest call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRequest {
    pub schema: Uid,
    pub recipient: Address,
    pub expiration_time: u64,
    pub revocable: bool,
    #[serde(rename = "refUID")]
    pub ref_uid: Uid,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    pub value: u128,
}

/// Payload of an on-chain revoke call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRequest {
    pub schema: Uid,
    pub uid: Uid,
    pub value: u128,
}

/// Read-only chain state needed to build delegated messages.
///
/// Nonces are owned by the chain; this crate only threads them
/// through as explicit inputs and never increments them.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Current replay-protection nonce for an attester/revoker
    async fn nonce_of(&self, address: &Address) -> AttestResult<u128>;

    /// Timestamp of the latest block
    async fn block_timestamp(&self) -> AttestResult<u64>;
}

/// Submits attest/revoke transactions
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Submit an attestation; resolves to the on-chain UID
    async fn submit_attestation(&self, request: &AttestationRequest) -> AttestResult<Uid>;

    /// Submit a revocation of an existing attestation
    async fn submit_revocation(&self, request: &RevocationRequest) -> AttestResult<()>;
}

/// Schema registry, keyed by schema UID
#[async_trait]
pub trait SchemaRegistryClient: Send + Sync {
    /// Register a schema; resolves to its UID. Registering an
    /// identical (schema, resolver, revocable) triple reproduces the
    /// identical UID.
    async fn register(
        &self,
        schema: &str,
        resolver: &Address,
        revocable: bool,
    ) -> AttestResult<Uid>;

    /// Fetch a schema record by UID
    async fn schema(&self, uid: &Uid) -> AttestResult<Option<SchemaRecord>>;
}

/// Hex serde for binary payload fields
mod hex_bytes {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(stripped).map_err(Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attestation_request_serde_roundtrip() {
        let request = AttestationRequest {
            schema: Uid::ZERO,
            recipient: Address::ZERO,
            expiration_time: 0,
            revocable: true,
            ref_uid: Uid::ZERO,
            data: vec![0xde, 0xad],
            value: 0,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"data\":\"0xdead\""));
        let parsed: AttestationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, request);
    }
}
