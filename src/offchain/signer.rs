//! Envelope Signer
//!
//! Assembles the full signed typed-data envelope for any message kind:
//! selects the versioned schema, orders the message fields, fills in a
//! random salt where the layout calls for one, computes the digest and
//! delegates the actual signature to the external capability.

use super::message::{EnvelopeMessage, OffchainAttestationItem, OffchainRevocationItem};
use crate::capability::{CapabilityError, SigningCapability};
use crate::eip712::hasher::typed_data_digest;
use crate::eip712::types::{Eip712Domain, Eip712Error, Eip712Signature, TypeMap, TypedData};
use crate::log_debug;
use crate::registry::{schema_for, MessageKind};
use crate::types::{Bytes32, ProtocolVersion, Uid};
use crate::uid::offchain_attestation_uid;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Errors from envelope assembly and signing
#[derive(Debug, Clone, thiserror::Error)]
pub enum SignError {
    #[error(transparent)]
    Encoding(#[from] Eip712Error),

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// The self-describing unit exchanged between signer and verifier.
///
/// Carries everything needed to recompute the digest: no external
/// state beyond the domain's verifying contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedEnvelope {
    /// Protocol revision the envelope was signed under
    pub version: ProtocolVersion,
    pub domain: Eip712Domain,
    pub primary_type: String,
    pub types: TypeMap,
    pub message: Map<String, Value>,
    pub signature: Eip712Signature,
}

impl SignedEnvelope {
    /// Rebuild the typed-data request this envelope was signed over
    pub fn typed_data(&self) -> TypedData {
        TypedData {
            types: self.types.clone(),
            primary_type: self.primary_type.clone(),
            domain: self.domain.clone(),
            message: self.message.clone(),
        }
    }
}

/// An offchain attestation envelope together with its UID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedOffchainAttestation {
    pub uid: Uid,
    #[serde(flatten)]
    pub envelope: SignedEnvelope,
}

/// Signs envelopes for one (domain, protocol version) pair.
///
/// Holds no key material and no mutable state; safe to share across
/// threads and to use concurrently.
#[derive(Debug, Clone)]
pub struct EnvelopeSigner {
    domain: Eip712Domain,
    version: ProtocolVersion,
}

impl EnvelopeSigner {
    pub fn new(version: ProtocolVersion, domain: Eip712Domain) -> Self {
        Self { domain, version }
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Sign any message kind. The item's candidate fields are filtered
    /// and ordered by the registry schema for this signer's version.
    pub async fn sign_message<M: EnvelopeMessage + Sync>(
        &self,
        item: &M,
        capability: &dyn SigningCapability,
    ) -> Result<SignedEnvelope, SignError> {
        let values = item.field_values(self.version);
        self.sign_fields(item.kind(), values, capability).await
    }

    /// Sign an offchain attestation, filling in a random salt when the
    /// Version2 layout asks for one and none was supplied. Returns the
    /// envelope together with its content-addressed UID.
    pub async fn sign_offchain_attestation(
        &self,
        mut item: OffchainAttestationItem,
        capability: &dyn SigningCapability,
    ) -> Result<SignedOffchainAttestation, SignError> {
        if self.version.has_salt() && item.salt.is_none() {
            item.salt = Some(random_salt());
        }

        let uid = offchain_attestation_uid(
            self.version,
            &item.schema,
            &item.recipient,
            item.time,
            item.expiration_time,
            item.revocable,
            &item.ref_uid,
            &item.data,
            item.salt.as_ref(),
        )?;

        log_debug!(
            "offchain::signer",
            "signing offchain attestation",
            uid = uid,
            schema = item.schema,
            recipient = item.recipient,
        );

        let envelope = self.sign_message(&item, capability).await?;
        Ok(SignedOffchainAttestation { uid, envelope })
    }

    /// Sign an offchain revocation, salting Version2 layouts like the
    /// attestation path
    pub async fn sign_offchain_revocation(
        &self,
        mut item: OffchainRevocationItem,
        capability: &dyn SigningCapability,
    ) -> Result<SignedEnvelope, SignError> {
        if self.version.has_salt() && item.salt.is_none() {
            item.salt = Some(random_salt());
        }
        self.sign_message(&item, capability).await
    }

    async fn sign_fields(
        &self,
        kind: MessageKind,
        values: Map<String, Value>,
        capability: &dyn SigningCapability,
    ) -> Result<SignedEnvelope, SignError> {
        let schema = schema_for(self.version, kind)?;

        // Select exactly the schema's fields, in schema order.
        let mut message = Map::new();
        for field in &schema.fields {
            let value = values
                .get(&field.name)
                .ok_or_else(|| Eip712Error::MissingField(field.name.clone()))?;
            message.insert(field.name.clone(), value.clone());
        }

        let typed_data = TypedData {
            types: schema.type_map(),
            primary_type: schema.primary_type.to_string(),
            domain: self.domain.clone(),
            message,
        };

        let digest = typed_data_digest(&typed_data)?;
        let signature = capability.sign_digest(&Bytes32(digest)).await?;

        Ok(SignedEnvelope {
            version: self.version,
            domain: typed_data.domain,
            primary_type: typed_data.primary_type,
            types: typed_data.types,
            message: typed_data.message,
            signature,
        })
    }
}

/// 32 random bytes from the OS entropy source
fn random_salt() -> Bytes32 {
    let mut salt = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    Bytes32(salt)
}
