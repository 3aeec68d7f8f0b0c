//! External Signing Capability
//!
//! The signer never touches key material directly: it hands the final
//! digest to a capability (a local key, a hardware wallet, a remote
//! signer) and waits for a complete signature or a failure. The call
//! is single-shot: no retries, no partial results.

use crate::eip712::signer::{public_key_to_address, sign_digest};
use crate::eip712::types::Eip712Signature;
use crate::types::{Address, Bytes32};
use async_trait::async_trait;
use secp256k1::{Secp256k1, SecretKey};
use zeroize::Zeroizing;

/// Failures of the external signing capability
#[derive(Debug, Clone, thiserror::Error)]
pub enum CapabilityError {
    /// The capability cannot produce a signature right now
    /// (disconnected, cancelled, aborted)
    #[error("signing capability unavailable: {0}")]
    Unavailable(String),

    /// The capability refused the request (user rejection, policy)
    #[error("signing request rejected: {0}")]
    Rejected(String),
}

/// A capability that signs 32-byte digests.
///
/// May suspend while awaiting an external device or service; the
/// caller treats the call as atomic.
#[async_trait]
pub trait SigningCapability: Send + Sync {
    async fn sign_digest(&self, digest: &Bytes32) -> Result<Eip712Signature, CapabilityError>;

    /// The address signatures from this capability recover to
    fn address(&self) -> Address;
}

/// In-process capability backed by a raw secp256k1 key.
///
/// Intermediate key buffers are wiped after import.
pub struct LocalSigningKey {
    secret_key: SecretKey,
    address: Address,
}

impl LocalSigningKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CapabilityError> {
        if bytes.len() != 32 {
            return Err(CapabilityError::Unavailable(format!(
                "invalid private key length: expected 32, got {}",
                bytes.len()
            )));
        }
        let secret_key = SecretKey::from_slice(bytes)
            .map_err(|e| CapabilityError::Unavailable(e.to_string()))?;

        let secp = Secp256k1::new();
        let address = public_key_to_address(&secret_key.public_key(&secp));

        Ok(Self { secret_key, address })
    }

    pub fn from_hex(hex_key: &str) -> Result<Self, CapabilityError> {
        let stripped = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        let bytes = Zeroizing::new(
            hex::decode(stripped).map_err(|e| CapabilityError::Unavailable(e.to_string()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Generate a fresh random key (test harnesses, throwaway attesters)
    pub fn random() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut rand::rngs::OsRng);
        Self {
            secret_key,
            address: public_key_to_address(&public_key),
        }
    }
}

impl std::fmt::Debug for LocalSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print key material
        f.debug_struct("LocalSigningKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SigningCapability for LocalSigningKey {
    async fn sign_digest(&self, digest: &Bytes32) -> Result<Eip712Signature, CapabilityError> {
        sign_digest(&digest.0, &self.secret_key)
            .map_err(|e| CapabilityError::Unavailable(e.to_string()))
    }

    fn address(&self) -> Address {
        self.address
    }
}

#[cfg(test)]
mod capability_tests {
    use super::*;
    use crate::eip712::signer::recover_address;
    use crate::utils::crypto::keccak256;

    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn local_key_signs_and_recovers() {
        let key = LocalSigningKey::from_hex(TEST_KEY).unwrap();
        assert_eq!(
            key.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );

        let digest = Bytes32(keccak256(b"digest"));
        let signature = key.sign_digest(&digest).await.unwrap();
        assert_eq!(recover_address(&digest.0, &signature).unwrap(), key.address());
    }

    #[test]
    fn rejects_short_keys() {
        assert!(LocalSigningKey::from_bytes(&[0u8; 16]).is_err());
    }

    #[test]
    fn random_keys_differ() {
        assert_ne!(LocalSigningKey::random().address(), LocalSigningKey::random().address());
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = LocalSigningKey::from_hex(TEST_KEY).unwrap();
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("ac0974"));
    }
}
