//! ECDSA Primitives
//!
//! Recoverable secp256k1 signing over a 32-byte digest, signer
//! recovery and address comparison. Higher layers decide *what* gets
//! hashed; this module only ever sees the final digest.

use super::types::{Eip712Error, Eip712Signature};
use crate::types::Address;
use crate::utils::crypto::keccak256;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

/// Sign a pre-computed digest with a raw secp256k1 key.
///
/// v is recovery_id + 27 per Ethereum convention.
pub fn sign_digest(digest: &[u8; 32], secret_key: &SecretKey) -> Result<Eip712Signature, Eip712Error> {
    let secp = Secp256k1::new();

    let message = Message::from_digest_slice(digest)
        .map_err(|e| Eip712Error::SigningFailed(e.to_string()))?;

    let (recovery_id, signature) = secp
        .sign_ecdsa_recoverable(&message, secret_key)
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature[0..32]);
    s.copy_from_slice(&signature[32..64]);

    let v = recovery_id.to_i32() as u8 + 27;

    Ok(Eip712Signature::new(r, s, v))
}

/// Recover the signer's address from a signature over a digest
pub fn recover_address(digest: &[u8; 32], signature: &Eip712Signature) -> Result<Address, Eip712Error> {
    let secp = Secp256k1::new();

    let v = signature.v;
    let normalized = if v >= 27 { v - 27 } else { v };
    let recovery_id = RecoveryId::from_i32(normalized as i32)
        .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    let mut compact = [0u8; 64];
    compact[0..32].copy_from_slice(&signature.r.0);
    compact[32..64].copy_from_slice(&signature.s.0);

    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    let message = Message::from_digest_slice(digest)
        .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    let public_key = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    Ok(public_key_to_address(&public_key))
}

/// Check a signature against a digest and an expected signer address
pub fn verify_digest(
    digest: &[u8; 32],
    signature: &Eip712Signature,
    expected: &Address,
) -> Result<bool, Eip712Error> {
    Ok(recover_address(digest, signature)? == *expected)
}

/// Keccak of the uncompressed public key (minus the 0x04 prefix),
/// last 20 bytes
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    Address(address)
}

#[cfg(test)]
mod signer_tests {
    use super::*;
    use secp256k1::SecretKey;

    // The well-known first dev-node account
    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn test_key() -> SecretKey {
        let bytes = hex::decode(TEST_KEY).unwrap();
        SecretKey::from_slice(&bytes).unwrap()
    }

    #[test]
    fn sign_and_recover_roundtrip() {
        let digest = keccak256(b"some digest");
        let signature = sign_digest(&digest, &test_key()).unwrap();

        let recovered = recover_address(&digest, &signature).unwrap();
        assert_eq!(recovered, TEST_ADDRESS.parse().unwrap());
        assert!(verify_digest(&digest, &signature, &recovered).unwrap());
    }

    #[test]
    fn wrong_address_is_false_not_error() {
        let digest = keccak256(b"some digest");
        let signature = sign_digest(&digest, &test_key()).unwrap();

        let other: Address = "0x1234567890123456789012345678901234567890".parse().unwrap();
        assert!(!verify_digest(&digest, &signature, &other).unwrap());
    }

    #[test]
    fn tampered_digest_recovers_different_address() {
        let digest = keccak256(b"some digest");
        let signature = sign_digest(&digest, &test_key()).unwrap();

        let other_digest = keccak256(b"another digest");
        let recovered = recover_address(&other_digest, &signature).unwrap();
        assert_ne!(recovered, TEST_ADDRESS.parse().unwrap());
    }

    #[test]
    fn invalid_recovery_id_errors() {
        let digest = keccak256(b"some digest");
        let mut signature = sign_digest(&digest, &test_key()).unwrap();
        signature.v = 99;
        assert!(recover_address(&digest, &signature).is_err());
    }
}
