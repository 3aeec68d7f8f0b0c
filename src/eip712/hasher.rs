//! EIP-712 Hashing
//!
//! Domain separator, struct hash and the final two-hash digest that
//! gets signed. All operations here are pure and deterministic.

use super::encoder::encode_struct;
use super::types::{Eip712Domain, Eip712Error, TypeMap, TypedData};
use crate::utils::crypto::keccak256;
use serde_json::Value;

/// Magic prefix for the final digest
const EIP712_PREFIX: &[u8] = b"\x19\x01";

/// Canonical type string of the four-field signing domain
pub const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Calculate the domain separator hash.
///
/// domainSeparator = hashStruct(eip712Domain). The domain shape is
/// fixed for this protocol family, so this never fails.
pub fn domain_separator(domain: &Eip712Domain) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(32 * 5);
    encoded.extend_from_slice(&keccak256(EIP712_DOMAIN_TYPE.as_bytes()));
    encoded.extend_from_slice(&keccak256(domain.name.as_bytes()));
    encoded.extend_from_slice(&keccak256(domain.version.as_bytes()));

    let mut chain_id = [0u8; 32];
    chain_id[24..].copy_from_slice(&domain.chain_id.to_be_bytes());
    encoded.extend_from_slice(&chain_id);

    let mut contract = [0u8; 32];
    contract[12..].copy_from_slice(&domain.verifying_contract.0);
    encoded.extend_from_slice(&contract);

    keccak256(&encoded)
}

/// hashStruct(s) = keccak256(typeHash || encodeData(s))
pub fn hash_struct(
    type_name: &str,
    message: &serde_json::Map<String, Value>,
    types: &TypeMap,
) -> Result<[u8; 32], Eip712Error> {
    let value = Value::Object(message.clone());
    Ok(keccak256(&encode_struct(type_name, &value, types)?))
}

/// The three digests of one typed-data request
#[derive(Debug, Clone, Copy)]
pub struct DigestParts {
    pub domain_separator: [u8; 32],
    pub struct_hash: [u8; 32],
    pub digest: [u8; 32],
}

/// Compute all digest components for a typed-data request.
///
/// digest = keccak256("\x19\x01" || domainSeparator || hashStruct(message))
pub fn digest_parts(typed_data: &TypedData) -> Result<DigestParts, Eip712Error> {
    let domain_separator = domain_separator(&typed_data.domain);
    let struct_hash = hash_struct(&typed_data.primary_type, &typed_data.message, &typed_data.types)?;

    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(EIP712_PREFIX);
    data.extend_from_slice(&domain_separator);
    data.extend_from_slice(&struct_hash);

    Ok(DigestParts {
        domain_separator,
        struct_hash,
        digest: keccak256(&data),
    })
}

/// The final digest to sign
pub fn typed_data_digest(typed_data: &TypedData) -> Result<[u8; 32], Eip712Error> {
    Ok(digest_parts(typed_data)?.digest)
}
