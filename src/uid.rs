//! UID Calculator
//!
//! Content-addressed identifiers derived from tightly packed field
//! encodings: one formula for schema records, one for on-chain
//! attestations and a version-dependent one for offchain envelopes.
//! All three are pure functions; equal inputs always reproduce the
//! identical UID.

use crate::eip712::types::Eip712Error;
use crate::types::{Address, Bytes32, ProtocolVersion, Uid};
use crate::utils::crypto::keccak256;

/// UID of a schema record: keccak256 of the UTF-8 schema text, the
/// resolver address and the revocable flag, in that order.
pub fn schema_uid(schema_text: &str, resolver: &Address, revocable: bool) -> Uid {
    let mut packed = Vec::with_capacity(schema_text.len() + 21);
    packed.extend_from_slice(schema_text.as_bytes());
    packed.extend_from_slice(&resolver.0);
    packed.push(revocable as u8);
    Bytes32(keccak256(&packed))
}

/// UID of an on-chain attestation.
///
/// `bump` disambiguates in the exceptional case of a hash collision;
/// callers pass 0 in normal operation.
#[allow(clippy::too_many_arguments)]
pub fn attestation_uid(
    schema: &Uid,
    recipient: &Address,
    attester: &Address,
    time: u64,
    expiration_time: u64,
    revocable: bool,
    ref_uid: &Uid,
    data: &[u8],
    bump: u32,
) -> Uid {
    let mut packed = Vec::with_capacity(128 + data.len());
    packed.extend_from_slice(&schema.0);
    packed.extend_from_slice(&recipient.0);
    packed.extend_from_slice(&attester.0);
    packed.extend_from_slice(&time.to_be_bytes());
    packed.extend_from_slice(&expiration_time.to_be_bytes());
    packed.push(revocable as u8);
    packed.extend_from_slice(&ref_uid.0);
    packed.extend_from_slice(data);
    packed.extend_from_slice(&bump.to_be_bytes());
    Bytes32(keccak256(&packed))
}

/// UID of an offchain attestation envelope.
///
/// The layout depends on the protocol version: Version1 prepends the
/// uint16 version tag, Version2 additionally packs the salt between
/// the payload and the bump. The attester slot is always zero -
/// offchain envelopes bind the attester through the signature, not
/// the UID.
#[allow(clippy::too_many_arguments)]
pub fn offchain_attestation_uid(
    version: ProtocolVersion,
    schema: &Uid,
    recipient: &Address,
    time: u64,
    expiration_time: u64,
    revocable: bool,
    ref_uid: &Uid,
    data: &[u8],
    salt: Option<&Bytes32>,
) -> Result<Uid, Eip712Error> {
    let mut packed = Vec::with_capacity(166 + data.len());

    if version >= ProtocolVersion::Version1 {
        packed.extend_from_slice(&version.attest_version().to_be_bytes());
    }
    packed.extend_from_slice(&schema.0);
    packed.extend_from_slice(&recipient.0);
    packed.extend_from_slice(&Address::ZERO.0);
    packed.extend_from_slice(&time.to_be_bytes());
    packed.extend_from_slice(&expiration_time.to_be_bytes());
    packed.push(revocable as u8);
    packed.extend_from_slice(&ref_uid.0);
    packed.extend_from_slice(data);
    if version.has_salt() {
        let salt = salt.ok_or_else(|| Eip712Error::MissingField("salt".to_string()))?;
        packed.extend_from_slice(&salt.0);
    }
    packed.extend_from_slice(&0u32.to_be_bytes());

    Ok(Bytes32(keccak256(&packed)))
}
