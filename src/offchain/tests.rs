//! Offchain Envelope Test Suite
//!
//! Signing against the canonical deployment domains, with golden
//! digests cross-checked against the reference encoding.

use super::*;
use crate::capability::{CapabilityError, LocalSigningKey, SigningCapability};
use crate::eip712::hasher::{digest_parts, typed_data_digest};
use crate::eip712::signer::recover_address;
use crate::eip712::types::{Eip712Domain, Eip712Signature};
use crate::registry::DomainResolver;
use crate::types::{Address, Bytes32, ProtocolVersion, Uid};
use crate::uid::schema_uid;
use async_trait::async_trait;

const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn contract() -> Address {
    "0xA1207F3BBa224E2c9c3c6D5aF63D0eb1582Ce587".parse().unwrap()
}

fn recipient() -> Address {
    "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826".parse().unwrap()
}

fn domain(version: ProtocolVersion, contract_version: &str) -> Eip712Domain {
    DomainResolver::new(version).offchain(contract_version, 1, contract())
}

fn attestation_item(salt: Option<Bytes32>) -> OffchainAttestationItem {
    OffchainAttestationItem {
        schema: schema_uid("bool like", &Address::ZERO, true),
        recipient: recipient(),
        time: 1_700_000_000,
        expiration_time: 0,
        revocable: true,
        ref_uid: Uid::ZERO,
        data: hex::decode("0000000000000000000000000000000000000000000000000000000000000001")
            .unwrap(),
        salt,
    }
}

fn fixed_salt() -> Bytes32 {
    "0x1122334455667788112233445566778811223344556677881122334455667788"
        .parse()
        .unwrap()
}

#[tokio::test]
async fn version2_envelope_digest_golden() {
    let key = LocalSigningKey::from_hex(TEST_KEY).unwrap();
    let signer = EnvelopeSigner::new(ProtocolVersion::Version2, domain(ProtocolVersion::Version2, "1.2.0"));

    let signed = signer
        .sign_offchain_attestation(attestation_item(Some(fixed_salt())), &key)
        .await
        .unwrap();

    let parts = digest_parts(&signed.envelope.typed_data()).unwrap();
    assert_eq!(
        hex::encode(parts.domain_separator),
        "c71f1b0c4f32709717dea96dda0ca761e4e159a63019104609f9aae331d96306"
    );
    assert_eq!(
        hex::encode(parts.struct_hash),
        "6a2c27bc885b46571245608f0a0bba24d3922632d44925174f31f062073ab5aa"
    );
    assert_eq!(
        hex::encode(parts.digest),
        "4f5738ba5a5c99648f7226a73ff481ba06e3b64e1f67ca14507a851f6c572528"
    );
    assert_eq!(
        signed.uid.to_hex(),
        "0x90fafdce246558dffe0dc739a21b9c22944eb6bc86693293391192ba5deb4bb4"
    );
    assert_eq!(
        recover_address(&parts.digest, &signed.envelope.signature).unwrap(),
        key.address()
    );
}

#[tokio::test]
async fn legacy_envelope_digest_golden() {
    let key = LocalSigningKey::from_hex(TEST_KEY).unwrap();
    let signer = EnvelopeSigner::new(ProtocolVersion::Legacy, domain(ProtocolVersion::Legacy, "0.26"));

    let signed = signer
        .sign_offchain_attestation(attestation_item(None), &key)
        .await
        .unwrap();

    assert_eq!(signed.envelope.primary_type, "Attestation");
    assert!(!signed.envelope.message.contains_key("salt"));
    assert!(!signed.envelope.message.contains_key("version"));
    assert_eq!(
        hex::encode(typed_data_digest(&signed.envelope.typed_data()).unwrap()),
        "1defc664a4f366e3467e89e0953fe97471031ff6b7385219dc2d93f0225948d3"
    );
}

#[tokio::test]
async fn default_salts_are_random_and_change_everything() {
    let key = LocalSigningKey::from_hex(TEST_KEY).unwrap();
    let signer = EnvelopeSigner::new(ProtocolVersion::Version2, domain(ProtocolVersion::Version2, "1.2.0"));

    let first = signer
        .sign_offchain_attestation(attestation_item(None), &key)
        .await
        .unwrap();
    let second = signer
        .sign_offchain_attestation(attestation_item(None), &key)
        .await
        .unwrap();

    assert_ne!(first.envelope.message["salt"], second.envelope.message["salt"]);
    assert_ne!(first.uid, second.uid);
    assert_ne!(
        typed_data_digest(&first.envelope.typed_data()).unwrap(),
        typed_data_digest(&second.envelope.typed_data()).unwrap()
    );
}

#[tokio::test]
async fn explicit_salt_is_deterministic() {
    let key = LocalSigningKey::from_hex(TEST_KEY).unwrap();
    let signer = EnvelopeSigner::new(ProtocolVersion::Version2, domain(ProtocolVersion::Version2, "1.2.0"));

    let first = signer
        .sign_offchain_attestation(attestation_item(Some(fixed_salt())), &key)
        .await
        .unwrap();
    let second = signer
        .sign_offchain_attestation(attestation_item(Some(fixed_salt())), &key)
        .await
        .unwrap();

    assert_eq!(first.uid, second.uid);
    assert_eq!(
        typed_data_digest(&first.envelope.typed_data()).unwrap(),
        typed_data_digest(&second.envelope.typed_data()).unwrap()
    );
}

#[tokio::test]
async fn revocation_envelope_signs_and_verifies() {
    let key = LocalSigningKey::from_hex(TEST_KEY).unwrap();
    let signer = EnvelopeSigner::new(ProtocolVersion::Version2, domain(ProtocolVersion::Version2, "1.2.0"));

    let item = OffchainRevocationItem {
        schema: schema_uid("bool like", &Address::ZERO, true),
        uid: fixed_salt(),
        time: 1_700_000_100,
        salt: None,
    };
    let envelope = signer.sign_offchain_revocation(item, &key).await.unwrap();
    assert_eq!(envelope.primary_type, "Revoke");
    assert!(envelope.message.contains_key("salt"));

    let verifier = EnvelopeVerifier::new(
        ProtocolVersion::Version2,
        crate::registry::MessageKind::Revocation,
        domain(ProtocolVersion::Version2, "1.2.0"),
    );
    assert!(verifier.verify(&key.address(), &envelope).unwrap());
}

#[tokio::test]
async fn delegated_attestation_roundtrip() {
    let key = LocalSigningKey::from_hex(TEST_KEY).unwrap();
    let resolver = DomainResolver::new(ProtocolVersion::Version2);
    let delegated_domain = resolver.delegated("1.2.0", 1, contract());
    let signer = EnvelopeSigner::new(ProtocolVersion::Version2, delegated_domain.clone());

    let item = DelegatedAttestationItem {
        attester: key.address(),
        schema: schema_uid("bool like", &Address::ZERO, true),
        recipient: recipient(),
        expiration_time: 0,
        revocable: true,
        ref_uid: Uid::ZERO,
        data: vec![0x01],
        value: 0,
        nonce: 7,
        deadline: 1_800_000_000,
    };
    let envelope = signer.sign_message(&item, &key).await.unwrap();
    assert_eq!(envelope.domain.name, "EAS");
    assert_eq!(envelope.message["nonce"], serde_json::json!("7"));

    let verifier = EnvelopeVerifier::new(
        ProtocolVersion::Version2,
        crate::registry::MessageKind::DelegatedAttestation,
        delegated_domain,
    );
    verifier.verify_strict(&key.address(), &envelope).unwrap();
}

#[tokio::test]
async fn envelope_json_roundtrip_still_verifies() {
    let key = LocalSigningKey::from_hex(TEST_KEY).unwrap();
    let signer = EnvelopeSigner::new(ProtocolVersion::Version2, domain(ProtocolVersion::Version2, "1.2.0"));

    let signed = signer
        .sign_offchain_attestation(attestation_item(Some(fixed_salt())), &key)
        .await
        .unwrap();

    let json = serde_json::to_string(&signed).unwrap();
    assert!(json.contains("\"primaryType\""));
    let parsed: SignedOffchainAttestation = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.uid, signed.uid);

    let verifier = EnvelopeVerifier::new(
        ProtocolVersion::Version2,
        crate::registry::MessageKind::Attestation,
        domain(ProtocolVersion::Version2, "1.2.0"),
    );
    assert!(verifier.verify(&key.address(), &parsed.envelope).unwrap());
}

struct RejectingCapability;

#[async_trait]
impl SigningCapability for RejectingCapability {
    async fn sign_digest(&self, _digest: &Bytes32) -> Result<Eip712Signature, CapabilityError> {
        Err(CapabilityError::Rejected("user declined".to_string()))
    }

    fn address(&self) -> Address {
        Address::ZERO
    }
}

#[tokio::test]
async fn capability_rejection_propagates_without_retry() {
    let signer = EnvelopeSigner::new(ProtocolVersion::Version2, domain(ProtocolVersion::Version2, "1.2.0"));
    let err = signer
        .sign_offchain_attestation(attestation_item(None), &RejectingCapability)
        .await
        .unwrap_err();
    assert!(matches!(err, SignError::Capability(CapabilityError::Rejected(_))));
}
