//! Type Schema Registry and Domain Resolver
//!
//! The canonical, ordered field layout of every signable message kind,
//! per protocol version. These tables *are* the wire contract: field
//! order feeds the type-string hash, so a verifier years from now must
//! find the exact historical shape an envelope was signed under.

use crate::eip712::types::{Eip712Domain, Eip712Error, TypeMap, TypedDataField};
use crate::types::{Address, ProtocolVersion};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Domain name used by offchain attestation/revocation envelopes
pub const OFFCHAIN_DOMAIN_NAME: &str = "EAS Attestation";

/// Domain name used by delegated attest/revoke requests
pub const DELEGATED_DOMAIN_NAME: &str = "EAS";

/// The six signable message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Attestation,
    Revocation,
    DelegatedAttestation,
    DelegatedRevocation,
    DelegatedProxyAttestation,
    DelegatedProxyRevocation,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Attestation => "attestation",
            MessageKind::Revocation => "revocation",
            MessageKind::DelegatedAttestation => "delegated_attestation",
            MessageKind::DelegatedRevocation => "delegated_revocation",
            MessageKind::DelegatedProxyAttestation => "delegated_proxy_attestation",
            MessageKind::DelegatedProxyRevocation => "delegated_proxy_revocation",
        };
        write!(f, "{}", name)
    }
}

/// The frozen shape of one (version, kind): primary type name plus the
/// ordered field descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    pub primary_type: &'static str,
    pub fields: Vec<TypedDataField>,
}

impl TypeSchema {
    fn new(primary_type: &'static str, fields: &[(&str, &str)]) -> Self {
        Self {
            primary_type,
            fields: fields
                .iter()
                .map(|(name, ty)| TypedDataField::new(*name, *ty))
                .collect(),
        }
    }

    /// The `types` member of an envelope built from this schema
    pub fn type_map(&self) -> TypeMap {
        let mut map = TypeMap::new();
        map.insert(self.primary_type.to_string(), self.fields.clone());
        map
    }
}

lazy_static! {
    static ref SCHEMAS: HashMap<(ProtocolVersion, MessageKind), TypeSchema> = build_schemas();
}

fn build_schemas() -> HashMap<(ProtocolVersion, MessageKind), TypeSchema> {
    use MessageKind::*;
    use ProtocolVersion::*;

    let mut map = HashMap::new();

    // Offchain attestation envelope. Version1 prepends the uint16
    // version tag; Version2 appends the salt.
    map.insert(
        (Legacy, Attestation),
        TypeSchema::new(
            "Attestation",
            &[
                ("schema", "bytes32"),
                ("recipient", "address"),
                ("time", "uint64"),
                ("expirationTime", "uint64"),
                ("revocable", "bool"),
                ("refUID", "bytes32"),
                ("data", "bytes"),
            ],
        ),
    );
    map.insert(
        (Version1, Attestation),
        TypeSchema::new(
            "Attest",
            &[
                ("version", "uint16"),
                ("schema", "bytes32"),
                ("recipient", "address"),
                ("time", "uint64"),
                ("expirationTime", "uint64"),
                ("revocable", "bool"),
                ("refUID", "bytes32"),
                ("data", "bytes"),
            ],
        ),
    );
    map.insert(
        (Version2, Attestation),
        TypeSchema::new(
            "Attest",
            &[
                ("version", "uint16"),
                ("schema", "bytes32"),
                ("recipient", "address"),
                ("time", "uint64"),
                ("expirationTime", "uint64"),
                ("revocable", "bool"),
                ("refUID", "bytes32"),
                ("data", "bytes"),
                ("salt", "bytes32"),
            ],
        ),
    );

    // Offchain revocation envelope, shaped symmetrically with the
    // attestation envelope.
    map.insert(
        (Legacy, Revocation),
        TypeSchema::new(
            "Revocation",
            &[("schema", "bytes32"), ("uid", "bytes32"), ("time", "uint64")],
        ),
    );
    map.insert(
        (Version1, Revocation),
        TypeSchema::new(
            "Revoke",
            &[
                ("version", "uint16"),
                ("schema", "bytes32"),
                ("uid", "bytes32"),
                ("time", "uint64"),
            ],
        ),
    );
    map.insert(
        (Version2, Revocation),
        TypeSchema::new(
            "Revoke",
            &[
                ("version", "uint16"),
                ("schema", "bytes32"),
                ("uid", "bytes32"),
                ("time", "uint64"),
                ("salt", "bytes32"),
            ],
        ),
    );

    // Delegated attest/revoke: the legacy shape carried only the
    // nonce; later revisions added attester/revoker identity, value
    // and an explicit deadline.
    let delegated_attest_current = &[
        ("attester", "address"),
        ("schema", "bytes32"),
        ("recipient", "address"),
        ("expirationTime", "uint64"),
        ("revocable", "bool"),
        ("refUID", "bytes32"),
        ("data", "bytes"),
        ("value", "uint256"),
        ("nonce", "uint256"),
        ("deadline", "uint64"),
    ];
    map.insert(
        (Legacy, DelegatedAttestation),
        TypeSchema::new(
            "Attest",
            &[
                ("schema", "bytes32"),
                ("recipient", "address"),
                ("expirationTime", "uint64"),
                ("revocable", "bool"),
                ("refUID", "bytes32"),
                ("data", "bytes"),
                ("nonce", "uint256"),
            ],
        ),
    );
    map.insert(
        (Version1, DelegatedAttestation),
        TypeSchema::new("Attest", delegated_attest_current),
    );
    map.insert(
        (Version2, DelegatedAttestation),
        TypeSchema::new("Attest", delegated_attest_current),
    );

    let delegated_revoke_current = &[
        ("revoker", "address"),
        ("schema", "bytes32"),
        ("uid", "bytes32"),
        ("value", "uint256"),
        ("nonce", "uint256"),
        ("deadline", "uint64"),
    ];
    map.insert(
        (Legacy, DelegatedRevocation),
        TypeSchema::new(
            "Revoke",
            &[("schema", "bytes32"), ("uid", "bytes32"), ("nonce", "uint256")],
        ),
    );
    map.insert(
        (Version1, DelegatedRevocation),
        TypeSchema::new("Revoke", delegated_revoke_current),
    );
    map.insert(
        (Version2, DelegatedRevocation),
        TypeSchema::new("Revoke", delegated_revoke_current),
    );

    // Proxy-routed delegation: the proxy tracks replay through the
    // deadline instead of a nonce.
    let proxy_attest_current = &[
        ("attester", "address"),
        ("schema", "bytes32"),
        ("recipient", "address"),
        ("expirationTime", "uint64"),
        ("revocable", "bool"),
        ("refUID", "bytes32"),
        ("data", "bytes"),
        ("value", "uint256"),
        ("deadline", "uint64"),
    ];
    map.insert(
        (Legacy, DelegatedProxyAttestation),
        TypeSchema::new(
            "Attest",
            &[
                ("schema", "bytes32"),
                ("recipient", "address"),
                ("expirationTime", "uint64"),
                ("revocable", "bool"),
                ("refUID", "bytes32"),
                ("data", "bytes"),
                ("deadline", "uint64"),
            ],
        ),
    );
    map.insert(
        (Version1, DelegatedProxyAttestation),
        TypeSchema::new("Attest", proxy_attest_current),
    );
    map.insert(
        (Version2, DelegatedProxyAttestation),
        TypeSchema::new("Attest", proxy_attest_current),
    );

    let proxy_revoke_current = &[
        ("revoker", "address"),
        ("schema", "bytes32"),
        ("uid", "bytes32"),
        ("value", "uint256"),
        ("deadline", "uint64"),
    ];
    map.insert(
        (Legacy, DelegatedProxyRevocation),
        TypeSchema::new(
            "Revoke",
            &[("schema", "bytes32"), ("uid", "bytes32"), ("deadline", "uint64")],
        ),
    );
    map.insert(
        (Version1, DelegatedProxyRevocation),
        TypeSchema::new("Revoke", proxy_revoke_current),
    );
    map.insert(
        (Version2, DelegatedProxyRevocation),
        TypeSchema::new("Revoke", proxy_revoke_current),
    );

    map
}

/// Look up the frozen schema for a (version, kind)
pub fn schema_for(
    version: ProtocolVersion,
    kind: MessageKind,
) -> Result<&'static TypeSchema, Eip712Error> {
    SCHEMAS
        .get(&(version, kind))
        .ok_or_else(|| Eip712Error::UnknownType(format!("{}/{}", version, kind)))
}

/// Builds the canonical signing domain for one deployment.
///
/// Construction never fails; two domains are interchangeable only if
/// every field matches exactly.
#[derive(Debug, Clone)]
pub struct DomainResolver {
    version: ProtocolVersion,
}

impl DomainResolver {
    pub fn new(version: ProtocolVersion) -> Self {
        Self { version }
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    /// Domain for an explicit contract name (proxy deployments carry
    /// their own name)
    pub fn resolve(
        &self,
        name: &str,
        contract_version: &str,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Eip712Domain {
        Eip712Domain::new(name, contract_version, chain_id, verifying_contract)
    }

    /// Domain for offchain attestation/revocation envelopes
    pub fn offchain(
        &self,
        contract_version: &str,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Eip712Domain {
        self.resolve(OFFCHAIN_DOMAIN_NAME, contract_version, chain_id, verifying_contract)
    }

    /// Domain for delegated attest/revoke requests
    pub fn delegated(
        &self,
        contract_version: &str,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Eip712Domain {
        self.resolve(DELEGATED_DOMAIN_NAME, contract_version, chain_id, verifying_contract)
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;
    use crate::eip712::encoder::encode_type;

    fn type_string(version: ProtocolVersion, kind: MessageKind) -> String {
        let schema = schema_for(version, kind).unwrap();
        encode_type(schema.primary_type, &schema.type_map()).unwrap()
    }

    #[test]
    fn offchain_attestation_type_strings() {
        assert_eq!(
            type_string(ProtocolVersion::Legacy, MessageKind::Attestation),
            "Attestation(bytes32 schema,address recipient,uint64 time,uint64 expirationTime,\
             bool revocable,bytes32 refUID,bytes data)"
        );
        assert_eq!(
            type_string(ProtocolVersion::Version2, MessageKind::Attestation),
            "Attest(uint16 version,bytes32 schema,address recipient,uint64 time,\
             uint64 expirationTime,bool revocable,bytes32 refUID,bytes data,bytes32 salt)"
        );
    }

    #[test]
    fn delegated_type_strings() {
        assert_eq!(
            type_string(ProtocolVersion::Legacy, MessageKind::DelegatedRevocation),
            "Revoke(bytes32 schema,bytes32 uid,uint256 nonce)"
        );
        assert_eq!(
            type_string(ProtocolVersion::Version1, MessageKind::DelegatedRevocation),
            "Revoke(address revoker,bytes32 schema,bytes32 uid,uint256 value,uint256 nonce,\
             uint64 deadline)"
        );
        assert_eq!(
            type_string(ProtocolVersion::Version1, MessageKind::DelegatedProxyRevocation),
            "Revoke(address revoker,bytes32 schema,bytes32 uid,uint256 value,uint64 deadline)"
        );
    }

    #[test]
    fn every_version_kind_pair_is_defined() {
        for version in [
            ProtocolVersion::Legacy,
            ProtocolVersion::Version1,
            ProtocolVersion::Version2,
        ] {
            for kind in [
                MessageKind::Attestation,
                MessageKind::Revocation,
                MessageKind::DelegatedAttestation,
                MessageKind::DelegatedRevocation,
                MessageKind::DelegatedProxyAttestation,
                MessageKind::DelegatedProxyRevocation,
            ] {
                let schema = schema_for(version, kind).unwrap();
                assert!(!schema.fields.is_empty());
            }
        }
    }

    #[test]
    fn salt_only_from_version2() {
        for kind in [MessageKind::Attestation, MessageKind::Revocation] {
            for version in [ProtocolVersion::Legacy, ProtocolVersion::Version1] {
                let schema = schema_for(version, kind).unwrap();
                assert!(schema.fields.iter().all(|f| f.name != "salt"));
            }
            let schema = schema_for(ProtocolVersion::Version2, kind).unwrap();
            assert_eq!(schema.fields.last().unwrap().name, "salt");
        }
    }

    #[test]
    fn domain_resolver_builds_exact_domains() {
        let resolver = DomainResolver::new(ProtocolVersion::Version2);
        let contract: Address = "0xA1207F3BBa224E2c9c3c6D5aF63D0eb1582Ce587".parse().unwrap();
        let domain = resolver.offchain("1.2.0", 1, contract);
        assert_eq!(domain.name, OFFCHAIN_DOMAIN_NAME);
        assert_eq!(domain.version, "1.2.0");
        assert_eq!(domain.chain_id, 1);
        assert_eq!(domain.verifying_contract, contract);

        let delegated = resolver.delegated("1.2.0", 1, contract);
        assert_eq!(delegated.name, DELEGATED_DOMAIN_NAME);
    }
}
