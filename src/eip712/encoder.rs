//! EIP-712 Type Encoding
//!
//! Canonical type-string construction and per-field value encoding.
//! The type string and the field order are part of the signature
//! contract: a one-character deviation produces a different digest.

use super::types::{Eip712Error, TypeMap};
use crate::types::Address;
use crate::utils::crypto::keccak256;
use serde_json::Value;
use std::collections::BTreeSet;

/// Encode the canonical type string for a struct type.
///
/// The primary type's rendering comes first, followed by every
/// referenced struct type in lexicographic order of type name, each as
/// `TypeName(type1 name1,type2 name2,...)`.
pub fn encode_type(type_name: &str, types: &TypeMap) -> Result<String, Eip712Error> {
    let mut result = format_type(type_name, types)?;

    // BTreeSet iteration gives the lexicographic dependency order.
    let mut deps = BTreeSet::new();
    collect_dependencies(type_name, types, &mut deps)?;
    deps.remove(type_name);
    for dep in deps {
        result.push_str(&format_type(&dep, types)?);
    }

    Ok(result)
}

/// Render one struct as `TypeName(type1 name1,...)`
fn format_type(type_name: &str, types: &TypeMap) -> Result<String, Eip712Error> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::UnknownType(type_name.to_string()))?;
    let rendered: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();
    Ok(format!("{}({})", type_name, rendered.join(",")))
}

/// Walk the struct graph collecting every referenced struct type
fn collect_dependencies(
    type_name: &str,
    types: &TypeMap,
    seen: &mut BTreeSet<String>,
) -> Result<(), Eip712Error> {
    if !seen.insert(type_name.to_string()) {
        return Ok(());
    }
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::UnknownType(type_name.to_string()))?;
    for field in fields {
        let base = base_type(&field.type_name);
        if types.contains_key(base) {
            collect_dependencies(base, types, seen)?;
        } else if looks_like_struct(base) && !is_atomic_type(base) && !is_dynamic_type(base) {
            return Err(Eip712Error::UnknownType(base.to_string()));
        }
    }
    Ok(())
}

/// Strip array suffixes: "Item[]" -> "Item", "uint64[4]" -> "uint64"
pub fn base_type(type_name: &str) -> &str {
    match type_name.find('[') {
        Some(pos) => &type_name[..pos],
        None => type_name,
    }
}

/// typeHash = keccak256(encodeType(primaryType))
pub fn type_hash(type_name: &str, types: &TypeMap) -> Result<[u8; 32], Eip712Error> {
    Ok(keccak256(encode_type(type_name, types)?.as_bytes()))
}

/// Encode one value to its 32-byte-aligned representation.
///
/// Struct references and array elements of dynamic/struct type are
/// hashed by the caller; atomics produce exactly one word.
pub fn encode_value(type_name: &str, value: &Value, types: &TypeMap) -> Result<Vec<u8>, Eip712Error> {
    if type_name.contains('[') {
        return encode_array(type_name, value, types);
    }

    match type_name {
        "bytes" => return Ok(parse_hex_value(type_name, value)?),
        "string" => {
            let s = expect_str(type_name, value)?;
            return Ok(s.as_bytes().to_vec());
        }
        _ => {}
    }

    if types.contains_key(type_name) {
        return encode_struct(type_name, value, types);
    }

    encode_atomic(type_name, value)
}

/// Encode a struct: typeHash followed by each field in declared order.
/// Dynamic and struct-typed fields contribute their hash instead of
/// their raw encoding.
pub fn encode_struct(type_name: &str, value: &Value, types: &TypeMap) -> Result<Vec<u8>, Eip712Error> {
    let obj = value.as_object().ok_or_else(|| invalid(type_name, value))?;
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::UnknownType(type_name.to_string()))?;

    let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
    encoded.extend_from_slice(&type_hash(type_name, types)?);

    for field in fields {
        let field_value = obj
            .get(&field.name)
            .ok_or_else(|| Eip712Error::MissingField(format!("{}.{}", type_name, field.name)))?;
        let raw = encode_value(&field.type_name, field_value, types)?;
        if needs_hashing(&field.type_name, types) {
            encoded.extend_from_slice(&keccak256(&raw));
        } else {
            encoded.extend_from_slice(&raw);
        }
    }

    Ok(encoded)
}

/// Whether a field's encoding is folded through keccak before being
/// placed in its parent's word slot
fn needs_hashing(type_name: &str, types: &TypeMap) -> bool {
    type_name.contains('[')
        || type_name == "bytes"
        || type_name == "string"
        || types.contains_key(base_type(type_name))
}

fn encode_array(type_name: &str, value: &Value, types: &TypeMap) -> Result<Vec<u8>, Eip712Error> {
    let items = value.as_array().ok_or_else(|| invalid(type_name, value))?;
    let element_type = base_type(type_name);

    let mut encoded = Vec::with_capacity(32 * items.len());
    for item in items {
        let raw = encode_value(element_type, item, types)?;
        if needs_hashing(element_type, types) {
            encoded.extend_from_slice(&keccak256(&raw));
        } else {
            encoded.extend_from_slice(&raw);
        }
    }
    Ok(encoded)
}

/// Encode a fixed-size value into one left- or right-padded word
fn encode_atomic(type_name: &str, value: &Value) -> Result<Vec<u8>, Eip712Error> {
    let mut word = [0u8; 32];

    if type_name == "address" {
        let s = expect_str(type_name, value)?;
        let addr: Address = s
            .parse()
            .map_err(|e| Eip712Error::InvalidAddress(format!("{}: {}", s, e)))?;
        word[12..].copy_from_slice(&addr.0);
        return Ok(word.to_vec());
    }

    if type_name == "bool" {
        let b = value.as_bool().ok_or_else(|| invalid(type_name, value))?;
        word[31] = b as u8;
        return Ok(word.to_vec());
    }

    if let Some(bits) = uint_width(type_name) {
        let bytes = parse_uint(type_name, value)?;
        if bytes.len() * 8 > bits as usize {
            return Err(invalid(type_name, value));
        }
        word[32 - bytes.len()..].copy_from_slice(&bytes);
        return Ok(word.to_vec());
    }

    if let Some(size) = fixed_bytes_width(type_name) {
        let bytes = parse_hex_value(type_name, value)?;
        if bytes.len() > size {
            return Err(invalid(type_name, value));
        }
        // Fixed-size bytes are right-padded
        word[..bytes.len()].copy_from_slice(&bytes);
        return Ok(word.to_vec());
    }

    if looks_like_struct(type_name) {
        return Err(Eip712Error::UnknownType(type_name.to_string()));
    }
    Err(Eip712Error::UnknownFieldType(type_name.to_string()))
}

/// `uintN` width in bits, if the name is a valid unsigned integer type
fn uint_width(type_name: &str) -> Option<u32> {
    let bits: u32 = type_name.strip_prefix("uint")?.parse().ok()?;
    (bits > 0 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

/// `bytesN` width, if the name is a valid fixed-size bytes type
fn fixed_bytes_width(type_name: &str) -> Option<usize> {
    if type_name == "bytes" {
        return None;
    }
    let size: usize = type_name.strip_prefix("bytes")?.parse().ok()?;
    (size > 0 && size <= 32).then_some(size)
}

pub fn is_atomic_type(type_name: &str) -> bool {
    type_name == "address"
        || type_name == "bool"
        || uint_width(type_name).is_some()
        || fixed_bytes_width(type_name).is_some()
}

pub fn is_dynamic_type(type_name: &str) -> bool {
    type_name == "bytes" || type_name == "string"
}

/// Unrecognized identifiers starting with an uppercase letter are
/// treated as (absent) struct references rather than primitives
fn looks_like_struct(type_name: &str) -> bool {
    type_name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Parse an unsigned integer value: JSON number, decimal string, or
/// 0x-prefixed hex string. Decimal strings are capped at u128, which
/// covers every field this protocol family signs.
fn parse_uint(type_name: &str, value: &Value) -> Result<Vec<u8>, Eip712Error> {
    let bytes = match value {
        Value::Number(n) => {
            let u = n.as_u64().ok_or_else(|| invalid(type_name, value))?;
            trim_leading_zeros(&u.to_be_bytes())
        }
        Value::String(s) => {
            if let Some(stripped) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                let padded = if stripped.len() % 2 == 1 {
                    format!("0{}", stripped)
                } else {
                    stripped.to_string()
                };
                hex::decode(&padded).map_err(|_| invalid(type_name, value))?
            } else {
                let n: u128 = s.parse().map_err(|_| invalid(type_name, value))?;
                trim_leading_zeros(&n.to_be_bytes())
            }
        }
        _ => return Err(invalid(type_name, value)),
    };
    if bytes.len() > 32 {
        return Err(invalid(type_name, value));
    }
    Ok(bytes)
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// Parse a hex string value (with or without 0x prefix) into bytes
fn parse_hex_value(type_name: &str, value: &Value) -> Result<Vec<u8>, Eip712Error> {
    let s = expect_str(type_name, value)?;
    let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    hex::decode(stripped).map_err(|_| invalid(type_name, value))
}

fn expect_str<'a>(type_name: &str, value: &'a Value) -> Result<&'a str, Eip712Error> {
    value.as_str().ok_or_else(|| invalid(type_name, value))
}

fn invalid(type_name: &str, value: &Value) -> Eip712Error {
    Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    }
}
