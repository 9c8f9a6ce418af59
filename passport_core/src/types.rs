// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use std::fmt;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised while parsing protocol-level values
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid account address: {0}")]
    InvalidAddress(String),

    #[error("Invalid 32-byte hash: {0}")]
    InvalidHash(String),

    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("Unknown data category: {0}")]
    UnknownCategory(String),
}

/// Numeric identifier of a passported resource (battery, material batch, ...)
pub type ResourceId = u64;

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// A 20-byte on-chain account address.
///
/// Parsed from `0x`-prefixed hex in any casing; stored and compared as raw
/// bytes, so equality is inherently case-insensitive. Displays lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let body = strip_hex_prefix(s.trim());
        let bytes = hex::decode(body).map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
        let raw: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// A 32-byte protocol hash (DID hash, content commitment).
///
/// The all-zero value encodes "no commitment" on the authority side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash32([u8; 32]);

impl Hash32 {
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let body = strip_hex_prefix(s.trim());
        let bytes = hex::decode(body).map_err(|_| ParseError::InvalidHash(s.to_string()))?;
        let raw: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ParseError::InvalidHash(s.to_string()))?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Hash32 {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Organization identifier (tenant boundary).
///
/// Normalized to lowercase on construction so comparisons are
/// case-insensitive. The empty value means "no organization".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrgId(String);

impl OrgId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for OrgId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// Deserialization funnels through `new` so backend casing never leaks
// into comparisons
impl<'de> Deserialize<'de> for OrgId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

/// A role a DID may hold and a requester may exercise
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Raw material / component supplier
    Supplier,
    /// End-of-life recycler
    Recycler,
    /// Product manufacturer
    Manufacturer,
    /// Government / regulatory authority
    Government,
    /// Any other role name carried by a DID
    Other(String),
}

impl Role {
    /// Parse a role name, case-insensitively
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "supplier" => Role::Supplier,
            "recycler" => Role::Recycler,
            "manufacturer" => Role::Manufacturer,
            "government" => Role::Government,
            other => Role::Other(other.to_string()),
        }
    }

    /// Case-insensitive match against a role name from a DID document
    pub fn matches_name(&self, name: &str) -> bool {
        self.to_string().eq_ignore_ascii_case(name.trim())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Supplier => write!(f, "supplier"),
            Role::Recycler => write!(f, "recycler"),
            Role::Manufacturer => write!(f, "manufacturer"),
            Role::Government => write!(f, "government"),
            Role::Other(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// Protected data category of a passported resource.
///
/// The category selects both the authority query method and the EIP-712
/// message schema used for the challenge signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Sustainability,
    Technical,
    MaterialComposition,
    SupplyChain,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Sustainability,
        Category::Technical,
        Category::MaterialComposition,
        Category::SupplyChain,
    ];

    /// Path segment used by the authority and off-chain index endpoints
    pub fn path_segment(&self) -> &'static str {
        match self {
            Category::Sustainability => "sustainability",
            Category::Technical => "technical",
            Category::MaterialComposition => "material-composition",
            Category::SupplyChain => "supply-chain",
        }
    }

    /// EIP-712 primary type for this category's query challenge
    pub fn primary_type(&self) -> &'static str {
        match self {
            Category::Sustainability => "QuerySustainability",
            Category::Technical => "QueryTechnical",
            Category::MaterialComposition => "QueryMaterialComposition",
            Category::SupplyChain => "QuerySupplyChain",
        }
    }

    /// Full EIP-712 type definition for this category's query challenge
    pub fn type_definition(&self) -> String {
        format!("{}(uint256 resourceId,address requester)", self.primary_type())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sustainability" => Ok(Category::Sustainability),
            "technical" => Ok(Category::Technical),
            "material-composition" | "material_composition" => Ok(Category::MaterialComposition),
            "supply-chain" | "supply_chain" => Ok(Category::SupplyChain),
            other => Err(ParseError::UnknownCategory(other.to_string())),
        }
    }
}

/// Opaque signature bytes returned by a wallet provider.
///
/// The protocol never verifies these locally; the authority recomputes the
/// structured-data digest and checks the signature on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let body = strip_hex_prefix(s.trim());
        let bytes = hex::decode(body).map_err(|_| ParseError::InvalidSignature(s.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_equality_is_case_insensitive() {
        let a = Address::from_hex("0xAbCdEf0123456789abcdef0123456789ABCDEF01").unwrap();
        let b = Address::from_hex("0xabcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn address_rejects_bad_length() {
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("not-hex").is_err());
    }

    #[test]
    fn hash32_zero_detection() {
        assert!(Hash32::zero().is_zero());
        let h = Hash32::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert!(!h.is_zero());
    }

    #[test]
    fn hash32_comparison_ignores_hex_casing() {
        let lower =
            Hash32::from_hex("0x1f3a0000000000000000000000000000000000000000000000000000000000ee")
                .unwrap();
        let upper =
            Hash32::from_hex("0x1F3A0000000000000000000000000000000000000000000000000000000000EE")
                .unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn role_matching_is_case_insensitive() {
        let role = Role::from_name("SUPPLIER");
        assert_eq!(role, Role::Supplier);
        assert!(role.matches_name("Supplier"));
        assert!(role.matches_name("supplier"));
        assert!(!role.matches_name("recycler"));
    }

    #[test]
    fn category_type_definitions() {
        assert_eq!(
            Category::Sustainability.type_definition(),
            "QuerySustainability(uint256 resourceId,address requester)"
        );
        assert_eq!(Category::SupplyChain.path_segment(), "supply-chain");
        assert_eq!("material_composition".parse::<Category>().unwrap(), Category::MaterialComposition);
    }

    #[test]
    fn org_id_normalizes_case() {
        assert_eq!(OrgId::new("Acme"), OrgId::new("ACME"));
        assert!(OrgId::new("  ").is_empty());
    }
}
