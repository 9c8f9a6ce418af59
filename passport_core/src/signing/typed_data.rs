// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use serde_json::json;
use sha3::{Digest, Keccak256};

use crate::config::SigningDomainConfig;
use crate::types::{Address, Category, ResourceId};

/// Keccak-256 digest, the hash the authority contract recomputes
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

fn u256_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// EIP-712 signing domain bound to the authority contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedDataDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl TypedDataDomain {
    /// `hashStruct(EIP712Domain)` per the EIP-712 encoding rules
    pub fn separator(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(&keccak256(EIP712_DOMAIN_TYPE.as_bytes()));
        encoded.extend_from_slice(&keccak256(self.name.as_bytes()));
        encoded.extend_from_slice(&keccak256(self.version.as_bytes()));
        encoded.extend_from_slice(&u256_word(self.chain_id));
        encoded.extend_from_slice(&address_word(&self.verifying_contract));
        keccak256(&encoded)
    }
}

impl From<&SigningDomainConfig> for TypedDataDomain {
    fn from(config: &SigningDomainConfig) -> Self {
        Self {
            name: config.domain_name.clone(),
            version: config.domain_version.clone(),
            chain_id: config.chain_id,
            verifying_contract: config.verifying_contract,
        }
    }
}

/// The challenge message bound into a query signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryMessage {
    pub resource_id: ResourceId,
    pub requester: Address,
}

/// A complete structured-data payload ready for signing.
///
/// The authority recomputes this digest byte-for-byte, so the payload is
/// always signed as structured data and never as a raw message digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedData {
    pub domain: TypedDataDomain,
    pub category: Category,
    pub message: QueryMessage,
}

impl TypedData {
    /// `hashStruct(message)` for the category-specific query type
    pub fn struct_hash(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(3 * 32);
        encoded.extend_from_slice(&keccak256(self.category.type_definition().as_bytes()));
        encoded.extend_from_slice(&u256_word(self.message.resource_id));
        encoded.extend_from_slice(&address_word(&self.message.requester));
        keccak256(&encoded)
    }

    /// Final digest: `keccak256("\x19\x01" ‖ domainSeparator ‖ hashStruct(message))`
    pub fn signing_digest(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(2 + 2 * 32);
        encoded.extend_from_slice(&[0x19, 0x01]);
        encoded.extend_from_slice(&self.domain.separator());
        encoded.extend_from_slice(&self.struct_hash());
        keccak256(&encoded)
    }

    /// JSON form accepted by `eth_signTypedData_v4`
    pub fn to_eip712_json(&self) -> serde_json::Value {
        json!({
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" },
                    { "name": "verifyingContract", "type": "address" },
                ],
                self.category.primary_type(): [
                    { "name": "resourceId", "type": "uint256" },
                    { "name": "requester", "type": "address" },
                ],
            },
            "primaryType": self.category.primary_type(),
            "domain": {
                "name": self.domain.name,
                "version": self.domain.version,
                "chainId": self.domain.chain_id,
                "verifyingContract": self.domain.verifying_contract.to_string(),
            },
            "message": {
                "resourceId": self.message.resource_id,
                "requester": self.message.requester.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> TypedDataDomain {
        TypedDataDomain {
            name: "PassportAuthority".to_string(),
            version: "1".to_string(),
            chain_id: 31337,
            verifying_contract: Address::from_hex("0x5FbDB2315678afecb367f032d93F642f64180aa3")
                .unwrap(),
        }
    }

    fn typed_data(category: Category, resource_id: ResourceId) -> TypedData {
        TypedData {
            domain: domain(),
            category,
            message: QueryMessage {
                resource_id,
                requester: Address::from_hex("0xabcdef0123456789abcdef0123456789abcdef01")
                    .unwrap(),
            },
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let a = typed_data(Category::Sustainability, 7);
        let b = typed_data(Category::Sustainability, 7);
        assert_eq!(a.signing_digest(), b.signing_digest());
    }

    #[test]
    fn digest_binds_the_category() {
        let a = typed_data(Category::Sustainability, 7);
        let b = typed_data(Category::Technical, 7);
        assert_ne!(a.struct_hash(), b.struct_hash());
        assert_ne!(a.signing_digest(), b.signing_digest());
    }

    #[test]
    fn digest_binds_the_resource() {
        let a = typed_data(Category::Sustainability, 7);
        let b = typed_data(Category::Sustainability, 8);
        assert_ne!(a.signing_digest(), b.signing_digest());
    }

    #[test]
    fn separator_binds_the_chain() {
        let mut other = domain();
        other.chain_id = 1;
        assert_ne!(domain().separator(), other.separator());
    }

    #[test]
    fn struct_hash_is_domain_independent() {
        let a = typed_data(Category::Sustainability, 7);
        let mut b = a.clone();
        b.domain.chain_id = 1;
        assert_eq!(a.struct_hash(), b.struct_hash());
        assert_ne!(a.signing_digest(), b.signing_digest());
    }

    #[test]
    fn eip712_json_carries_primary_type_and_message() {
        let data = typed_data(Category::SupplyChain, 42);
        let value = data.to_eip712_json();
        assert_eq!(value["primaryType"], "QuerySupplyChain");
        assert_eq!(value["message"]["resourceId"], 42);
        assert!(value["types"]["QuerySupplyChain"].is_array());
        assert_eq!(
            value["message"]["requester"],
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
    }
}
