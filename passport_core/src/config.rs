// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Address, Role};

/// Per-role trust-level requirements and the cross-organization override.
///
/// Injected into the authorization engine; the engine owns no trust
/// literals of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustPolicy {
    /// Required trust level per role name (lowercase)
    pub required_trust: HashMap<String, u8>,

    /// Role allowed to query across organization boundaries
    pub override_role: Role,

    /// Trust level the override role must hold for the override to apply
    pub max_trust_level: u8,
}

impl TrustPolicy {
    /// Required trust level for a role; roles absent from the table
    /// require the maximum level
    pub fn required_trust_for(&self, role: &Role) -> u8 {
        self.required_trust
            .get(&role.to_string())
            .copied()
            .unwrap_or(self.max_trust_level)
    }

    /// Whether a requester may cross organization boundaries
    pub fn grants_override(&self, role: &Role, trust_level: u8) -> bool {
        *role == self.override_role && trust_level >= self.max_trust_level
    }
}

impl Default for TrustPolicy {
    fn default() -> Self {
        let mut required_trust = HashMap::new();
        required_trust.insert("supplier".to_string(), 3);
        required_trust.insert("recycler".to_string(), 3);
        required_trust.insert("manufacturer".to_string(), 4);
        required_trust.insert("government".to_string(), 5);

        Self {
            required_trust,
            override_role: Role::Government,
            max_trust_level: 5,
        }
    }
}

/// EIP-712 signing domain parameters for the resource authority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningDomainConfig {
    /// Domain name presented to the wallet
    pub domain_name: String,

    /// Domain version (the authority pins "1")
    pub domain_version: String,

    /// Chain id of the live network
    pub chain_id: u64,

    /// Address of the verifying authority contract
    pub verifying_contract: Address,
}

/// Endpoints of the external collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// DID registry gateway base URL
    pub registry_url: String,

    /// Credential ledger base URL
    pub credential_url: String,

    /// Resource authority base URL
    pub authority_url: String,

    /// Off-chain locator index base URL
    pub offchain_index_url: String,

    /// Content-addressed store base URL
    pub content_store_url: String,

    /// Wallet provider JSON-RPC endpoint
    pub wallet_rpc_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            registry_url: "http://localhost:8545/registry".to_string(),
            credential_url: "http://localhost:8545/credentials".to_string(),
            authority_url: "http://localhost:8545/authority".to_string(),
            offchain_index_url: "http://localhost:3001".to_string(),
            content_store_url: "http://localhost:8080/ipfs".to_string(),
            wallet_rpc_url: "http://localhost:8545".to_string(),
        }
    }
}

/// Top-level protocol configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassportConfig {
    /// External endpoint locations
    pub endpoints: EndpointConfig,

    /// EIP-712 signing domain
    pub signing: SigningDomainConfig,

    /// Trust-level policy table
    pub trust_policy: TrustPolicy,
}

impl Default for PassportConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig::default(),
            signing: SigningDomainConfig {
                domain_name: "PassportAuthority".to_string(),
                domain_version: "1".to_string(),
                chain_id: 1,
                verifying_contract: Address::zero(),
            },
            trust_policy: TrustPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_trust_table_matches_policy() {
        let policy = TrustPolicy::default();
        assert_eq!(policy.required_trust_for(&Role::Supplier), 3);
        assert_eq!(policy.required_trust_for(&Role::Recycler), 3);
        assert_eq!(policy.required_trust_for(&Role::Manufacturer), 4);
        assert_eq!(policy.required_trust_for(&Role::Government), 5);
        // Unknown roles fall back to the maximum level
        assert_eq!(policy.required_trust_for(&Role::Other("auditor".to_string())), 5);
    }

    #[test]
    fn override_requires_maximum_trust() {
        let policy = TrustPolicy::default();
        assert!(policy.grants_override(&Role::Government, 5));
        assert!(!policy.grants_override(&Role::Government, 4));
        assert!(!policy.grants_override(&Role::Manufacturer, 5));
    }
}
