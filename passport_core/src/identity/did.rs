// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use serde::{Deserialize, Serialize};

use crate::signing::typed_data::keccak256;
use crate::types::{Address, Hash32, OrgId};

/// A DID document as served by the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// Canonical DID URI the registry entry was created from
    pub uri: String,
    /// Controller account bound to this identity
    pub public_key: Address,
    /// Ordinal trust grant, observed range 0-5
    pub trust_level: u8,
    /// Set once the external authority has verified the identity
    pub verified: bool,
    /// Service endpoints advertised by the identity
    #[serde(default)]
    pub service_endpoints: Vec<String>,
    /// Role names this identity may exercise
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Canonical DID name for an (organization, account) pair.
///
/// This template is the single source of the requester DID string; casing
/// or formatting drift here silently changes the hash and shows up
/// downstream as a spurious "not registered".
pub fn canonical_did_uri(organization: &OrgId, account: &Address) -> String {
    format!("did:web:{}.com#create-{}", organization, account).to_lowercase()
}

/// Keccak-256 hash of a canonical DID URI string
pub fn did_hash(uri: &str) -> Hash32 {
    Hash32::from_bytes(keccak256(uri.as_bytes()))
}

/// Canonicalize and hash in one step
pub fn did_hash_for(organization: &OrgId, account: &Address) -> Hash32 {
    did_hash(&canonical_did_uri(organization, account))
}
