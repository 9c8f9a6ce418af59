// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

//! Decentralized identity resolution: canonical DID naming, registry
//! lookups and credential validation.

pub mod credential;
pub mod did;
pub mod registry;

// Re-export commonly used items
pub use credential::{credential_id, CredentialLedger, HttpCredentialLedger, VerifiableCredential};
pub use did::{canonical_did_uri, did_hash, did_hash_for, DidDocument};
pub use registry::{DidRegistry, HttpDidRegistry};
