// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

//! Authorization and integrity-verification protocol for digital material
//! passports.
//!
//! The library decides whether an on-chain account may read a protected
//! data category of a resource, proves the decision with an EIP-712
//! challenge signature, and verifies that the data served off-chain is
//! exactly the data committed on-chain.

pub mod authority;
pub mod authorization;
pub mod config;
pub mod identity;
pub mod integrity;
pub mod offchain;
pub mod organization;
pub mod query;
pub mod signing;
pub mod transport;
pub mod types;

// Re-export common types
pub use authority::{HttpResourceAuthority, ResourceAuthority, ResourceInfo};
pub use authorization::{
    AuthError, AuthorizationEngine, AuthorizationRequest, Denial, Grant,
};
pub use config::{EndpointConfig, PassportConfig, SigningDomainConfig, TrustPolicy};
pub use identity::{
    canonical_did_uri, credential_id, did_hash, did_hash_for, CredentialLedger, DidDocument,
    DidRegistry, HttpCredentialLedger, HttpDidRegistry, VerifiableCredential,
};
pub use integrity::{ContentIntegrityVerifier, IntegrityError, VerifiedContent};
pub use offchain::{
    ContentStore, HttpContentStore, HttpOffchainIndex, LocatorRecord, OffchainIndex,
};
pub use organization::{AuthorityScopeResolver, OrganizationScopeResolver};
pub use query::{QueryError, QueryExecutor, VerifiedPayload};
pub use signing::{
    keccak256, ChallengeSigner, LocalWallet, QueryMessage, RpcWalletProvider, SignerError,
    TypedData, TypedDataDomain, WalletProvider,
};
pub use transport::TransportError;
pub use types::{
    Address, Category, Hash32, OrgId, ParseError, ResourceId, Role, Signature,
};

use std::sync::Arc;

/// Create an authorization engine wired to the configured HTTP backends
pub fn create_authorization_engine(
    config: &PassportConfig,
    wallet: Arc<dyn WalletProvider>,
) -> AuthorizationEngine {
    let authority: Arc<dyn ResourceAuthority> =
        Arc::new(HttpResourceAuthority::new(&config.endpoints.authority_url));

    AuthorizationEngine::new(
        Arc::new(HttpDidRegistry::new(&config.endpoints.registry_url)),
        Arc::new(HttpCredentialLedger::new(&config.endpoints.credential_url)),
        Arc::new(AuthorityScopeResolver::new(authority)),
        ChallengeSigner::new(&config.signing, wallet),
        config.trust_policy.clone(),
    )
}

/// Create the full query pipeline wired to the configured HTTP backends
pub fn create_query_executor(
    config: &PassportConfig,
    wallet: Arc<dyn WalletProvider>,
) -> QueryExecutor {
    let authority: Arc<dyn ResourceAuthority> =
        Arc::new(HttpResourceAuthority::new(&config.endpoints.authority_url));

    let engine = AuthorizationEngine::new(
        Arc::new(HttpDidRegistry::new(&config.endpoints.registry_url)),
        Arc::new(HttpCredentialLedger::new(&config.endpoints.credential_url)),
        Arc::new(AuthorityScopeResolver::new(authority.clone())),
        ChallengeSigner::new(&config.signing, wallet),
        config.trust_policy.clone(),
    );

    QueryExecutor::new(
        engine,
        authority,
        Arc::new(HttpOffchainIndex::new(&config.endpoints.offchain_index_url)),
        ContentIntegrityVerifier::new(Arc::new(HttpContentStore::new(
            &config.endpoints.content_store_url,
        ))),
    )
}
