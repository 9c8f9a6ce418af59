// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::authority::ResourceAuthority;
use crate::transport::TransportError;
use crate::types::{Address, OrgId, ResourceId};

/// Account↔organization and resource↔organization lookups
#[async_trait]
pub trait OrganizationScopeResolver: Send + Sync {
    /// Organization an account belongs to, `None` if unaffiliated
    async fn organization_of(&self, account: &Address)
        -> Result<Option<OrgId>, TransportError>;

    /// Organization a resource belongs to
    async fn organization_of_resource(
        &self,
        resource_id: ResourceId,
    ) -> Result<OrgId, TransportError>;
}

/// Scope resolver backed by the resource authority's unsigned reads
pub struct AuthorityScopeResolver {
    authority: Arc<dyn ResourceAuthority>,
}

impl AuthorityScopeResolver {
    pub fn new(authority: Arc<dyn ResourceAuthority>) -> Self {
        Self { authority }
    }
}

#[async_trait]
impl OrganizationScopeResolver for AuthorityScopeResolver {
    async fn organization_of(
        &self,
        account: &Address,
    ) -> Result<Option<OrgId>, TransportError> {
        let org = self.authority.get_account_organization(account).await?;
        debug!("Account {} resolves to organization '{}'", account, org);
        if org.is_empty() {
            Ok(None)
        } else {
            Ok(Some(org))
        }
    }

    async fn organization_of_resource(
        &self,
        resource_id: ResourceId,
    ) -> Result<OrgId, TransportError> {
        let info = self.authority.get_resource(resource_id).await?;
        Ok(info.organization_id)
    }
}
