// Identity resolution: membership → owning tenant, member → email/display name

use async_trait::async_trait;
use thiserror::Error;

use super::client::{PlatformClient, PlatformError};

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Platform lookup failed: {0}")]
    Platform(#[from] PlatformError),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDetails {
    pub tenant_id: Option<String>,
    pub company_member_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberProfile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
}

impl MemberProfile {
    /// Name used in the greeting: full name, then username, then "there"
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.username.as_deref().filter(|u| !u.trim().is_empty()))
            .unwrap_or("there")
            .to_string()
    }
}

/// Member ids are `{user}_{company}` unless the membership supplies one
pub fn default_company_member_id(user_id: &str, tenant_id: &str) -> String {
    format!("{}_{}", user_id, tenant_id)
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn lookup_membership(&self, membership_id: &str)
        -> Result<MembershipDetails, IdentityError>;

    async fn lookup_member(
        &self,
        tenant_id: &str,
        company_member_id: &str,
    ) -> Result<MemberProfile, IdentityError>;
}

/// Resolver backed by the platform REST API
#[derive(Clone)]
pub struct PlatformIdentityResolver {
    client: PlatformClient,
}

impl PlatformIdentityResolver {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityResolver for PlatformIdentityResolver {
    async fn lookup_membership(
        &self,
        membership_id: &str,
    ) -> Result<MembershipDetails, IdentityError> {
        let membership = self.client.get_membership(membership_id).await?;

        Ok(MembershipDetails {
            tenant_id: membership.tenant_id(),
            company_member_id: membership.company_member_id.filter(|id| !id.is_empty()),
        })
    }

    async fn lookup_member(
        &self,
        tenant_id: &str,
        company_member_id: &str,
    ) -> Result<MemberProfile, IdentityError> {
        let response = self
            .client
            .get_company_member(tenant_id, company_member_id)
            .await?;

        let user = response
            .member
            .and_then(|m| m.user)
            .ok_or_else(|| IdentityError::NotFound(company_member_id.to_string()))?;

        Ok(MemberProfile {
            email: user.email.filter(|e| !e.trim().is_empty()),
            name: user.name,
            username: user.username,
        })
    }
}
