// Membership platform REST client
// Constructed once at startup from PlatformConfig and shared; no module-level SDK instance

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::app_config::PlatformConfig;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Invalid platform URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Platform API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// `GET /api/v1/memberships/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipResponse {
    pub id: Option<String>,
    pub company_member_id: Option<String>,
    pub plan: Option<CompanyRef>,
    pub product: Option<CompanyRef>,
    pub company: Option<CompanyObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyRef {
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyObject {
    pub id: Option<String>,
}

impl MembershipResponse {
    /// Owning company: plan first, then product, then the embedded company
    pub fn tenant_id(&self) -> Option<String> {
        let present = |id: &Option<String>| id.clone().filter(|id| !id.is_empty());

        self.plan
            .as_ref()
            .and_then(|p| present(&p.company_id))
            .or_else(|| self.product.as_ref().and_then(|p| present(&p.company_id)))
            .or_else(|| self.company.as_ref().and_then(|c| present(&c.id)))
    }
}

/// `GET /api/v1/companies/{company}/members/{member}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyMemberResponse {
    pub member: Option<CompanyMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyMember {
    pub id: Option<String>,
    pub access_level: Option<String>,
    pub user: Option<MemberUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberUser {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
}

#[derive(Clone)]
pub struct PlatformClient {
    client: Arc<Client>,
    base_url: Url,
    api_key: String,
    agent_user_id: Option<String>,
}

impl PlatformClient {
    pub fn new(config: &PlatformConfig) -> Result<Self, PlatformError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| PlatformError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PlatformError::InvalidUrl(config.api_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key: config.api_key.clone(),
            agent_user_id: config.agent_user_id.clone(),
        })
    }

    /// Build `{base}/seg/seg/...` with each segment percent-encoded
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| PlatformError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, PlatformError> {
        let url = self.endpoint(segments)?;

        let mut request = self.client.get(url.clone()).bearer_auth(&self.api_key);
        if let Some(agent) = &self.agent_user_id {
            request = request.header("x-on-behalf-of", agent);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("Platform resource not found: {}", url.path());
            return Err(PlatformError::NotFound(url.path().to_string()));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "Platform API request failed");
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    #[instrument(skip(self))]
    pub async fn get_membership(
        &self,
        membership_id: &str,
    ) -> Result<MembershipResponse, PlatformError> {
        self.get_json(&["api", "v1", "memberships", membership_id])
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_company_member(
        &self,
        company_id: &str,
        company_member_id: &str,
    ) -> Result<CompanyMemberResponse, PlatformError> {
        self.get_json(&["api", "v1", "companies", company_id, "members", company_member_id])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(api_url: &str) -> PlatformConfig {
        PlatformConfig {
            api_url: api_url.to_string(),
            api_key: "key".to_string(),
            app_id: "app_1".to_string(),
            agent_user_id: None,
            webhook_secret: None,
            webhook_tolerance_secs: 300,
            user_token_public_key: None,
            http_timeout_secs: 5,
        }
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = PlatformClient::new(&test_config("https://api.whop.com/")).unwrap();
        let url = client
            .endpoint(&["api", "v1", "companies", "biz 1", "members", "user/1_biz"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.whop.com/api/v1/companies/biz%201/members/user%2F1_biz"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            PlatformClient::new(&test_config("not-a-url")),
            Err(PlatformError::InvalidUrl(_))
        ));
        assert!(matches!(
            PlatformClient::new(&test_config("mailto:ops@example.com")),
            Err(PlatformError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_membership_tenant_precedence() {
        let membership: MembershipResponse = serde_json::from_value(json!({
            "id": "mem_1",
            "plan": { "company_id": null },
            "product": { "company_id": "biz_product" },
            "company": { "id": "biz_company" }
        }))
        .unwrap();
        assert_eq!(membership.tenant_id().as_deref(), Some("biz_product"));

        let only_company: MembershipResponse =
            serde_json::from_value(json!({ "company": { "id": "biz_company" } })).unwrap();
        assert_eq!(only_company.tenant_id().as_deref(), Some("biz_company"));

        let nothing: MembershipResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(nothing.tenant_id(), None);
    }

    #[test]
    fn test_empty_company_ids_fall_through() {
        let membership: MembershipResponse = serde_json::from_value(json!({
            "plan": { "company_id": "" },
            "product": { "company_id": "" },
            "company": { "id": "biz_company" }
        }))
        .unwrap();
        assert_eq!(membership.tenant_id().as_deref(), Some("biz_company"));

        let all_empty: MembershipResponse = serde_json::from_value(json!({
            "plan": { "company_id": "" },
            "company": { "id": "" }
        }))
        .unwrap();
        assert_eq!(all_empty.tenant_id(), None);
    }
}
