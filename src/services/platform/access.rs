// Caller authentication for the settings and dashboard endpoints
// The platform signs a user token per request; company admin rights come from its member API

use async_trait::async_trait;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::client::{PlatformClient, PlatformError};
use super::identity::default_company_member_id;

pub const USER_TOKEN_HEADER: &str = "x-whop-user-token";

const USER_TOKEN_ISSUER: &str = "urn:whopcom:exp-proxy";

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Missing user token")]
    MissingToken,

    #[error("Invalid user token: {0}")]
    InvalidToken(String),

    #[error("Access lookup failed: {0}")]
    Lookup(String),
}

impl From<jsonwebtoken::errors::Error> for AccessError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AccessError::InvalidToken(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Admin,
    Customer,
    NoAccess,
}

impl AccessLevel {
    pub fn from_string(s: &str) -> Self {
        match s {
            "admin" => AccessLevel::Admin,
            "customer" => AccessLevel::Customer,
            _ => AccessLevel::NoAccess,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTokenClaims {
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
}

#[async_trait]
pub trait AccessChecker: Send + Sync {
    /// Verify the per-request user token and return the user id
    fn verify_user_token(&self, headers: &HeaderMap) -> Result<String, AccessError>;

    async fn access_level(&self, user_id: &str, company_id: &str)
        -> Result<AccessLevel, AccessError>;
}

/// Verifies platform-issued user tokens
#[derive(Clone)]
pub struct UserTokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl std::fmt::Debug for UserTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserTokenVerifier")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl UserTokenVerifier {
    pub fn new(key: DecodingKey, algorithm: Algorithm, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[USER_TOKEN_ISSUER]);
        match audience {
            Some(aud) if !aud.is_empty() => validation.set_audience(&[aud]),
            _ => validation.validate_aud = false,
        }
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            key: Some(key),
            validation,
        }
    }

    /// ES256 verifier from the platform's PEM public key
    pub fn from_es256_pem(pem: &str, app_id: &str) -> Result<Self, AccessError> {
        let key = DecodingKey::from_ec_pem(pem.as_bytes())?;
        Ok(Self::new(key, Algorithm::ES256, Some(app_id)))
    }

    /// Verifier that rejects every token; used when no public key is configured
    pub fn disabled() -> Self {
        Self {
            key: None,
            validation: Validation::new(Algorithm::ES256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<UserTokenClaims, AccessError> {
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| AccessError::InvalidToken("no verification key configured".into()))?;

        let data = decode::<UserTokenClaims>(token, key, &self.validation)?;
        Ok(data.claims)
    }

    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<UserTokenClaims, AccessError> {
        let token = headers
            .get(USER_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|t| !t.is_empty())
            .ok_or(AccessError::MissingToken)?;

        self.verify(token)
    }
}

/// Access checker that asks the platform for the caller's company membership
#[derive(Clone)]
pub struct PlatformAccessChecker {
    client: PlatformClient,
    tokens: UserTokenVerifier,
}

impl PlatformAccessChecker {
    pub fn new(client: PlatformClient, tokens: UserTokenVerifier) -> Self {
        Self { client, tokens }
    }
}

#[async_trait]
impl AccessChecker for PlatformAccessChecker {
    fn verify_user_token(&self, headers: &HeaderMap) -> Result<String, AccessError> {
        self.tokens.verify_headers(headers).map(|claims| claims.sub)
    }

    async fn access_level(
        &self,
        user_id: &str,
        company_id: &str,
    ) -> Result<AccessLevel, AccessError> {
        let member_id = default_company_member_id(user_id, company_id);

        match self.client.get_company_member(company_id, &member_id).await {
            Ok(response) => Ok(response
                .member
                .and_then(|m| m.access_level)
                .map(|level| AccessLevel::from_string(&level))
                .unwrap_or(AccessLevel::NoAccess)),
            Err(PlatformError::NotFound(_)) => {
                debug!("User {} is not a member of {}", user_id, company_id);
                Ok(AccessLevel::NoAccess)
            },
            Err(e) => {
                warn!("Failed to check company access: {}", e);
                Err(AccessError::Lookup(e.to_string()))
            },
        }
    }
}
