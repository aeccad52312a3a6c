// Caller authentication for the tenant-facing endpoints
// The platform forwards a signed user token; admin rights are checked per company

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::{debug, warn};

use crate::{
    app::AppState,
    services::platform::{AccessError, AccessLevel},
    utils::ServiceError,
};

/// User id taken from a verified platform user token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl AuthenticatedUser {
    /// Verify the user token carried in `headers`.
    /// Handlers that must validate their input first call this instead of extracting.
    pub fn from_headers(state: &AppState, headers: &HeaderMap) -> Result<Self, ServiceError> {
        match state.access_checker.verify_user_token(headers) {
            Ok(user_id) => Ok(AuthenticatedUser { user_id }),
            Err(AccessError::MissingToken) => {
                debug!("Request without user token");
                Err(ServiceError::Unauthorized)
            },
            Err(e) => {
                warn!("User token rejected: {}", e);
                Err(ServiceError::Unauthorized)
            },
        }
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Self::from_headers(state, &parts.headers)
    }
}

/// Allow only company admins through
pub async fn require_admin(
    state: &AppState,
    user: &AuthenticatedUser,
    company_id: &str,
) -> Result<(), ServiceError> {
    let level = state
        .access_checker
        .access_level(&user.user_id, company_id)
        .await?;

    if level == AccessLevel::Admin {
        Ok(())
    } else {
        warn!(
            user_id = %user.user_id,
            company_id,
            access_level = ?level,
            "Non-admin access attempt"
        );
        Err(ServiceError::Forbidden)
    }
}
