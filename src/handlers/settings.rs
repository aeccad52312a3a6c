// Tenant settings endpoints
// Validation runs before authentication so malformed requests never reach the platform

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::HeaderMap,
    Json,
};
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    app::AppState,
    middleware::{require_admin, AuthenticatedUser},
    models::{
        NewTenantSettings, SettingsQuery, SettingsResponse, UpdateSettingsRequest,
        UPDATE_LINK_PLACEHOLDER,
    },
    utils::{non_blank_field, trim_optional_field, ServiceError},
};

/// GET /api/settings?company_id=...
#[instrument(skip_all)]
pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SettingsQuery>,
) -> Result<Json<SettingsResponse>, ServiceError> {
    let company_id = trim_optional_field(query.company_id.as_deref())
        .ok_or_else(|| ServiceError::ValidationError("company_id is required".to_string()))?;

    let user = AuthenticatedUser::from_headers(&state, &headers)?;
    require_admin(&state, &user, &company_id).await?;

    let settings = state
        .settings_store
        .get(&company_id)
        .await?
        .map(SettingsResponse::from)
        .unwrap_or_else(SettingsResponse::defaults);

    Ok(Json(settings))
}

/// POST /api/settings
#[instrument(skip_all)]
pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> Result<Json<SettingsResponse>, ServiceError> {
    let Json(request) = payload
        .map_err(|e| ServiceError::ValidationError(format!("Invalid request body: {}", e)))?;

    let (Some(company_id), Some(email_enabled), Some(email_subject), Some(email_body)) = (
        trim_optional_field(request.company_id.as_deref()),
        request.email_enabled,
        trim_optional_field(request.email_subject.as_deref()),
        non_blank_field(request.email_body.as_deref()),
    ) else {
        return Err(ServiceError::ValidationError(
            "Missing required fields".to_string(),
        ));
    };

    let user = AuthenticatedUser::from_headers(&state, &headers)?;
    require_admin(&state, &user, &company_id).await?;

    if !email_body.contains(UPDATE_LINK_PLACEHOLDER) {
        return Err(ServiceError::ValidationError(format!(
            "Email body must include {} variable",
            UPDATE_LINK_PLACEHOLDER
        )));
    }

    request.validate()?;

    let stored = state
        .settings_store
        .upsert(NewTenantSettings {
            tenant_id: company_id,
            email_enabled,
            email_subject,
            email_body,
        })
        .await?;

    info!(
        company_id = %stored.tenant_id,
        user_id = %user.user_id,
        email_enabled = stored.email_enabled,
        "Recovery email settings updated"
    );

    Ok(Json(SettingsResponse::from(stored)))
}
