// Recovery dashboard figures for one company

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::{
    app::AppState,
    middleware::{require_admin, AuthenticatedUser},
    models::RecoverySummary,
    utils::ServiceError,
};

/// GET /api/dashboard/{company_id}/summary
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(company_id): Path<String>,
) -> Result<Json<RecoverySummary>, ServiceError> {
    require_admin(&state, &user, &company_id).await?;

    let records = state.ledger.list_for_tenant(&company_id).await?;
    Ok(Json(RecoverySummary::from_records(&records)))
}
