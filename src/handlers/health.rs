// Health check

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let (ledger_healthy, postgres_health) = match state.ledger.health_check().await {
        Ok(()) => (
            true,
            json!({
                "status": "healthy",
                "max_connections": state.config.database.max_connections,
                "error": null
            }),
        ),
        Err(e) => (
            false,
            json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            }),
        ),
    };

    let response = json!({
        "status": if ledger_healthy { "healthy" } else { "degraded" },
        "service": "payment-recovery",
        "environment": state.config.server.environment.to_string(),
        "timestamp": timestamp,
        "components": {
            "postgresql": postgres_health,
            "background_tasks": {
                "in_flight": state.dispatcher.in_flight()
            }
        }
    });

    if ledger_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
