// HTTP handlers

pub mod dashboard;
pub mod health;
pub mod settings;
pub mod webhooks;

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/webhooks", post(webhooks::receive_webhook))
        .route(
            "/settings",
            get(settings::get_settings).post(settings::update_settings),
        )
        .route("/dashboard/{company_id}/summary", get(dashboard::get_summary))
}
