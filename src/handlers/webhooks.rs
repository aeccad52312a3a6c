// Webhook intake
// Verify, parse, hand off to the background dispatcher, acknowledge. The response never
// depends on processing; only a bad signature is refused.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::{
    app::AppState,
    models::{PaymentEventData, WebhookAction, WebhookEnvelope},
    utils::ServiceError,
};

fn acknowledge() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// POST /api/webhooks
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = state.webhook_verifier.verify(&headers, &body) {
        warn!("Webhook signature rejected: {}", e);
        return ServiceError::Unauthorized.into_response();
    }

    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Ignoring malformed webhook payload: {}", e);
            return acknowledge();
        },
    };

    match WebhookAction::parse(&envelope.action) {
        WebhookAction::PaymentFailed => {
            let data = parse_payment_data(envelope.data);
            match data.into_failure_event() {
                Ok(event) => {
                    info!(
                        payment_id = %event.payment_id,
                        user_id = ?event.user_id,
                        company_id = ?event.tenant_id,
                        amount = %event.amount,
                        "Payment failed"
                    );
                    let payment_id = event.payment_id.clone();
                    let correlator = state.correlator.clone();
                    state
                        .dispatcher
                        .spawn("payment.failed", Some(&payment_id), async move {
                            correlator.handle_failure(event).await;
                        });
                },
                Err(e) => warn!("Dropping payment.failed event: {}", e),
            }
        },
        WebhookAction::PaymentSucceeded => {
            let event = parse_payment_data(envelope.data).into_success_event();
            info!(
                payment_id = ?event.payment_id,
                user_id = ?event.user_id,
                company_id = ?event.tenant_id,
                "Payment succeeded"
            );
            let payment_id = event.payment_id.clone();
            let correlator = state.correlator.clone();
            state
                .dispatcher
                .spawn("payment.succeeded", payment_id.as_deref(), async move {
                    correlator.handle_success(event).await;
                });
        },
        WebhookAction::Other(action) => {
            debug!(action = %action, "Ignoring webhook action");
        },
    }

    acknowledge()
}

/// Wrongly typed fields degrade to an empty payload, which is rejected or skipped downstream
fn parse_payment_data(data: serde_json::Value) -> PaymentEventData {
    serde_json::from_value(data).unwrap_or_else(|e| {
        warn!("Unexpected payment payload shape: {}", e);
        PaymentEventData::default()
    })
}
