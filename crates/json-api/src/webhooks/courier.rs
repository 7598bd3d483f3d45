//! Courier Webhook
//!
//! Delivery status and tracking pushes from the courier, matched to an order
//! by invoice or consignment id.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use grocer_app::domain::{
    courier::models::{CourierNotification, NotificationKind},
    orders::OrdersServiceError,
};

use crate::{extensions::*, state::State};

/// Courier push payload. Amounts and timestamps are accepted but not stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct CourierWebhookPayload {
    #[salvo(schema(value_type = String))]
    pub notification_type: NotificationKind,

    pub consignment_id: Option<u64>,
    pub invoice: Option<String>,

    pub cod_amount: Option<f64>,

    pub status: Option<String>,

    pub delivery_charge: Option<f64>,

    pub tracking_message: Option<String>,
    pub updated_at: Option<String>,
}

impl From<CourierWebhookPayload> for CourierNotification {
    fn from(payload: CourierWebhookPayload) -> Self {
        CourierNotification {
            kind: payload.notification_type,
            consignment_id: payload.consignment_id,
            invoice: payload
                .invoice
                .map(|invoice| invoice.trim().to_string())
                .filter(|invoice| !invoice.is_empty()),
            status: payload.status,
            tracking_message: payload.tracking_message,
        }
    }
}

/// Acknowledgement body the courier expects.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WebhookAck {
    /// `success` or `error`
    pub status: String,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl WebhookAck {
    fn success(message: &str) -> Self {
        WebhookAck {
            status: "success".to_string(),
            message: message.to_string(),
            timestamp: None,
        }
    }

    fn error(message: &str) -> Self {
        WebhookAck {
            status: "error".to_string(),
            message: message.to_string(),
            timestamp: None,
        }
    }
}

/// Courier Webhook Handler
#[endpoint(
    tags("webhooks"),
    summary = "Courier Notification",
    responses(
        (status_code = StatusCode::OK, description = "Notification applied"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "webhooks.courier",
    skip(json, depot, res),
    fields(invoice = tracing::field::Empty, consignment_id = tracing::field::Empty),
    err
)]
pub(crate) async fn receive(
    json: JsonBody<CourierWebhookPayload>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<WebhookAck>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let notification: CourierNotification = json.into_inner().into();

    let span = tracing::Span::current();

    if let Some(invoice) = notification.invoice.as_deref() {
        span.record("invoice", invoice);
    }

    if let Some(consignment_id) = notification.consignment_id {
        span.record("consignment_id", consignment_id);
    }

    match state.app.orders.apply_courier_notification(notification).await {
        Ok(order) => {
            info!(
                invoice = order.invoice,
                courier_status = order.courier_status.as_deref().unwrap_or("unknown"),
                "applied courier notification"
            );

            Ok(Json(WebhookAck::success("Webhook received successfully.")))
        }
        Err(OrdersServiceError::NotFound) => {
            warn!("courier notification matched no order");

            res.status_code(StatusCode::NOT_FOUND);

            Ok(Json(WebhookAck::error("Order not found")))
        }
        Err(source) => {
            error!("failed to apply courier notification: {source}");

            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            Ok(Json(WebhookAck::error("Internal server error")))
        }
    }
}

/// Courier Webhook Liveness Handler
#[endpoint(
    tags("webhooks"),
    summary = "Courier Webhook Liveness",
    responses((status_code = StatusCode::OK, description = "Webhook endpoint is active")),
)]
pub(crate) async fn liveness() -> Json<WebhookAck> {
    Json(WebhookAck {
        timestamp: Some(Timestamp::now().to_string()),
        ..WebhookAck::success("Courier webhook endpoint is active")
    })
}
