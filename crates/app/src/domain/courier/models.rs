//! Courier Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default courier API base.
pub const DEFAULT_COURIER_BASE_URL: &str = "https://portal.packzy.com/api/v1";

/// Credentials and location of the courier API.
#[derive(Debug, Clone)]
pub struct CourierConfig {
    /// API base, e.g. `"https://portal.packzy.com/api/v1"`.
    pub base_url: String,

    pub api_key: String,
    pub secret_key: String,
}

/// Consignment submitted for a cash-on-delivery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsignmentRequest {
    pub invoice: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,

    /// Amount to collect, in major units
    #[serde(with = "rust_decimal::serde::float")]
    pub cod_amount: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub item_description: String,

    /// `0` home delivery, `1` point delivery
    pub delivery_type: u8,
}

/// Consignment accepted by the courier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Consignment {
    pub consignment_id: u64,
    pub invoice: String,
    pub tracking_code: String,
    pub status: String,
}

/// Push notification kinds sent to the courier webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    DeliveryStatus,
    TrackingUpdate,
}

/// Courier webhook payload, matched to an order by invoice or consignment id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourierNotification {
    pub kind: NotificationKind,
    pub consignment_id: Option<u64>,
    pub invoice: Option<String>,

    /// Raw delivery status, present on `DeliveryStatus`
    pub status: Option<String>,

    pub tracking_message: Option<String>,
}

/// Lowercase a courier status, `"unknown"` when absent.
pub fn normalise_courier_status(status: Option<&str>) -> String {
    status
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .map_or_else(|| "unknown".to_string(), str::to_lowercase)
}
