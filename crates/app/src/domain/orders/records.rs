//! Order Records

use std::{fmt, str::FromStr};

use grocer::ids::{CouponUuid, ProductUuid, TypedUuid};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{courier::models::Consignment, sessions::records::SessionUuid};

/// Marker for order identifiers.
#[derive(Debug)]
pub enum OrderKind {}

/// Order UUID
pub type OrderUuid = TypedUuid<OrderKind>;

/// Marker for order item identifiers.
#[derive(Debug)]
pub enum OrderItemKind {}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemKind>;

/// Unrecognised order status name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid order status {0}")]
pub struct InvalidOrderStatus(pub String);

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Approved,
    Processing,
    Delivered,
    Cancelled,
    PartialDelivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Processing => "processing",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::PartialDelivered => "partial_delivered",
        }
    }

    /// Order status implied by a normalised courier delivery status, if any.
    pub fn from_courier_status(status: &str) -> Option<Self> {
        match status {
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            "partial_delivered" => Some(Self::PartialDelivered),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = InvalidOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "processing" => Ok(Self::Processing),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "partial_delivered" => Ok(Self::PartialDelivered),
            other => Err(InvalidOrderStatus(other.to_string())),
        }
    }
}

/// Order Item Record, a snapshot of the cart line at order time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub product_uuid: Option<ProductUuid>,
    pub product_name: String,
    pub variety_name: Option<String>,
    pub price: u64,
    pub quantity: u32,
    pub total: u64,
}

/// A coupon counted towards the order discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCouponRecord {
    pub coupon_uuid: Option<CouponUuid>,
    pub code: String,
    pub discount: u64,
}

/// Order Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub invoice: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: String,
    pub subtotal: u64,
    pub discount: u64,
    pub delivery_charge: u64,
    pub total: u64,
    pub status: OrderStatus,
    pub payment_status: String,
    pub admin_note: Option<String>,
    pub consignment_id: Option<String>,
    pub tracking_code: Option<String>,
    pub courier_status: Option<String>,
    pub tracking_message: Option<String>,
    pub session_uuid: Option<SessionUuid>,
    pub items: Vec<OrderItemRecord>,
    pub coupons: Vec<OrderCouponRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub approved_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
}

impl OrderRecord {
    /// Courier item description, `name (variety) xQty` joined by commas.
    pub fn item_description(&self) -> String {
        self.items
            .iter()
            .map(|item| match &item.variety_name {
                Some(variety) => format!("{} ({variety}) x{}", item.product_name, item.quantity),
                None => format!("{} x{}", item.product_name, item.quantity),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// An order handed to the courier with the accepted consignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourierHandoff {
    pub order: OrderRecord,
    pub consignment: Consignment,
}

/// An order after a courier status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourierTracking {
    pub order: OrderRecord,
    pub delivery_status: String,
}
