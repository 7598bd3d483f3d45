//! Order Wire Models

use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use grocer_app::domain::{
    courier::models::Consignment,
    orders::{
        data::{NewOrder, NewOrderItem, OrderUpdate},
        records::{
            CourierHandoff, CourierTracking, OrderCouponRecord, OrderItemRecord, OrderRecord,
            OrderStatus, OrderUuid,
        },
    },
};

use crate::extensions::*;

/// Parse an order status name from the wire.
pub(crate) fn parse_status(value: &str) -> Result<OrderStatus, StatusError> {
    value.trim().parse().or_400("Invalid order status")
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Option<Uuid>,
    pub product_name: String,
    pub variety_name: Option<String>,
    pub price: u64,
    pub quantity: u32,
    pub total: u64,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        OrderItemResponse {
            uuid: item.uuid.into(),
            product_uuid: item.product_uuid.map(Into::into),
            product_name: item.product_name,
            variety_name: item.variety_name,
            price: item.price,
            quantity: item.quantity,
            total: item.total,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderCouponResponse {
    pub coupon_uuid: Option<Uuid>,
    pub code: String,
    pub discount: u64,
}

impl From<OrderCouponRecord> for OrderCouponResponse {
    fn from(coupon: OrderCouponRecord) -> Self {
        OrderCouponResponse {
            coupon_uuid: coupon.coupon_uuid.map(Into::into),
            code: coupon.code,
            discount: coupon.discount,
        }
    }
}

/// Order Response. Amounts are in minor units.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub invoice: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: String,
    pub subtotal: u64,
    pub discount: u64,
    pub delivery_charge: u64,
    pub total: u64,
    pub status: String,
    pub payment_status: String,
    pub admin_note: Option<String>,
    pub consignment_id: Option<String>,
    pub tracking_code: Option<String>,
    pub courier_status: Option<String>,
    pub tracking_message: Option<String>,
    pub session_uuid: Option<Uuid>,
    pub items: Vec<OrderItemResponse>,
    pub coupons: Vec<OrderCouponResponse>,
    pub created_at: String,
    pub updated_at: String,
    pub approved_at: Option<String>,
    pub delivered_at: Option<String>,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            uuid: order.uuid.into(),
            invoice: order.invoice,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_email: order.customer_email,
            customer_address: order.customer_address,
            subtotal: order.subtotal,
            discount: order.discount,
            delivery_charge: order.delivery_charge,
            total: order.total,
            status: order.status.as_str().to_string(),
            payment_status: order.payment_status,
            admin_note: order.admin_note,
            consignment_id: order.consignment_id,
            tracking_code: order.tracking_code,
            courier_status: order.courier_status,
            tracking_message: order.tracking_message,
            session_uuid: order.session_uuid.map(Into::into),
            items: order.items.into_iter().map(Into::into).collect(),
            coupons: order.coupons.into_iter().map(Into::into).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
            approved_at: order.approved_at.as_ref().map(ToString::to_string),
            delivered_at: order.delivered_at.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrdersResponse {
    pub orders: Vec<OrderResponse>,
}

impl From<Vec<OrderRecord>> for OrdersResponse {
    fn from(orders: Vec<OrderRecord>) -> Self {
        OrdersResponse {
            orders: orders.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConsignmentResponse {
    pub consignment_id: u64,
    pub invoice: String,
    pub tracking_code: String,
    pub status: String,
}

impl From<Consignment> for ConsignmentResponse {
    fn from(consignment: Consignment) -> Self {
        ConsignmentResponse {
            consignment_id: consignment.consignment_id,
            invoice: consignment.invoice,
            tracking_code: consignment.tracking_code,
            status: consignment.status,
        }
    }
}

/// Courier Handoff Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourierHandoffResponse {
    pub order: OrderResponse,
    pub consignment: ConsignmentResponse,
}

impl From<CourierHandoff> for CourierHandoffResponse {
    fn from(handoff: CourierHandoff) -> Self {
        CourierHandoffResponse {
            order: handoff.order.into(),
            consignment: handoff.consignment.into(),
        }
    }
}

/// Courier Tracking Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourierTrackingResponse {
    pub order: OrderResponse,
    pub delivery_status: String,
}

impl From<CourierTracking> for CourierTrackingResponse {
    fn from(tracking: CourierTracking) -> Self {
        CourierTrackingResponse {
            order: tracking.order.into(),
            delivery_status: tracking.delivery_status,
        }
    }
}

/// Order line as the storefront cart holds it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemBody {
    pub product_uuid: Option<Uuid>,
    pub variety_uuid: Option<Uuid>,
    pub name: String,

    #[serde(alias = "subtitle")]
    pub variety_name: Option<String>,

    /// Unit price the customer saw, in minor units
    pub price: u64,

    pub quantity: u32,
}

impl From<OrderItemBody> for NewOrderItem {
    fn from(item: OrderItemBody) -> Self {
        NewOrderItem {
            product_uuid: item.product_uuid.map(Into::into),
            variety_uuid: item.variety_uuid.map(Into::into),
            name: item.name,
            variety_name: item.variety_name.filter(|name| !name.trim().is_empty()),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// An applied coupon, either its bare code or the coupon object the cart holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub(crate) enum AppliedCouponBody {
    Code(String),
    Coupon { code: String },
}

impl AppliedCouponBody {
    fn into_code(self) -> String {
        match self {
            Self::Code(code) | Self::Coupon { code } => code,
        }
    }
}

/// Create Order Request. Amounts are the customer's view and are repriced on the server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest {
    pub uuid: Option<Uuid>,

    #[serde(default)]
    pub customer_name: String,

    #[serde(default)]
    pub customer_phone: String,

    pub customer_email: Option<String>,

    #[serde(default)]
    pub customer_address: String,

    #[serde(default)]
    pub items: Vec<OrderItemBody>,

    pub subtotal: Option<u64>,
    pub discount: Option<u64>,
    pub delivery_charge: Option<u64>,

    /// Total the customer agreed to
    pub total: u64,

    #[serde(default)]
    #[salvo(schema(value_type = Vec<AppliedCouponBody>))]
    pub applied_coupons: SmallVec<[AppliedCouponBody; 2]>,

    pub session_uuid: Option<Uuid>,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(request: CreateOrderRequest) -> Self {
        NewOrder {
            uuid: request.uuid.map_or_else(OrderUuid::new, Into::into),
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: request.customer_phone.trim().to_string(),
            customer_email: request
                .customer_email
                .map(|email| email.trim().to_string())
                .filter(|email| !email.is_empty()),
            customer_address: request.customer_address.trim().to_string(),
            items: request.items.into_iter().map(Into::into).collect(),
            coupon_codes: request
                .applied_coupons
                .into_iter()
                .map(AppliedCouponBody::into_code)
                .collect(),
            claimed_total: request.total,
            session_uuid: request.session_uuid.map(Into::into),
        }
    }
}

/// Update Order Request. Omitted fields are left as they are.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct UpdateOrderRequest {
    pub status: Option<String>,
    pub admin_note: Option<String>,
    pub courier_status: Option<String>,
    pub tracking_code: Option<String>,
    pub consignment_id: Option<String>,
    pub tracking_message: Option<String>,
}

impl UpdateOrderRequest {
    pub(crate) fn into_update(self) -> Result<OrderUpdate, StatusError> {
        Ok(OrderUpdate {
            status: self.status.as_deref().map(parse_status).transpose()?,
            admin_note: self.admin_note,
            courier_status: self.courier_status,
            tracking_code: self.tracking_code,
            consignment_id: self.consignment_id,
            tracking_message: self.tracking_message,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use grocer::ids::ProductUuid;
    use jiff::Timestamp;
    use serde_json::json;
    use testresult::TestResult;

    use grocer_app::domain::orders::records::OrderItemUuid;

    use super::*;

    pub(crate) fn make_order(uuid: OrderUuid) -> OrderRecord {
        OrderRecord {
            uuid,
            invoice: "INV-20261014-4821".to_string(),
            customer_name: "Rahim".to_string(),
            customer_phone: "01712345678".to_string(),
            customer_email: None,
            customer_address: "House 4, Road 2, Dhanmondi".to_string(),
            subtotal: 81_000,
            discount: 8_100,
            delivery_charge: 6_000,
            total: 78_900,
            status: OrderStatus::Pending,
            payment_status: "unpaid".to_string(),
            admin_note: None,
            consignment_id: None,
            tracking_code: None,
            courier_status: None,
            tracking_message: None,
            session_uuid: None,
            items: vec![OrderItemRecord {
                uuid: OrderItemUuid::new(),
                product_uuid: Some(ProductUuid::new()),
                product_name: "Miniket Rice".to_string(),
                variety_name: Some("5kg".to_string()),
                price: 40_500,
                quantity: 2,
                total: 81_000,
            }],
            coupons: vec![OrderCouponRecord {
                coupon_uuid: None,
                code: "SAVE10".to_string(),
                discount: 8_100,
            }],
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            approved_at: None,
            delivered_at: None,
        }
    }

    #[test]
    fn applied_coupons_accept_codes_and_objects() -> TestResult {
        let request: CreateOrderRequest = serde_json::from_value(json!({
            "customerName": " Rahim ",
            "customerPhone": "01712345678",
            "customerAddress": "Dhanmondi",
            "items": [],
            "total": 78_900,
            "appliedCoupons": ["SAVE10", { "code": "FRESH50", "discount": 5000 }],
        }))?;

        let order = NewOrder::from(request);

        assert_eq!(order.coupon_codes, vec!["SAVE10", "FRESH50"]);
        assert_eq!(order.customer_name, "Rahim");
        assert_eq!(order.claimed_total, 78_900);

        Ok(())
    }

    #[test]
    fn subtitle_is_read_as_variety_name() -> TestResult {
        let item: OrderItemBody = serde_json::from_value(json!({
            "name": "Miniket Rice",
            "subtitle": "5kg",
            "price": 40_500,
            "quantity": 2,
        }))?;

        assert_eq!(item.variety_name.as_deref(), Some("5kg"));

        Ok(())
    }

    #[test]
    fn unknown_status_is_rejected() {
        let request = UpdateOrderRequest {
            status: Some("shipped".to_string()),
            ..UpdateOrderRequest::default()
        };

        assert!(request.into_update().is_err(), "expected unknown status to fail");
    }
}
