//! Analytics Wire Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use grocer_app::domain::analytics::{
    data::{NewCartAdd, NewProductView},
    records::{
        AnalyticsSummary, EventUuid, ProductCartAdds, ProductCheckouts, ProductViews,
        VisitorStats,
    },
};

/// Track Product View Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackViewRequest {
    pub product_uuid: Uuid,
    pub visitor_token: Option<String>,
}

impl From<TrackViewRequest> for NewProductView {
    fn from(request: TrackViewRequest) -> Self {
        NewProductView {
            uuid: EventUuid::new(),
            product_uuid: request.product_uuid.into(),
            visitor_token: request.visitor_token,
        }
    }
}

/// Track Cart Add Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackCartRequest {
    pub product_uuid: Uuid,
    pub visitor_token: Option<String>,

    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

impl From<TrackCartRequest> for NewCartAdd {
    fn from(request: TrackCartRequest) -> Self {
        NewCartAdd {
            uuid: EventUuid::new(),
            product_uuid: request.product_uuid.into(),
            visitor_token: request.visitor_token,
            quantity: request.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TrackedResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VisitorStatsResponse {
    pub total: u64,
    pub unique: u64,
    pub repeat: u64,
    pub today: u64,
    pub week: u64,
    pub month: u64,
}

impl From<VisitorStats> for VisitorStatsResponse {
    fn from(stats: VisitorStats) -> Self {
        VisitorStatsResponse {
            total: stats.total,
            unique: stats.unique,
            repeat: stats.repeat,
            today: stats.today,
            week: stats.week,
            month: stats.month,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ViewedProductResponse {
    pub uuid: Uuid,
    pub name: String,
    pub views: u64,
}

impl From<ProductViews> for ViewedProductResponse {
    fn from(product: ProductViews) -> Self {
        ViewedProductResponse {
            uuid: product.product_uuid.into(),
            name: product.name,
            views: product.views,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartAddedProductResponse {
    pub uuid: Uuid,
    pub name: String,
    pub count: u64,
    pub quantity: u64,
}

impl From<ProductCartAdds> for CartAddedProductResponse {
    fn from(product: ProductCartAdds) -> Self {
        CartAddedProductResponse {
            uuid: product.product_uuid.into(),
            name: product.name,
            count: product.adds,
            quantity: product.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckedOutProductResponse {
    pub uuid: Uuid,
    pub name: String,
    pub orders: u64,
    pub quantity: u64,
}

impl From<ProductCheckouts> for CheckedOutProductResponse {
    fn from(product: ProductCheckouts) -> Self {
        CheckedOutProductResponse {
            uuid: product.product_uuid.into(),
            name: product.name,
            orders: product.orders,
            quantity: product.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyticsResponse {
    pub stats: VisitorStatsResponse,
    pub most_viewed: Vec<ViewedProductResponse>,
    pub most_cart_added: Vec<CartAddedProductResponse>,
    pub most_checkout: Vec<CheckedOutProductResponse>,
}

impl From<AnalyticsSummary> for AnalyticsResponse {
    fn from(summary: AnalyticsSummary) -> Self {
        AnalyticsResponse {
            stats: summary.visitors.into(),
            most_viewed: summary.most_viewed.into_iter().map(Into::into).collect(),
            most_cart_added: summary.most_cart_added.into_iter().map(Into::into).collect(),
            most_checkout: summary.most_checked_out.into_iter().map(Into::into).collect(),
        }
    }
}
