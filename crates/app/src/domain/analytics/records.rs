//! Analytics Records

use grocer::ids::TypedUuid;

use crate::domain::catalog::records::ProductUuid;

/// Marker for recorded storefront events.
#[derive(Debug)]
pub enum EventKind {}

/// Product view or cart add identifier.
pub type EventUuid = TypedUuid<EventKind>;

/// Visitor counts. Visitors without a checkout session are neither unique nor repeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitorStats {
    /// `unique + repeat`
    pub total: u64,

    /// Visitors with exactly one checkout session
    pub unique: u64,

    /// Visitors with more than one checkout session
    pub repeat: u64,

    /// Visitors first seen in each window
    pub today: u64,
    pub week: u64,
    pub month: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductViews {
    pub product_uuid: ProductUuid,
    pub name: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCartAdds {
    pub product_uuid: ProductUuid,
    pub name: String,

    /// Number of add-to-cart events
    pub adds: u64,

    /// Units added across those events
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCheckouts {
    pub product_uuid: ProductUuid,
    pub name: String,

    /// Orders containing the product
    pub orders: u64,

    /// Units ordered
    pub quantity: u64,
}

/// Admin analytics dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsSummary {
    pub visitors: VisitorStats,
    pub most_viewed: Vec<ProductViews>,
    pub most_cart_added: Vec<ProductCartAdds>,
    pub most_checked_out: Vec<ProductCheckouts>,
}
