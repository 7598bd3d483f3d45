//! Test Helpers

use serde_json::json;

use crate::{
    domain::{
        catalog::{
            CatalogService, CatalogServiceError,
            data::{NewCategory, NewProduct, NewVariety},
            records::{CategoryRecord, CategoryUuid, ProductRecord, ProductUuid, VarietyUuid},
        },
        sessions::{
            SessionsService, SessionsServiceError,
            data::NewSession,
            records::{SessionRecord, SessionUuid},
        },
        visitors::VisitorsService,
    },
    test::TestContext,
};

/// Category every [`create_product`] product belongs to.
pub(crate) const CATEGORY_NAME: &str = "Staples";

pub(crate) async fn create_category(
    ctx: &TestContext,
    name: &str,
    code: &str,
) -> Result<CategoryRecord, CatalogServiceError> {
    ctx.catalog
        .create_category(NewCategory {
            uuid: CategoryUuid::new(),
            name: name.to_string(),
            code: code.to_string(),
            image_url: None,
        })
        .await
}

/// A product with a single undiscounted "1kg" variety at `price`.
pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: u64,
) -> Result<ProductRecord, CatalogServiceError> {
    let category = create_category(ctx, CATEGORY_NAME, &ProductUuid::new().to_string()).await?;

    ctx.catalog
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            category_uuid: category.uuid,
            name: name.to_string(),
            is_offer: false,
            varieties: vec![NewVariety {
                uuid: VarietyUuid::new(),
                name: "1kg".to_string(),
                price,
                stock: 10,
                discount: None,
            }],
        })
        .await
}

/// An active session for a fresh visitor with a 500.00 subtotal.
pub(crate) async fn create_session(
    ctx: &TestContext,
) -> Result<SessionRecord, SessionsServiceError> {
    let lookup = ctx
        .visitors
        .get_or_create(None)
        .await
        .map_err(|_| SessionsServiceError::VisitorNotFound)?;

    ctx.sessions
        .create_session(NewSession {
            uuid: SessionUuid::new(),
            visitor_token: lookup.visitor.token,
            cart_items: json!([]),
            subtotal: 50_000,
            applied_coupons: None,
            discount_amount: 0,
        })
        .await
}
