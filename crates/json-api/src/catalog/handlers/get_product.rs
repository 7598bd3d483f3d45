//! Get Product Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    catalog::{errors::into_status_error, models::ProductResponse},
    extensions::*,
    state::State,
};

/// Get Product Handler
///
/// Returns a product with its varieties and their effective prices.
#[endpoint(
    tags("catalog"),
    summary = "Get Product",
    responses(
        (status_code = StatusCode::OK, description = "Product"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .app
        .catalog
        .get_product(product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::catalog::{
        CatalogServiceError,
        records::{CategoryUuid, ProductUuid},
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{catalog::models::tests::make_product, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("products/{product}").get(handler))
    }

    #[tokio::test]
    async fn test_get_product_includes_effective_prices() -> TestResult {
        let uuid = ProductUuid::new();
        let product = make_product(uuid, CategoryUuid::new());

        let mut mocks = Mocks::default();

        mocks
            .catalog
            .expect_get_product()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| Ok(product));

        let mut res = TestClient::get(format!("http://example.com/products/{uuid}"))
            .send(&make_service(mocks))
            .await;

        let body: ProductResponse = res.take_json().await?;
        let variety = body.varieties.first();

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(variety.map(|v| (v.price, v.effective_price)), Some((45_000, 40_500)));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_product_returns_404() {
        let mut mocks = Mocks::default();

        mocks
            .catalog
            .expect_get_product()
            .once()
            .return_once(|_| Err(CatalogServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/products/{}", Uuid::now_v7()))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
