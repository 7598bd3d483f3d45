//! Get Category Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    catalog::{errors::into_status_error, models::CategoryResponse},
    extensions::*,
    state::State,
};

/// Get Category Handler
#[endpoint(
    tags("catalog"),
    summary = "Get Category",
    responses(
        (status_code = StatusCode::OK, description = "Category"),
        (status_code = StatusCode::NOT_FOUND, description = "Category not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    category: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CategoryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let category = state
        .app
        .catalog
        .get_category(category.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(category.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::catalog::{CatalogServiceError, records::CategoryUuid};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{catalog::models::tests::make_category, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("categories/{category}").get(handler))
    }

    #[tokio::test]
    async fn test_get_category_success() -> TestResult {
        let uuid = CategoryUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .catalog
            .expect_get_category()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| Ok(make_category(uuid)));

        let mut res = TestClient::get(format!("http://example.com/categories/{uuid}"))
            .send(&make_service(mocks))
            .await;

        let body: CategoryResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.code, "RICE");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_category_storage_error_returns_500() {
        let mut mocks = Mocks::default();

        mocks
            .catalog
            .expect_get_category()
            .once()
            .return_once(|_| Err(CatalogServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get(format!("http://example.com/categories/{}", Uuid::now_v7()))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
