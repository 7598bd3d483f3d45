//! List Categories Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    catalog::{errors::into_status_error, models::CategoriesResponse},
    extensions::*,
    state::State,
};

/// List Categories Handler
#[endpoint(
    tags("catalog"),
    summary = "List Categories",
    responses(
        (status_code = StatusCode::OK, description = "Categories, newest first"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CategoriesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let categories = state
        .app
        .catalog
        .list_categories()
        .await
        .map_err(into_status_error)?;

    Ok(Json(categories.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::catalog::{CatalogServiceError, records::CategoryUuid};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{catalog::models::tests::make_category, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("categories").get(handler))
    }

    #[tokio::test]
    async fn test_list_categories_returns_all() -> TestResult {
        let rice = CategoryUuid::new();
        let oil = CategoryUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .catalog
            .expect_list_categories()
            .once()
            .return_once(move || Ok(vec![make_category(oil), make_category(rice)]));

        let mut res = TestClient::get("http://example.com/categories")
            .send(&make_service(mocks))
            .await;

        let body: CategoriesResponse = res.take_json().await?;
        let uuids: Vec<_> = body.categories.iter().map(|category| category.uuid).collect();

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(uuids, vec![oil.into_uuid(), rice.into_uuid()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_categories_storage_failure_returns_500() {
        let mut mocks = Mocks::default();

        mocks
            .catalog
            .expect_list_categories()
            .once()
            .return_once(|| Err(CatalogServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get("http://example.com/categories")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
