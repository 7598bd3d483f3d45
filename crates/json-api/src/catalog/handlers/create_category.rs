//! Create Category Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use crate::{
    catalog::{
        errors::into_status_error,
        models::{CategoryResponse, CreateCategoryRequest},
    },
    extensions::*,
    state::State,
};

/// Create Category Handler
#[endpoint(
    tags("admin"),
    summary = "Create Category",
    responses(
        (status_code = StatusCode::CREATED, description = "Category created"),
        (status_code = StatusCode::CONFLICT, description = "Category code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCategoryRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CategoryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let category = state
        .app
        .catalog
        .create_category(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/categories/{}", category.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(category.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::catalog::{CatalogServiceError, records::CategoryUuid};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{catalog::models::tests::make_category, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("admin/categories").post(handler))
    }

    #[tokio::test]
    async fn test_create_category_success() -> TestResult {
        let uuid = CategoryUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .catalog
            .expect_create_category()
            .once()
            .withf(move |new| new.uuid == uuid && new.code == "RICE" && new.image_url.is_none())
            .return_once(move |_| Ok(make_category(uuid)));

        let mut res = TestClient::post("http://example.com/admin/categories")
            .json(&json!({ "uuid": uuid.into_uuid(), "name": "Rice", "code": " RICE ", "imageUrl": "" }))
            .send(&make_service(mocks))
            .await;

        let body: CategoryResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/categories/{uuid}").as_str()));
        assert_eq!(body.uuid, uuid.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_category_duplicate_code_returns_409() {
        let mut mocks = Mocks::default();

        mocks
            .catalog
            .expect_create_category()
            .once()
            .return_once(|_| Err(CatalogServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/admin/categories")
            .json(&json!({ "name": "Rice", "code": "RICE" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }
}
