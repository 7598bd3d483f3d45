//! Create Product Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use crate::{
    catalog::{
        errors::into_status_error,
        models::{CreateProductRequest, ProductResponse},
    },
    extensions::*,
    state::State,
};

/// Create Product Handler
///
/// Creates a product together with its varieties.
#[endpoint(
    tags("admin"),
    summary = "Create Product",
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "catalog.create_product",
    skip(json, depot, res),
    fields(product_uuid = tracing::field::Empty, varieties_count = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    if request.varieties.is_empty() {
        return Err(StatusError::bad_request().brief("A product needs at least one variety"));
    }

    tracing::Span::current().record("varieties_count", request.varieties.len());

    let product = state
        .app
        .catalog
        .create_product(request.into())
        .await
        .map_err(into_status_error)?;

    tracing::Span::current().record("product_uuid", tracing::field::display(product.uuid));

    res.add_header(LOCATION, format!("/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(product.into()))
}
