//! List Products Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};
use uuid::Uuid;

use crate::{
    catalog::{errors::into_status_error, models::ProductsResponse},
    extensions::*,
    state::State,
};

/// List Products Handler
///
/// Newest first, with varieties and their effective prices. `category` narrows the listing.
#[endpoint(
    tags("catalog"),
    summary = "List Products",
    responses(
        (status_code = StatusCode::OK, description = "Products"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed category"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    category: QueryParam<Uuid, false>,
    depot: &mut Depot,
) -> Result<Json<ProductsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let products = state
        .app
        .catalog
        .list_products(category.into_inner().map(Into::into))
        .await
        .map_err(into_status_error)?;

    Ok(Json(products.into()))
}
