//! Visitor Get-or-create Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    extensions::*,
    state::State,
    tracking::{
        errors::visitor_status_error,
        models::{VisitorLookupResponse, VisitorRequest},
    },
};

/// Visitor Handler
///
/// Returns the visitor holding the given token, or mints a new one.
#[endpoint(
    tags("tracking"),
    summary = "Get or Create Visitor",
    responses(
        (status_code = StatusCode::OK, description = "Existing visitor"),
        (status_code = StatusCode::CREATED, description = "New visitor"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<VisitorRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<VisitorLookupResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let token = json
        .into_inner()
        .visitor_token
        .filter(|token| !token.trim().is_empty());

    let lookup = state
        .app
        .visitors
        .get_or_create(token)
        .await
        .map_err(visitor_status_error)?;

    if lookup.is_new {
        res.status_code(StatusCode::CREATED);
    }

    Ok(Json(lookup.into()))
}
