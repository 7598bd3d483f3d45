//! Create Checkout Session Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use crate::{
    extensions::*,
    state::State,
    tracking::{
        errors::session_status_error,
        models::{CreateSessionRequest, SessionResponse},
    },
};

/// Create Session Handler
///
/// Opens a checkout session when the customer lands on the checkout page.
#[endpoint(
    tags("tracking"),
    summary = "Create Checkout Session",
    responses(
        (status_code = StatusCode::CREATED, description = "Session created"),
        (status_code = StatusCode::NOT_FOUND, description = "Visitor not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateSessionRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let session = state
        .app
        .sessions
        .create_session(json.into_inner().into())
        .await
        .map_err(session_status_error)?;

    res.add_header(LOCATION, format!("/tracking/sessions/{}", session.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(session.into()))
}
