//! Get Settings Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    settings::{errors::into_status_error, models::SettingsResponse},
    state::State,
};

/// Get Settings Handler
///
/// Returns the public site settings, including the delivery charge.
#[endpoint(
    tags("settings"),
    summary = "Get Site Settings",
    responses(
        (status_code = StatusCode::OK, description = "Site settings"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<SettingsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let settings = state
        .app
        .settings
        .get_settings()
        .await
        .map_err(into_status_error)?;

    Ok(Json(settings.into()))
}
