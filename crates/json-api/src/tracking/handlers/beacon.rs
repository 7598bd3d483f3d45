//! Checkout Exit Beacon Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::{Instrument as _, debug, info, warn};
use uuid::Uuid;

use grocer::sessions::TerminalAction;
use grocer_app::domain::sessions::{data::TerminalUpdate, records::SessionUuid};

use crate::{
    extensions::*, observability::record_session_terminal, state::State,
    tracking::models::CustomerBody,
};

/// Parse beacon payloads sent as JSON under any content type.
fn customer_from_payload(payload: &[u8]) -> CustomerBody {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return CustomerBody::default();
    }

    serde_json::from_slice(payload).unwrap_or_else(|error| {
        debug!("ignoring unreadable beacon payload: {error}");

        CustomerBody::default()
    })
}

/// Exit Beacon Handler
///
/// Target of `navigator.sendBeacon` on page unload. Responds immediately and ends the
/// session in the background; failures are logged, never returned.
#[endpoint(
    tags("tracking"),
    summary = "End Checkout Session (beacon)",
    responses(
        (status_code = StatusCode::ACCEPTED, description = "End queued"),
    ),
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session: SessionUuid = session.into_inner().into();

    let customer = match req.payload().await {
        Ok(payload) => customer_from_payload(payload),
        Err(error) => {
            debug!("failed to read beacon payload: {error}");

            CustomerBody::default()
        }
    };

    let sessions = Arc::clone(&state.app.sessions);

    let terminal = TerminalUpdate {
        action: TerminalAction::End,
        customer: customer.into(),
    };

    tokio::spawn(
        async move {
            match sessions
                .terminate_session(session, terminal, Timestamp::now())
                .await
            {
                Ok(ended) => {
                    record_session_terminal(TerminalAction::End.as_str());

                    info!(session_uuid = %session, time_spent = ended.time_spent, "beacon ended session");
                }
                Err(error) => warn!(session_uuid = %session, "beacon failed to end session: {error}"),
            }
        }
        .in_current_span(),
    );

    Ok(StatusCode::ACCEPTED)
}
