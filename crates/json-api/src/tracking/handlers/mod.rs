//! Tracking Handlers

pub(crate) mod beacon;
pub(crate) mod create_session;
pub(crate) mod get_session;
pub(crate) mod list_sessions;
pub(crate) mod session_summary;
pub(crate) mod terminate_session;
pub(crate) mod update_session;
pub(crate) mod visitors;
