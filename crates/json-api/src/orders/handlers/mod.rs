//! Order Handlers

pub(crate) mod courier_status;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod send_to_courier;
pub(crate) mod track;
pub(crate) mod update;
