//! Analytics Handlers

pub(crate) mod summary;
pub(crate) mod track_cart;
pub(crate) mod track_view;
