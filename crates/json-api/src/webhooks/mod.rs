//! Webhooks

pub(crate) mod courier;
