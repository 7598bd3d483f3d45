//! Checkout Sessions Data

use grocer::sessions::{CustomerDetails, SessionPatch, SessionState, TerminalAction};
use serde_json::Value;

use crate::domain::sessions::records::SessionUuid;

/// Most sessions returned by a single listing.
pub const MAX_SESSION_LIST: u32 = 100;

/// New Session Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub uuid: SessionUuid,

    /// Token of the visitor opening the checkout
    pub visitor_token: String,

    /// Cart contents as sent by the storefront
    pub cart_items: Value,

    pub subtotal: u64,
    pub applied_coupons: Option<Value>,
    pub discount_amount: u64,
}

/// Incremental session update. Only provided fields are written.
pub type SessionUpdate = SessionPatch<Value>;

/// Terminal transition with the final customer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalUpdate {
    pub action: TerminalAction,
    pub customer: CustomerDetails,
}

/// Session listing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFilter {
    pub state: Option<SessionState>,
    pub visitor_token: Option<String>,

    /// Capped at [`MAX_SESSION_LIST`]
    pub limit: u32,
}

impl Default for SessionFilter {
    fn default() -> Self {
        Self {
            state: None,
            visitor_token: None,
            limit: MAX_SESSION_LIST,
        }
    }
}
