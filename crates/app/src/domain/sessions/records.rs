//! Checkout Session Records

use grocer::{
    ids::TypedUuid,
    sessions::{CustomerDetails, SessionState, SessionTimeline, classify},
};
use jiff::Timestamp;
use serde_json::Value;

use crate::domain::visitors::records::VisitorUuid;

/// Marker for checkout session identifiers.
#[derive(Debug)]
pub enum SessionKind {}

/// Checkout Session UUID
pub type SessionUuid = TypedUuid<SessionKind>;

/// Checkout Session Record
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub uuid: SessionUuid,
    pub visitor_uuid: VisitorUuid,
    pub visitor_token: String,
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,

    /// Whole seconds between entry and exit
    pub time_spent: Option<u64>,

    pub customer: CustomerDetails,
    pub cart_items: Value,
    pub subtotal: u64,
    pub applied_coupons: Option<Value>,
    pub discount_amount: u64,
    pub order_completed: bool,
    pub order_placed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl SessionRecord {
    pub fn state(&self) -> SessionState {
        classify(self.exit_time, self.order_completed)
    }

    pub fn timeline(&self) -> SessionTimeline {
        SessionTimeline {
            entry_time: self.entry_time,
            exit_time: self.exit_time,
            time_spent: self.time_spent,
            order_completed: self.order_completed,
            order_placed_at: self.order_placed_at,
        }
    }
}

/// Session counts per reporting state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
    pub abandoned: u64,
}
