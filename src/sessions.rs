//! Checkout Sessions
//!
//! State machine for the live snapshot of an in-progress checkout. A session starts
//! `Active` and reaches at most one terminal state, `Completed` or `Abandoned`.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by session transitions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The session already reached a terminal state.
    #[error("session is already {0}")]
    AlreadyTerminated(SessionState),

    /// Unrecognised terminal action name.
    #[error("invalid action")]
    InvalidAction,

    /// Unrecognised session state name.
    #[error("invalid session state")]
    InvalidState,
}

/// Reporting state of a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Customer is still on the checkout page.
    Active,

    /// An order was placed.
    Completed,

    /// Customer left without ordering.
    Abandoned,
}

impl SessionState {
    /// Storage/wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    /// Whether no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "abandoned" => Ok(Self::Abandoned),
            _ => Err(SessionError::InvalidState),
        }
    }
}

/// Derive the state from stored fields. Completion wins over an exit time.
pub fn classify(exit_time: Option<Timestamp>, order_completed: bool) -> SessionState {
    match (order_completed, exit_time) {
        (true, _) => SessionState::Completed,
        (false, Some(_)) => SessionState::Abandoned,
        (false, None) => SessionState::Active,
    }
}

/// The two terminal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalAction {
    /// Order placed.
    Complete,

    /// Customer left the checkout page.
    End,
}

impl TerminalAction {
    /// Storage/wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::End => "end",
        }
    }

    /// State the session ends up in.
    pub fn target_state(&self) -> SessionState {
        match self {
            Self::Complete => SessionState::Completed,
            Self::End => SessionState::Abandoned,
        }
    }
}

impl FromStr for TerminalAction {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(Self::Complete),
            "end" => Ok(Self::End),
            _ => Err(SessionError::InvalidAction),
        }
    }
}

/// Whole seconds between entry and exit, floored and never negative.
pub fn time_spent_seconds(entry_time: Timestamp, exit_time: Timestamp) -> u64 {
    let millis = exit_time.as_millisecond() - entry_time.as_millisecond();

    u64::try_from(millis.div_euclid(1_000)).unwrap_or(0)
}

/// Customer fields captured on the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Full name
    pub name: Option<String>,

    /// Phone number
    pub phone: Option<String>,

    /// Shipping address
    pub address: Option<String>,
}

/// Provided fields of an incremental session update. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPatch<C> {
    /// Customer name
    pub customer_name: Option<String>,

    /// Customer phone
    pub customer_phone: Option<String>,

    /// Shipping address
    pub customer_address: Option<String>,

    /// Applied coupons snapshot
    pub applied_coupons: Option<C>,

    /// Discount amount in minor units
    pub discount_amount: Option<u64>,

    /// Subtotal in minor units
    pub subtotal: Option<u64>,
}

impl<C> Default for SessionPatch<C> {
    fn default() -> Self {
        Self {
            customer_name: None,
            customer_phone: None,
            customer_address: None,
            applied_coupons: None,
            discount_amount: None,
            subtotal: None,
        }
    }
}

impl<C> SessionPatch<C> {
    /// Whether the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.customer_phone.is_none()
            && self.customer_address.is_none()
            && self.applied_coupons.is_none()
            && self.discount_amount.is_none()
            && self.subtotal.is_none()
    }
}

/// Lifecycle timestamps of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeline {
    /// Set at creation
    pub entry_time: Timestamp,

    /// Set by either terminal transition
    pub exit_time: Option<Timestamp>,

    /// Seconds between entry and exit
    pub time_spent: Option<u64>,

    /// Set by `complete`
    pub order_completed: bool,

    /// Set by `complete`
    pub order_placed_at: Option<Timestamp>,
}

impl SessionTimeline {
    /// A new active session entered at `entry_time`.
    pub fn started(entry_time: Timestamp) -> Self {
        Self {
            entry_time,
            exit_time: None,
            time_spent: None,
            order_completed: false,
            order_placed_at: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        classify(self.exit_time, self.order_completed)
    }

    /// Apply a terminal transition at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyTerminated`] unless the session is active.
    pub fn terminate(&mut self, action: TerminalAction, now: Timestamp) -> Result<(), SessionError> {
        let state = self.state();

        if state.is_terminal() {
            return Err(SessionError::AlreadyTerminated(state));
        }

        self.exit_time = Some(now);
        self.time_spent = Some(time_spent_seconds(self.entry_time, now));

        if action == TerminalAction::Complete {
            self.order_completed = true;
            self.order_placed_at = Some(now);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn classification_covers_all_states() {
        let now = Timestamp::now();

        assert_eq!(classify(None, false), SessionState::Active);
        assert_eq!(classify(Some(now), false), SessionState::Abandoned);
        assert_eq!(classify(Some(now), true), SessionState::Completed);
        assert_eq!(classify(None, true), SessionState::Completed);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(SessionPatch::<Vec<String>>::default().is_empty());
        assert!(
            !SessionPatch::<Vec<String>> {
                subtotal: Some(1),
                ..SessionPatch::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn end_records_floored_time_spent() -> TestResult {
        let entry = Timestamp::now();
        let mut timeline = SessionTimeline::started(entry);
        let exit = entry + SignedDuration::from_millis(65_999);

        timeline.terminate(TerminalAction::End, exit)?;

        assert_eq!(timeline.state(), SessionState::Abandoned);
        assert_eq!(timeline.exit_time, Some(exit));
        assert_eq!(timeline.time_spent, Some(65));
        assert!(!timeline.order_completed);
        assert_eq!(timeline.order_placed_at, None);

        Ok(())
    }

    #[test]
    fn complete_marks_order_placed() -> TestResult {
        let entry = Timestamp::now();
        let mut timeline = SessionTimeline::started(entry);
        let exit = entry + SignedDuration::from_secs(30);

        timeline.terminate(TerminalAction::Complete, exit)?;

        assert_eq!(timeline.state(), SessionState::Completed);
        assert_eq!(timeline.order_placed_at, Some(exit));
        assert_eq!(timeline.time_spent, Some(30));

        Ok(())
    }

    #[test]
    fn second_terminal_transition_is_rejected() -> TestResult {
        let entry = Timestamp::now();
        let mut timeline = SessionTimeline::started(entry);

        timeline.terminate(TerminalAction::Complete, entry)?;

        let result = timeline.terminate(TerminalAction::End, entry + SignedDuration::from_secs(5));

        assert_eq!(
            result,
            Err(SessionError::AlreadyTerminated(SessionState::Completed))
        );
        assert_eq!(timeline.state(), SessionState::Completed);

        Ok(())
    }

    #[test]
    fn clock_skew_never_yields_negative_time() {
        let entry = Timestamp::now();

        assert_eq!(time_spent_seconds(entry, entry - SignedDuration::from_secs(3)), 0);
    }

    #[test]
    fn actions_parse_from_names() {
        assert_eq!("complete".parse(), Ok(TerminalAction::Complete));
        assert_eq!("end".parse(), Ok(TerminalAction::End));
        assert_eq!(
            "finish".parse::<TerminalAction>(),
            Err(SessionError::InvalidAction)
        );
    }
}
