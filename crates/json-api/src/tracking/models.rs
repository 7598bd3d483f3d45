//! Tracking Wire Models

use grocer::sessions::{CustomerDetails, TerminalAction};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use grocer_app::domain::{
    sessions::{
        data::{NewSession, SessionUpdate, TerminalUpdate},
        records::{SessionRecord, SessionSummary, SessionUuid},
    },
    visitors::records::{VisitorLookup, VisitorRecord},
};

/// Get-or-create Visitor Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct VisitorRequest {
    /// Token held by the browser, if any
    pub visitor_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VisitorResponse {
    pub uuid: Uuid,
    pub serial: u64,

    /// `Visitor-{serial}`
    pub token: String,

    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: String,
}

impl From<VisitorRecord> for VisitorResponse {
    fn from(visitor: VisitorRecord) -> Self {
        VisitorResponse {
            uuid: visitor.uuid.into(),
            serial: visitor.serial,
            token: visitor.token,
            name: visitor.name,
            phone: visitor.phone,
            email: visitor.email,
            created_at: visitor.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VisitorLookupResponse {
    pub visitor: VisitorResponse,
    pub is_new: bool,
}

impl From<VisitorLookup> for VisitorLookupResponse {
    fn from(lookup: VisitorLookup) -> Self {
        VisitorLookupResponse {
            visitor: lookup.visitor.into(),
            is_new: lookup.is_new,
        }
    }
}

/// Create Session Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSessionRequest {
    pub uuid: Option<Uuid>,
    pub visitor_token: String,

    /// Cart contents as held by the storefront
    #[salvo(schema(value_type = Object))]
    pub cart_items: Value,

    /// Minor units
    pub subtotal: u64,

    #[serde(default)]
    #[salvo(schema(value_type = Option<Object>))]
    pub applied_coupons: Option<Value>,

    #[serde(default)]
    pub discount_amount: u64,
}

impl From<CreateSessionRequest> for NewSession {
    fn from(request: CreateSessionRequest) -> Self {
        NewSession {
            uuid: request.uuid.map_or_else(SessionUuid::new, Into::into),
            visitor_token: request.visitor_token,
            cart_items: request.cart_items,
            subtotal: request.subtotal,
            applied_coupons: request.applied_coupons,
            discount_amount: request.discount_amount,
        }
    }
}

/// Incremental Session Update. Only the fields present are written.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct UpdateSessionRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,

    #[salvo(schema(value_type = Option<Object>))]
    pub applied_coupons: Option<Value>,

    pub discount_amount: Option<u64>,
    pub subtotal: Option<u64>,
}

impl From<UpdateSessionRequest> for SessionUpdate {
    fn from(request: UpdateSessionRequest) -> Self {
        SessionUpdate {
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            customer_address: request.customer_address,
            applied_coupons: request.applied_coupons,
            discount_amount: request.discount_amount,
            subtotal: request.subtotal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TerminalActionBody {
    Complete,
    End,
}

impl From<TerminalActionBody> for TerminalAction {
    fn from(action: TerminalActionBody) -> Self {
        match action {
            TerminalActionBody::Complete => Self::Complete,
            TerminalActionBody::End => Self::End,
        }
    }
}

/// Final customer fields sent with a terminal transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CustomerBody {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
}

impl From<CustomerBody> for CustomerDetails {
    fn from(body: CustomerBody) -> Self {
        let keep = |value: Option<String>| value.filter(|value| !value.trim().is_empty());

        CustomerDetails {
            name: keep(body.customer_name),
            phone: keep(body.customer_phone),
            address: keep(body.customer_address),
        }
    }
}

/// Terminal Session Request, `{"action": "complete" | "end", ...customer fields}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TerminalSessionRequest {
    pub action: TerminalActionBody,

    #[serde(flatten)]
    pub customer: CustomerBody,
}

impl From<TerminalSessionRequest> for TerminalUpdate {
    fn from(request: TerminalSessionRequest) -> Self {
        TerminalUpdate {
            action: request.action.into(),
            customer: request.customer.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionResponse {
    pub uuid: Uuid,
    pub visitor_uuid: Uuid,
    pub visitor_token: String,

    /// `active`, `completed` or `abandoned`
    pub state: String,

    pub entry_time: String,
    pub exit_time: Option<String>,

    /// Whole seconds between entry and exit
    pub time_spent: Option<u64>,

    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,

    #[salvo(schema(value_type = Object))]
    pub cart_items: Value,

    pub subtotal: u64,

    #[salvo(schema(value_type = Option<Object>))]
    pub applied_coupons: Option<Value>,

    pub discount_amount: u64,
    pub order_completed: bool,
    pub order_placed_at: Option<String>,
    pub updated_at: String,
}

impl From<SessionRecord> for SessionResponse {
    fn from(session: SessionRecord) -> Self {
        let state = session.state().as_str().to_string();

        SessionResponse {
            uuid: session.uuid.into(),
            visitor_uuid: session.visitor_uuid.into(),
            visitor_token: session.visitor_token,
            state,
            entry_time: session.entry_time.to_string(),
            exit_time: session.exit_time.as_ref().map(ToString::to_string),
            time_spent: session.time_spent,
            customer_name: session.customer.name,
            customer_phone: session.customer.phone,
            customer_address: session.customer.address,
            cart_items: session.cart_items,
            subtotal: session.subtotal,
            applied_coupons: session.applied_coupons,
            discount_amount: session.discount_amount,
            order_completed: session.order_completed,
            order_placed_at: session.order_placed_at.as_ref().map(ToString::to_string),
            updated_at: session.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionsResponse {
    pub sessions: Vec<SessionResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionSummaryResponse {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
    pub abandoned: u64,
}

impl From<SessionSummary> for SessionSummaryResponse {
    fn from(summary: SessionSummary) -> Self {
        SessionSummaryResponse {
            total: summary.total,
            active: summary.active,
            completed: summary.completed,
            abandoned: summary.abandoned,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use jiff::Timestamp;
    use serde_json::json;
    use testresult::TestResult;

    use grocer_app::domain::visitors::records::VisitorUuid;

    use super::*;

    pub(crate) fn make_session(uuid: SessionUuid) -> SessionRecord {
        SessionRecord {
            uuid,
            visitor_uuid: VisitorUuid::new(),
            visitor_token: "Visitor-7".to_string(),
            entry_time: Timestamp::UNIX_EPOCH,
            exit_time: None,
            time_spent: None,
            customer: CustomerDetails::default(),
            cart_items: json!([{ "name": "Miniket Rice", "quantity": 1 }]),
            subtotal: 45_000,
            applied_coupons: None,
            discount_amount: 0,
            order_completed: false,
            order_placed_at: None,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    pub(crate) fn make_visitor(serial: u64) -> VisitorRecord {
        VisitorRecord {
            uuid: VisitorUuid::new(),
            serial,
            token: format!("Visitor-{serial}"),
            name: None,
            phone: None,
            email: None,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn terminal_request_reads_action_and_customer_fields() -> TestResult {
        let request: TerminalSessionRequest = serde_json::from_value(json!({
            "action": "end",
            "customerName": "Farhana",
            "customerPhone": "  ",
        }))?;

        let terminal = TerminalUpdate::from(request);

        assert_eq!(terminal.action, TerminalAction::End);
        assert_eq!(terminal.customer.name.as_deref(), Some("Farhana"));
        assert_eq!(terminal.customer.phone, None);

        Ok(())
    }

    #[test]
    fn unknown_terminal_action_is_rejected() {
        let result = serde_json::from_value::<TerminalSessionRequest>(json!({ "action": "pause" }));

        assert!(result.is_err(), "expected unknown action to fail");
    }
}
