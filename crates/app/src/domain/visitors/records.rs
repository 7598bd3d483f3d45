//! Visitor Records

use grocer::ids::TypedUuid;
use jiff::Timestamp;
use serde::Serialize;

/// Marker for visitor identifiers.
#[derive(Debug)]
pub enum VisitorKind {}

/// Visitor UUID
pub type VisitorUuid = TypedUuid<VisitorKind>;

/// Visitor Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorRecord {
    pub uuid: VisitorUuid,
    pub serial: u64,

    /// Browser-held token, `Visitor-{serial}`
    pub token: String,

    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: Timestamp,
}

/// Result of a get-or-create lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorLookup {
    pub visitor: VisitorRecord,
    pub is_new: bool,
}
