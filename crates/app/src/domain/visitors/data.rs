//! Visitors Data

/// Contact details provided for a visitor. Blank fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}
