use serde::{Deserialize, Serialize};

/// Unique identifier for an employee on the roster.
pub type EmployeeId = u32;

/// An employee from the admin-managed roster. Immutable during a session;
/// looked up by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    /// Optional avatar image reference; the UI falls back to an initial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
