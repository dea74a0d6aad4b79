use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// User - Read-Only Projection of the Auth Collaborator
// ============================================================================
//
// Identity issuance lives outside this service. The workflow only ever sees
// a resolved user id plus role, and the admin order listing joins against
// this summary shape.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Privileged actors may mutate the catalog and transition order status.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admin_is_privileged() {
        assert!(Role::Admin.is_privileged());
        assert!(!Role::User.is_privileged());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
