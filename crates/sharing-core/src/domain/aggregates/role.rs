//! Roles assigned to members and administrators.
//!
//! Roles are read-only from this layer: they are loaded with their owner or
//! fetched by `load_role`, and feed the passport's role table.

#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identifiers::RoleId;
use crate::domain::permissions::{AdminRolePermissions, PersonalUserRolePermissions};
use crate::domain::values::RoleName;

/// A role a marketplace member can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalUserRoleProps {
    pub id: RoleId,
    pub name: RoleName,
    /// Assigned to new members when no role is chosen
    pub is_default: bool,
    pub permissions: PersonalUserRolePermissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A role an administrator can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRoleProps {
    pub id: RoleId,
    pub name: RoleName,
    pub is_default: bool,
    pub permissions: AdminRolePermissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_props_deserialize_camel_case() -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::json!({
            "id": "role-member",
            "name": "Member",
            "isDefault": true,
            "permissions": {
                "canCreateItemListing": true,
                "canManageReservationRequest": true
            },
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        });

        let role: PersonalUserRoleProps = serde_json::from_value(json)?;

        assert!(role.is_default);
        assert!(role.permissions.can_create_item_listing);
        assert!(!role.permissions.can_block_users);
        Ok(())
    }

    #[test]
    fn test_blank_role_name_rejected() {
        let json = serde_json::json!({
            "id": "role-admin",
            "name": "   ",
            "isDefault": false,
            "permissions": {},
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        });

        assert!(serde_json::from_value::<AdminRoleProps>(json).is_err());
    }
}
