//! Role to permission lookup

use serde::Serialize;
use taskgate_db::UserRole;

/// Capability checked by the authorization gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageUsers,
    ManageTasks,
    ManagePreferences,
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ManageUsers,
    Permission::ManageTasks,
    Permission::ManagePreferences,
];

const USER_PERMISSIONS: &[Permission] = &[Permission::ManageTasks, Permission::ManagePreferences];

/// Permission set granted by a role
pub trait RolePermissions {
    fn permissions(&self) -> &'static [Permission];

    fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl RolePermissions for UserRole {
    fn permissions(&self) -> &'static [Permission] {
        match self {
            UserRole::Admin => ADMIN_PERMISSIONS,
            UserRole::User => USER_PERMISSIONS,
        }
    }
}
