//! Taskgate Authentication and Authorization
//!
//! This crate provides password hashing, JWT session tokens and the
//! middleware chain that gates protected routes by role.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;

pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use middleware::{AuthUser, auth_middleware, require_admin, require_permission};
pub use password::{hash_password, verify_credentials, verify_password};
pub use permissions::{Permission, RolePermissions};
