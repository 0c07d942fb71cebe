//! First-run provisioning

use anyhow::{Result, bail};
use taskgate_db::{Database, NewUser, UserRole};
use tracing::info;

use crate::config::BootstrapConfig;

/// Create the initial admin account when the users table is empty.
///
/// Returns `true` if an account was created.
pub async fn ensure_admin(db: &Database, bootstrap: &BootstrapConfig) -> Result<bool> {
    if db.has_users().await? {
        return Ok(false);
    }

    let Some(password) = bootstrap.admin_password.as_deref() else {
        bail!(
            "no users exist; set bootstrap.admin_password or TASKGATE_ADMIN_PASSWORD to create the initial admin"
        );
    };
    if password.is_empty() {
        bail!("bootstrap.admin_password must not be empty");
    }

    info!("Creating initial admin user: {}", bootstrap.admin_username);
    let password_hash = taskgate_auth::hash_password(password)?;
    let admin = db
        .insert_user(NewUser {
            username: bootstrap.admin_username.clone(),
            password_hash,
            role_id: UserRole::Admin.id(),
        })
        .await?;

    db.set_preference(admin.id, "theme", "light").await?;

    info!("Initial admin user created (id: {})", admin.id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}/bootstrap.db", dir.path().display());
        let db = Database::new(&url).await.unwrap();
        (dir, db)
    }

    fn bootstrap(password: Option<&str>) -> BootstrapConfig {
        BootstrapConfig {
            admin_username: "admin".to_string(),
            admin_password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_creates_admin_once() {
        let (_dir, db) = open_db().await;

        assert!(ensure_admin(&db, &bootstrap(Some("first-run-pass"))).await.unwrap());
        assert!(!ensure_admin(&db, &bootstrap(Some("first-run-pass"))).await.unwrap());

        let admin = db.get_user_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(taskgate_auth::verify_password("first-run-pass", &admin.password_hash).unwrap());

        let theme = db.get_preference(admin.id, "theme").await.unwrap().unwrap();
        assert_eq!(theme.value, "light");
    }

    #[tokio::test]
    async fn test_missing_password_fails_on_empty_database() {
        let (_dir, db) = open_db().await;
        assert!(ensure_admin(&db, &bootstrap(None)).await.is_err());
        assert!(!db.has_users().await.unwrap());
    }

    #[tokio::test]
    async fn test_password_not_needed_once_users_exist() {
        let (_dir, db) = open_db().await;
        ensure_admin(&db, &bootstrap(Some("first-run-pass"))).await.unwrap();

        assert!(!ensure_admin(&db, &bootstrap(None)).await.unwrap());
    }
}
