//! User accounts with Argon2id password hashes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use tracing::{info, warn};
use uuid::Uuid;

use remark_core::password::{hash_password_blocking, verify_password_blocking};
use remark_core::{AuthService, Error, Result, UserSession};

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthService for PgUserRepository {
    async fn sign_up(&self, username: &str, password: &str) -> Result<UserSession> {
        let password_hash = hash_password_blocking(password).await?;
        let id = Uuid::now_v7();

        let row = sqlx::query(
            r#"
            INSERT INTO remark_user (id, username, password_hash, last_login_at)
            VALUES ($1, $2, $3, now())
            RETURNING last_login_at
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return Error::UsernameTaken(username.to_string());
                }
            }
            Error::from(e)
        })?;

        let logged_in_at: DateTime<Utc> = row.try_get("last_login_at")?;
        info!(
            subsystem = "db",
            component = "users",
            op = "sign_up",
            username = %username,
            "User registered"
        );
        Ok(UserSession {
            user_id: id.to_string(),
            username: username.to_string(),
            logged_in_at,
        })
    }

    async fn log_in(&self, username: &str, password: &str) -> Result<UserSession> {
        let row = sqlx::query("SELECT id, password_hash FROM remark_user WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            warn!(
                subsystem = "db",
                component = "users",
                op = "log_in",
                username = %username,
                "Login for unknown user"
            );
            return Err(Error::InvalidCredentials);
        };

        let id: Uuid = row.try_get("id")?;
        let stored: String = row.try_get("password_hash")?;
        if !verify_password_blocking(password, &stored).await? {
            warn!(
                subsystem = "db",
                component = "users",
                op = "log_in",
                username = %username,
                "Password mismatch"
            );
            return Err(Error::InvalidCredentials);
        }

        let logged_in_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE remark_user SET last_login_at = now() WHERE id = $1 RETURNING last_login_at",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        info!(
            subsystem = "db",
            component = "users",
            op = "log_in",
            username = %username,
            "User logged in"
        );
        Ok(UserSession {
            user_id: id.to_string(),
            username: username.to_string(),
            logged_in_at,
        })
    }

    async fn log_out(&self, session: &UserSession) -> Result<()> {
        // Sessions are client-side only; nothing to revoke.
        info!(
            subsystem = "db",
            component = "users",
            op = "log_out",
            username = %session.username,
            "User logged out"
        );
        Ok(())
    }
}
