/// Revoked access tokens
///
/// Logout records the token's `jti` here; the auth middleware rejects any
/// token whose id is present. Rows past their expiry can be purged since
/// the token would be rejected on `exp` anyway.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE revoked_tokens (
///     jti UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id),
///     expires_at TIMESTAMPTZ NOT NULL,
///     revoked_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct RevokedToken;

impl RevokedToken {
    /// Records a token as revoked
    ///
    /// Revoking the same token twice is a no-op.
    pub async fn revoke(
        pool: &PgPool,
        jti: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Checks whether a token id has been revoked
    pub async fn is_revoked(pool: &PgPool, jti: Uuid) -> Result<bool, sqlx::Error> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(pool)
                .await?;

        Ok(revoked)
    }

    /// Deletes revocations whose tokens have expired by `now`
    pub async fn purge_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
