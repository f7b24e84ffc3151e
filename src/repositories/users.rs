use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppError, models::users::User};

pub async fn insert_user(pool: &PgPool, user: &User) -> Result<(), AppError> {
    let result = crate::log_query_execute!(
        "users.insert_user",
        sqlx::query(
            r#"
            INSERT INTO roadmap.user (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(pool)
    );

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Err(AppError::Conflict("Email already exists".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = crate::log_query_fetch_optional!(
        "users.find_user_by_email",
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM roadmap.user
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
    )?;

    Ok(user)
}

pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, AppError> {
    let user = crate::log_query_fetch_optional!(
        "users.find_user_by_id",
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM roadmap.user
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
    )?;

    Ok(user)
}
