use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppError, models::comments::Comment};

pub async fn find_comment(pool: &PgPool, comment_id: Uuid) -> Result<Option<Comment>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "comments.find_comment",
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT
                id,
                content,
                author_id,
                roadmap_item_id,
                parent_id,
                depth,
                reply_ids,
                created_at,
                updated_at
            FROM roadmap.comment
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

pub async fn list_comments_for_item(
    pool: &PgPool,
    item_id: Uuid,
) -> Result<Vec<Comment>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "comments.list_comments_for_item",
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT
                id,
                content,
                author_id,
                roadmap_item_id,
                parent_id,
                depth,
                reply_ids,
                created_at,
                updated_at
            FROM roadmap.comment
            WHERE roadmap_item_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(item_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn insert_comment(pool: &PgPool, comment: &Comment) -> Result<(), AppError> {
    crate::log_query_execute!(
        "comments.insert_comment",
        sqlx::query(
            r#"
            INSERT INTO roadmap.comment (
                id,
                content,
                author_id,
                roadmap_item_id,
                parent_id,
                depth,
                reply_ids,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(comment.id)
        .bind(&comment.content)
        .bind(comment.author_id)
        .bind(comment.roadmap_item_id)
        .bind(comment.parent_id)
        .bind(comment.depth)
        .bind(&comment.reply_ids)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(pool)
    )?;

    Ok(())
}

pub async fn update_comment_content(
    pool: &PgPool,
    comment_id: Uuid,
    content: &str,
    updated_at: DateTime<Utc>,
) -> Result<Option<Comment>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "comments.update_comment_content",
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE roadmap.comment
            SET content = $2,
                updated_at = $3
            WHERE id = $1
            RETURNING
                id,
                content,
                author_id,
                roadmap_item_id,
                parent_id,
                depth,
                reply_ids,
                created_at,
                updated_at
            "#,
        )
        .bind(comment_id)
        .bind(content)
        .bind(updated_at)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

pub async fn append_reply_id(
    pool: &PgPool,
    parent_id: Uuid,
    reply_id: Uuid,
) -> Result<bool, AppError> {
    let result = crate::log_query_execute!(
        "comments.append_reply_id",
        sqlx::query(
            r#"
            UPDATE roadmap.comment
            SET reply_ids = array_append(reply_ids, $2)
            WHERE id = $1
            AND NOT ($2 = ANY(reply_ids))
            "#,
        )
        .bind(parent_id)
        .bind(reply_id)
        .execute(pool)
    )?;

    if result.rows_affected() > 0 {
        return Ok(true);
    }

    // Zero rows also means the id was already linked.
    Ok(find_comment(pool, parent_id).await?.is_some())
}

pub async fn remove_reply_id(pool: &PgPool, parent_id: Uuid, reply_id: Uuid) -> Result<(), AppError> {
    crate::log_query_execute!(
        "comments.remove_reply_id",
        sqlx::query(
            r#"
            UPDATE roadmap.comment
            SET reply_ids = array_remove(reply_ids, $2)
            WHERE id = $1
            "#,
        )
        .bind(parent_id)
        .bind(reply_id)
        .execute(pool)
    )?;

    Ok(())
}

pub async fn delete_comment(pool: &PgPool, comment_id: Uuid) -> Result<Option<Comment>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "comments.delete_comment",
        sqlx::query_as::<_, Comment>(
            r#"
            DELETE FROM roadmap.comment
            WHERE id = $1
            RETURNING
                id,
                content,
                author_id,
                roadmap_item_id,
                parent_id,
                depth,
                reply_ids,
                created_at,
                updated_at
            "#,
        )
        .bind(comment_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}
