use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::roadmap::{RoadmapFilter, RoadmapItem, RoadmapSort, UpvoteOutcome},
};

pub async fn list_items(pool: &PgPool, filter: RoadmapFilter) -> Result<Vec<RoadmapItem>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "roadmap.list_items",
        sqlx::query_as::<_, RoadmapItem>(
            r#"
            SELECT
                id,
                title,
                description,
                category,
                status,
                upvotes,
                comment_ids,
                created_at
            FROM roadmap.item
            WHERE ($1::roadmap.item_category IS NULL OR category = $1)
            AND ($2::roadmap.item_status IS NULL OR status = $2)
            ORDER BY
                CASE WHEN $3 THEN cardinality(upvotes) ELSE 0 END DESC,
                created_at DESC,
                id DESC
            "#,
        )
        .bind(filter.category)
        .bind(filter.status)
        .bind(filter.sort == RoadmapSort::Upvotes)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn find_item(pool: &PgPool, item_id: Uuid) -> Result<Option<RoadmapItem>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "roadmap.find_item",
        sqlx::query_as::<_, RoadmapItem>(
            r#"
            SELECT
                id,
                title,
                description,
                category,
                status,
                upvotes,
                comment_ids,
                created_at
            FROM roadmap.item
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

pub async fn item_exists(pool: &PgPool, item_id: Uuid) -> Result<bool, AppError> {
    let exists = crate::log_query_fetch_one!(
        "roadmap.item_exists",
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM roadmap.item WHERE id = $1)
            "#,
        )
        .bind(item_id)
        .fetch_one(pool)
    )?;

    Ok(exists)
}

pub async fn insert_items(pool: &PgPool, items: &[RoadmapItem]) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    for item in items {
        crate::log_query_execute!(
            "roadmap.insert_item",
            sqlx::query(
                r#"
                INSERT INTO roadmap.item (
                    id,
                    title,
                    description,
                    category,
                    status,
                    upvotes,
                    comment_ids,
                    created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(item.category)
            .bind(item.status)
            .bind(&item.upvotes)
            .bind(&item.comment_ids)
            .bind(item.created_at)
            .execute(&mut *tx)
        )?;
    }
    tx.commit().await?;

    Ok(())
}

pub async fn toggle_upvote(
    pool: &PgPool,
    item_id: Uuid,
    user_id: Uuid,
) -> Result<Option<UpvoteOutcome>, AppError> {
    let row = crate::log_query_fetch_optional!(
        "roadmap.toggle_upvote",
        sqlx::query_as::<_, UpvoteOutcome>(
            r#"
            UPDATE roadmap.item
            SET upvotes = CASE
                WHEN $2 = ANY(upvotes) THEN array_remove(upvotes, $2)
                ELSE array_append(upvotes, $2)
            END
            WHERE id = $1
            RETURNING
                cardinality(upvotes) AS upvotes,
                ($2 = ANY(upvotes)) AS upvoted
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(pool)
    )?;

    Ok(row)
}

pub async fn append_comment_id(
    pool: &PgPool,
    item_id: Uuid,
    comment_id: Uuid,
) -> Result<bool, AppError> {
    let result = crate::log_query_execute!(
        "roadmap.append_comment_id",
        sqlx::query(
            r#"
            UPDATE roadmap.item
            SET comment_ids = array_append(comment_ids, $2)
            WHERE id = $1
            AND NOT ($2 = ANY(comment_ids))
            "#,
        )
        .bind(item_id)
        .bind(comment_id)
        .execute(pool)
    )?;

    if result.rows_affected() > 0 {
        return Ok(true);
    }

    item_exists(pool, item_id).await
}

pub async fn remove_comment_id(
    pool: &PgPool,
    item_id: Uuid,
    comment_id: Uuid,
) -> Result<(), AppError> {
    crate::log_query_execute!(
        "roadmap.remove_comment_id",
        sqlx::query(
            r#"
            UPDATE roadmap.item
            SET comment_ids = array_remove(comment_ids, $2)
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .bind(comment_id)
        .execute(pool)
    )?;

    Ok(())
}
