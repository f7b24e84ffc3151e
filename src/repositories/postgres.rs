use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        comments::Comment,
        roadmap::{RoadmapFilter, RoadmapItem, UpvoteOutcome},
        users::User,
    },
    repositories::{
        CommentStore, RoadmapItemStore, UserStore, comments as comment_repo,
        roadmap as roadmap_repo, users as user_repo,
    },
};

/// PostgreSQL backend; each method is one statement against the pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>, AppError> {
        comment_repo::find_comment(&self.pool, comment_id).await
    }

    async fn list_comments_for_item(&self, item_id: Uuid) -> Result<Vec<Comment>, AppError> {
        comment_repo::list_comments_for_item(&self.pool, item_id).await
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        comment_repo::insert_comment(&self.pool, comment).await
    }

    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>, AppError> {
        comment_repo::update_comment_content(&self.pool, comment_id, content, updated_at).await
    }

    async fn append_reply_id(&self, parent_id: Uuid, reply_id: Uuid) -> Result<bool, AppError> {
        comment_repo::append_reply_id(&self.pool, parent_id, reply_id).await
    }

    async fn remove_reply_id(&self, parent_id: Uuid, reply_id: Uuid) -> Result<(), AppError> {
        comment_repo::remove_reply_id(&self.pool, parent_id, reply_id).await
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<Option<Comment>, AppError> {
        comment_repo::delete_comment(&self.pool, comment_id).await
    }
}

#[async_trait]
impl RoadmapItemStore for PgStore {
    async fn list_items(&self, filter: RoadmapFilter) -> Result<Vec<RoadmapItem>, AppError> {
        roadmap_repo::list_items(&self.pool, filter).await
    }

    async fn find_item(&self, item_id: Uuid) -> Result<Option<RoadmapItem>, AppError> {
        roadmap_repo::find_item(&self.pool, item_id).await
    }

    async fn item_exists(&self, item_id: Uuid) -> Result<bool, AppError> {
        roadmap_repo::item_exists(&self.pool, item_id).await
    }

    async fn insert_items(&self, items: &[RoadmapItem]) -> Result<(), AppError> {
        roadmap_repo::insert_items(&self.pool, items).await
    }

    async fn toggle_upvote(
        &self,
        item_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UpvoteOutcome>, AppError> {
        roadmap_repo::toggle_upvote(&self.pool, item_id, user_id).await
    }

    async fn append_comment_id(&self, item_id: Uuid, comment_id: Uuid) -> Result<bool, AppError> {
        roadmap_repo::append_comment_id(&self.pool, item_id, comment_id).await
    }

    async fn remove_comment_id(&self, item_id: Uuid, comment_id: Uuid) -> Result<(), AppError> {
        roadmap_repo::remove_comment_id(&self.pool, item_id, comment_id).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        user_repo::insert_user(&self.pool, user).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        user_repo::find_user_by_email(&self.pool, email).await
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        user_repo::find_user_by_id(&self.pool, user_id).await
    }
}
