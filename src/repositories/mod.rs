//! Storage seams for comments, roadmap items and users.
//!
//! Every method is a single-record operation: the backends guarantee atomic
//! read-modify-write on one record and nothing more. Keeping comment links
//! consistent across records is the job of the comment use cases.

use std::sync::Arc;

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
};

pub mod comments;
pub mod memory;
pub mod postgres;
pub mod roadmap;
pub mod users;

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>, AppError>;

    /// All comments of an item, oldest first.
    async fn list_comments_for_item(&self, item_id: Uuid) -> Result<Vec<Comment>, AppError>;

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError>;

    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>, AppError>;

    /// Returns `false` when the parent no longer exists.
    async fn append_reply_id(&self, parent_id: Uuid, reply_id: Uuid) -> Result<bool, AppError>;

    async fn remove_reply_id(&self, parent_id: Uuid, reply_id: Uuid) -> Result<(), AppError>;

    /// Removes the record and hands it back, or `None` if it was already gone.
    async fn delete_comment(&self, comment_id: Uuid) -> Result<Option<Comment>, AppError>;
}

#[async_trait]
pub trait RoadmapItemStore: Send + Sync {
    async fn list_items(&self, filter: RoadmapFilter) -> Result<Vec<RoadmapItem>, AppError>;

    async fn find_item(&self, item_id: Uuid) -> Result<Option<RoadmapItem>, AppError>;

    async fn item_exists(&self, item_id: Uuid) -> Result<bool, AppError>;

    async fn insert_items(&self, items: &[RoadmapItem]) -> Result<(), AppError>;

    async fn toggle_upvote(
        &self,
        item_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UpvoteOutcome>, AppError>;

    /// Returns `false` when the item no longer exists.
    async fn append_comment_id(&self, item_id: Uuid, comment_id: Uuid) -> Result<bool, AppError>;

    async fn remove_comment_id(&self, item_id: Uuid, comment_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError>;
}

#[derive(Clone)]
pub struct Store {
    pub comments: Arc<dyn CommentStore>,
    pub items: Arc<dyn RoadmapItemStore>,
    pub users: Arc<dyn UserStore>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            comments: store.clone(),
            items: store.clone(),
            users: store,
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            comments: store.clone(),
            items: store.clone(),
            users: store,
        }
    }
}
