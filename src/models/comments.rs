use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Comment model mapped to roadmap.comment.
///
/// `depth` is 0 for top-level comments and `parent.depth + 1` for replies.
/// `reply_ids` lists direct replies in the order they were attached.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub roadmap_item_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub depth: i32,
    pub reply_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}
