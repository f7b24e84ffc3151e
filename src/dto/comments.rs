use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::comments::Comment;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default, alias = "parentCommentId")]
    pub parent_comment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCommentResponse {
    pub message: String,
    pub deleted_ids: Vec<Uuid>,
}

/// One comment of an assembled thread with its replies resolved in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentNode {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub roadmap_item_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub depth: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn new(comment: Comment, replies: Vec<CommentNode>) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            author_id: comment.author_id,
            roadmap_item_id: comment.roadmap_item_id,
            parent_id: comment.parent_id,
            depth: comment.depth,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            replies,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentThreadResponse {
    pub roadmap_item_id: Uuid,
    pub total: usize,
    pub data: Vec<CommentNode>,
}
