use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::comments::{CreateCommentRequest, UpdateCommentRequest},
    error::AppError,
    models::comments::Comment,
    repositories::Store,
    telemetry::BusinessEvent,
};

pub struct CommentService;

const MIN_COMMENT_LENGTH: usize = 1;
const MAX_COMMENT_LENGTH: usize = 300;
pub const MAX_COMMENT_DEPTH: i32 = 3;

impl CommentService {
    /// Creates a top-level comment or a reply.
    ///
    /// Writes happen in a fixed order: the record, then the item's
    /// `comment_ids`, then the parent's `reply_ids`. The reply only becomes
    /// reachable from its parent once the item link exists, so a cascade that
    /// finds it also removes that link. When the parent or the item disappears
    /// before its link is written, or the record is gone once linking ends,
    /// the earlier writes are undone and the call fails with `NotFound`.
    pub async fn create_comment(
        store: &Store,
        roadmap_item_id: Uuid,
        author_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<Comment, AppError> {
        let content = normalize_comment_content(&req.content)?;

        if !store.items.item_exists(roadmap_item_id).await? {
            return Err(AppError::NotFound("Roadmap item not found".to_string()));
        }

        let depth = match req.parent_comment_id {
            None => 0,
            Some(parent_id) => {
                let parent = store
                    .comments
                    .find_comment(parent_id)
                    .await?
                    .ok_or(AppError::NotFound("Parent comment not found".to_string()))?;
                if parent.roadmap_item_id != roadmap_item_id {
                    return Err(AppError::BadRequest(
                        "Parent comment belongs to a different roadmap item".to_string(),
                    ));
                }
                reply_depth(parent.depth)?
            }
        };

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::now_v7(),
            content,
            author_id,
            roadmap_item_id,
            parent_id: req.parent_comment_id,
            depth,
            reply_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        store.comments.insert_comment(&comment).await?;
        if let Err(err) = link_comment(store, &comment).await {
            discard_comment(store, &comment).await;
            return Err(err);
        }
        // A cascade on the parent may have removed the reply right after it
        // was linked.
        if store.comments.find_comment(comment.id).await?.is_none() {
            discard_comment(store, &comment).await;
            return Err(AppError::NotFound("Parent comment not found".to_string()));
        }

        BusinessEvent::CommentCreated {
            comment_id: comment.id,
            roadmap_item_id,
            parent_id: comment.parent_id,
            depth: comment.depth,
            author_id,
        }
        .log();

        Ok(comment)
    }

    pub async fn edit_comment(
        store: &Store,
        comment_id: Uuid,
        requester_id: Uuid,
        req: UpdateCommentRequest,
    ) -> Result<Comment, AppError> {
        let comment = find_comment(store, comment_id).await?;
        ensure_owner(&comment, requester_id)?;
        let content = normalize_comment_content(&req.content)?;

        let updated = store
            .comments
            .update_comment_content(comment_id, &content, Utc::now())
            .await?
            .ok_or(AppError::NotFound("Comment not found".to_string()))?;

        BusinessEvent::CommentEdited {
            comment_id,
            author_id: requester_id,
        }
        .log();

        Ok(updated)
    }

    /// Deletes a comment and every reply beneath it. Returns the ids this call
    /// removed; records already gone are skipped rather than reported.
    pub async fn delete_comment(
        store: &Store,
        comment_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError> {
        let comment = find_comment(store, comment_id).await?;
        ensure_owner(&comment, requester_id)?;

        let deleted_ids = cascade_delete(store, &comment).await?;

        BusinessEvent::CommentDeleted {
            comment_id,
            roadmap_item_id: comment.roadmap_item_id,
            actor_id: requester_id,
            removed_count: deleted_ids.len(),
        }
        .log();

        Ok(deleted_ids)
    }
}

enum Visit {
    Enter { comment_id: Uuid, parent_id: Option<Uuid> },
    Exit { comment_id: Uuid, parent_id: Option<Uuid> },
}

/// Post-order removal driven by an explicit stack: a node's record is removed
/// only after all of its replies are gone, so no stored `parent_id` ever
/// points at a missing comment. Re-running on a half-deleted subtree finishes
/// the job.
async fn cascade_delete(store: &Store, root: &Comment) -> Result<Vec<Uuid>, AppError> {
    let item_id = root.roadmap_item_id;
    let mut deleted_ids = Vec::new();
    let mut stack = vec![Visit::Enter {
        comment_id: root.id,
        parent_id: root.parent_id,
    }];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter {
                comment_id,
                parent_id,
            } => match store.comments.find_comment(comment_id).await? {
                Some(comment) => {
                    stack.push(Visit::Exit {
                        comment_id,
                        parent_id,
                    });
                    push_replies(&mut stack, &comment);
                }
                None => unlink_comment(store, item_id, comment_id, parent_id).await?,
            },
            Visit::Exit {
                comment_id,
                parent_id,
            } => {
                if let Some(removed) = store.comments.delete_comment(comment_id).await? {
                    deleted_ids.push(comment_id);
                    // Replies attached after this node was entered.
                    push_replies(&mut stack, &removed);
                }
                unlink_comment(store, item_id, comment_id, parent_id).await?;
            }
        }
    }

    Ok(deleted_ids)
}

fn push_replies(stack: &mut Vec<Visit>, comment: &Comment) {
    stack.extend(comment.reply_ids.iter().rev().map(|reply_id| Visit::Enter {
        comment_id: *reply_id,
        parent_id: Some(comment.id),
    }));
}

async fn unlink_comment(
    store: &Store,
    item_id: Uuid,
    comment_id: Uuid,
    parent_id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(parent_id) = parent_id {
        store.comments.remove_reply_id(parent_id, comment_id).await?;
    }
    store.items.remove_comment_id(item_id, comment_id).await
}

async fn link_comment(store: &Store, comment: &Comment) -> Result<(), AppError> {
    if !store
        .items
        .append_comment_id(comment.roadmap_item_id, comment.id)
        .await?
    {
        return Err(AppError::NotFound("Roadmap item not found".to_string()));
    }

    if let Some(parent_id) = comment.parent_id {
        if !store.comments.append_reply_id(parent_id, comment.id).await? {
            return Err(AppError::NotFound("Parent comment not found".to_string()));
        }
    }

    Ok(())
}

/// Best-effort undo of a partially linked comment.
async fn discard_comment(store: &Store, comment: &Comment) {
    if let Err(err) = store.comments.delete_comment(comment.id).await {
        tracing::warn!(comment_id = %comment.id, error = %err, "Failed to discard comment record");
    }
    if let Err(err) = unlink_comment(store, comment.roadmap_item_id, comment.id, comment.parent_id).await
    {
        tracing::warn!(comment_id = %comment.id, error = %err, "Failed to unlink discarded comment");
    }
}

async fn find_comment(store: &Store, comment_id: Uuid) -> Result<Comment, AppError> {
    store
        .comments
        .find_comment(comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))
}

fn ensure_owner(comment: &Comment, requester_id: Uuid) -> Result<(), AppError> {
    if !comment.is_owned_by(requester_id) {
        return Err(AppError::Forbidden(
            "Only the comment author can modify this comment".to_string(),
        ));
    }
    Ok(())
}

fn reply_depth(parent_depth: i32) -> Result<i32, AppError> {
    let depth = parent_depth + 1;
    if depth > MAX_COMMENT_DEPTH {
        return Err(AppError::DepthLimit(format!(
            "Maximum comment depth of {MAX_COMMENT_DEPTH} reached"
        )));
    }
    Ok(depth)
}

fn normalize_comment_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    let len = trimmed.chars().count();
    if len < MIN_COMMENT_LENGTH {
        return Err(AppError::ValidationError(
            "Comment content is required".to_string(),
        ));
    }
    if len > MAX_COMMENT_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Comment content exceeds {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}
