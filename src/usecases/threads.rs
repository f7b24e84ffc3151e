use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    dto::comments::{CommentNode, CommentThreadResponse},
    error::AppError,
    models::comments::Comment,
    repositories::Store,
};

pub struct ThreadAssembler;

impl ThreadAssembler {
    /// Reads every comment of an item and nests replies under their parents.
    pub async fn assemble_tree(
        store: &Store,
        roadmap_item_id: Uuid,
    ) -> Result<CommentThreadResponse, AppError> {
        if !store.items.item_exists(roadmap_item_id).await? {
            return Err(AppError::NotFound("Roadmap item not found".to_string()));
        }

        let comments = store
            .comments
            .list_comments_for_item(roadmap_item_id)
            .await?;
        let data = build_forest(comments);

        Ok(CommentThreadResponse {
            roadmap_item_id,
            total: count_nodes(&data),
            data,
        })
    }
}

/// Groups flat records by parent and attaches replies recursively, oldest
/// first at every level. Records whose parent is absent are left out.
pub fn build_forest(mut comments: Vec<Comment>) -> Vec<CommentNode> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let mut children: HashMap<Option<Uuid>, Vec<Comment>> = HashMap::new();
    for comment in comments {
        children.entry(comment.parent_id).or_default().push(comment);
    }

    let roots = children.remove(&None).unwrap_or_default();
    roots
        .into_iter()
        .map(|root| attach_replies(root, &mut children))
        .collect()
}

// Recursion depth is bounded by the comment depth limit.
fn attach_replies(
    comment: Comment,
    children: &mut HashMap<Option<Uuid>, Vec<Comment>>,
) -> CommentNode {
    let replies = children
        .remove(&Some(comment.id))
        .unwrap_or_default()
        .into_iter()
        .map(|reply| attach_replies(reply, children))
        .collect();
    CommentNode::new(comment, replies)
}

fn count_nodes(nodes: &[CommentNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + count_nodes(&node.replies))
        .sum()
}
