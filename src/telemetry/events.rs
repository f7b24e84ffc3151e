use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(tag = "event_type")]
pub enum BusinessEvent {
    UserRegistered {
        user_id: Uuid,
        email_redacted: String,
    },
    UserLoggedIn {
        user_id: Uuid,
    },
    LoginFailed {
        email_redacted: String,
        reason: String,
    },
    RoadmapItemsImported {
        imported_by: Uuid,
        item_count: usize,
    },
    RoadmapItemUpvoteToggled {
        item_id: Uuid,
        user_id: Uuid,
        upvoted: bool,
    },
    CommentCreated {
        comment_id: Uuid,
        roadmap_item_id: Uuid,
        parent_id: Option<Uuid>,
        depth: i32,
        author_id: Uuid,
    },
    CommentEdited {
        comment_id: Uuid,
        author_id: Uuid,
    },
    CommentDeleted {
        comment_id: Uuid,
        roadmap_item_id: Uuid,
        actor_id: Uuid,
        removed_count: usize,
    },
}

pub fn redact_email(email: &str) -> String {
    let trimmed = email.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return "***".to_string();
    };
    match local.chars().next() {
        Some(first_char) if !domain.is_empty() => format!("{first_char}***@{domain}"),
        _ => "***".to_string(),
    }
}

impl BusinessEvent {
    pub fn log(&self) {
        let event_json = serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
        info!(
            target: "business_events",
            event = %event_json,
            "Business event occurred"
        );
    }
}
