use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Category mapping for roadmap.item_category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "roadmap.item_category")]
pub enum RoadmapCategory {
    Feature,
    Bug,
    Enhancement,
    Other,
}

/// Status mapping for roadmap.item_status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "roadmap.item_status")]
pub enum RoadmapStatus {
    #[default]
    Planned,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    Completed,
    #[serde(rename = "On Hold")]
    #[sqlx(rename = "On Hold")]
    OnHold,
}

/// Roadmap item mapped to roadmap.item.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct RoadmapItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: RoadmapCategory,
    pub status: RoadmapStatus,
    pub upvotes: Vec<Uuid>,
    pub comment_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapSort {
    #[default]
    Newest,
    Upvotes,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoadmapFilter {
    pub category: Option<RoadmapCategory>,
    pub status: Option<RoadmapStatus>,
    pub sort: RoadmapSort,
}

impl RoadmapFilter {
    pub fn matches(&self, item: &RoadmapItem) -> bool {
        self.category.is_none_or(|category| item.category == category)
            && self.status.is_none_or(|status| item.status == status)
    }
}

/// Result of toggling a user's upvote on an item.
#[derive(Debug, Clone, Copy, FromRow, PartialEq, Eq)]
pub struct UpvoteOutcome {
    pub upvotes: i32,
    pub upvoted: bool,
}
