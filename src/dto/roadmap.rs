use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::roadmap::{
    RoadmapCategory, RoadmapFilter, RoadmapItem, RoadmapSort, RoadmapStatus, UpvoteOutcome,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListRoadmapQuery {
    pub category: Option<RoadmapCategory>,
    pub status: Option<RoadmapStatus>,
    pub sort: Option<RoadmapSort>,
}

impl From<ListRoadmapQuery> for RoadmapFilter {
    fn from(query: ListRoadmapQuery) -> Self {
        Self {
            category: query.category,
            status: query.status,
            sort: query.sort.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoadmapItemResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: RoadmapCategory,
    pub status: RoadmapStatus,
    pub upvotes: Vec<Uuid>,
    pub upvote_count: usize,
    pub comment_ids: Vec<Uuid>,
    pub comment_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<RoadmapItem> for RoadmapItemResponse {
    fn from(item: RoadmapItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            category: item.category,
            status: item.status,
            upvote_count: item.upvotes.len(),
            upvotes: item.upvotes,
            comment_count: item.comment_ids.len(),
            comment_ids: item.comment_ids,
            created_at: item.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpvoteResponse {
    pub upvotes: i32,
    pub upvoted: bool,
}

impl From<UpvoteOutcome> for UpvoteResponse {
    fn from(outcome: UpvoteOutcome) -> Self {
        Self {
            upvotes: outcome.upvotes,
            upvoted: outcome.upvoted,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportRoadmapItem {
    pub title: String,
    pub description: String,
    pub category: RoadmapCategory,
    pub status: Option<RoadmapStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ImportRoadmapRequest {
    #[serde(rename = "roadmapItems")]
    pub roadmap_items: Vec<ImportRoadmapItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportRoadmapResponse {
    pub message: String,
    pub inserted: usize,
    pub item_ids: Vec<Uuid>,
}
