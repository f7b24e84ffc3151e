use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::roadmap::{
        ImportRoadmapItem, ImportRoadmapRequest, ImportRoadmapResponse, ListRoadmapQuery,
        RoadmapItemResponse, UpvoteResponse,
    },
    error::AppError,
    models::roadmap::RoadmapItem,
    repositories::Store,
    telemetry::BusinessEvent,
};

pub struct RoadmapService;

const MAX_TITLE_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;
const MAX_IMPORT_ITEMS: usize = 500;

impl RoadmapService {
    pub async fn list_items(
        store: &Store,
        query: ListRoadmapQuery,
    ) -> Result<Vec<RoadmapItemResponse>, AppError> {
        let items = store.items.list_items(query.into()).await?;
        Ok(items.into_iter().map(RoadmapItemResponse::from).collect())
    }

    pub async fn get_item(store: &Store, item_id: Uuid) -> Result<RoadmapItemResponse, AppError> {
        store
            .items
            .find_item(item_id)
            .await?
            .map(RoadmapItemResponse::from)
            .ok_or(AppError::NotFound("Item not found".to_string()))
    }

    /// Adds the user's upvote, or removes it when already present.
    pub async fn toggle_upvote(
        store: &Store,
        item_id: Uuid,
        user_id: Uuid,
    ) -> Result<UpvoteResponse, AppError> {
        let outcome = store
            .items
            .toggle_upvote(item_id, user_id)
            .await?
            .ok_or(AppError::NotFound("Item not found".to_string()))?;

        BusinessEvent::RoadmapItemUpvoteToggled {
            item_id,
            user_id,
            upvoted: outcome.upvoted,
        }
        .log();

        Ok(outcome.into())
    }

    /// Validates every entry up front; nothing is stored if one is invalid.
    pub async fn import_items(
        store: &Store,
        user_id: Uuid,
        req: ImportRoadmapRequest,
    ) -> Result<ImportRoadmapResponse, AppError> {
        if req.roadmap_items.is_empty() {
            return Err(AppError::ValidationError(
                "roadmapItems must contain at least one item".to_string(),
            ));
        }
        if req.roadmap_items.len() > MAX_IMPORT_ITEMS {
            return Err(AppError::ValidationError(format!(
                "roadmapItems exceeds {MAX_IMPORT_ITEMS} items"
            )));
        }

        let items = req
            .roadmap_items
            .into_iter()
            .enumerate()
            .map(|(index, entry)| build_item(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        store.items.insert_items(&items).await?;

        BusinessEvent::RoadmapItemsImported {
            imported_by: user_id,
            item_count: items.len(),
        }
        .log();

        Ok(ImportRoadmapResponse {
            message: format!("Imported {} roadmap items", items.len()),
            inserted: items.len(),
            item_ids: items.iter().map(|item| item.id).collect(),
        })
    }
}

fn build_item(index: usize, entry: ImportRoadmapItem) -> Result<RoadmapItem, AppError> {
    let title = normalize_text(index, "title", &entry.title, MAX_TITLE_LENGTH)?;
    let description = normalize_text(index, "description", &entry.description, MAX_DESCRIPTION_LENGTH)?;

    Ok(RoadmapItem {
        id: Uuid::now_v7(),
        title,
        description,
        category: entry.category,
        status: entry.status.unwrap_or_default(),
        upvotes: Vec::new(),
        comment_ids: Vec::new(),
        created_at: Utc::now(),
    })
}

fn normalize_text(index: usize, field: &str, value: &str, max: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!(
            "roadmapItems[{index}].{field} is required"
        )));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "roadmapItems[{index}].{field} exceeds {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}
