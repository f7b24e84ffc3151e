use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::http::extract::{AppJson, AppPath, AppQuery},
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::roadmap::{
        ImportRoadmapRequest, ImportRoadmapResponse, ListRoadmapQuery, RoadmapItemResponse,
        UpvoteResponse,
    },
    error::AppError,
    usecases::roadmap::RoadmapService,
};

pub async fn list_roadmap_handle(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListRoadmapQuery>,
) -> Result<Json<Vec<RoadmapItemResponse>>, AppError> {
    let items = RoadmapService::list_items(&state.store, query).await?;
    Ok(Json(items))
}

pub async fn get_roadmap_item_handle(
    State(state): State<AppState>,
    AppPath(item_id): AppPath<Uuid>,
) -> Result<Json<RoadmapItemResponse>, AppError> {
    let item = RoadmapService::get_item(&state.store, item_id).await?;
    Ok(Json(item))
}

pub async fn upvote_roadmap_item_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(item_id): AppPath<Uuid>,
) -> Result<Json<UpvoteResponse>, AppError> {
    let response = RoadmapService::toggle_upvote(&state.store, item_id, auth_user.user_id).await?;
    Ok(Json(response))
}

pub async fn import_roadmap_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(req): AppJson<ImportRoadmapRequest>,
) -> Result<(StatusCode, Json<ImportRoadmapResponse>), AppError> {
    let response = RoadmapService::import_items(&state.store, auth_user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
