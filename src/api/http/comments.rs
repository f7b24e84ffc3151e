use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::http::extract::{AppJson, AppPath},
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::comments::{
        CommentThreadResponse, CreateCommentRequest, DeleteCommentResponse, UpdateCommentRequest,
    },
    error::AppError,
    models::comments::Comment,
    usecases::{comments::CommentService, threads::ThreadAssembler},
};

pub async fn list_item_comments_handle(
    State(state): State<AppState>,
    AppPath(item_id): AppPath<Uuid>,
) -> Result<Json<CommentThreadResponse>, AppError> {
    let response = ThreadAssembler::assemble_tree(&state.store, item_id).await?;
    Ok(Json(response))
}

pub async fn create_item_comment_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(item_id): AppPath<Uuid>,
    AppJson(req): AppJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment =
        CommentService::create_comment(&state.store, item_id, auth_user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(comment_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    let comment =
        CommentService::edit_comment(&state.store, comment_id, auth_user.user_id, req).await?;
    Ok(Json(comment))
}

pub async fn delete_comment_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppPath(comment_id): AppPath<Uuid>,
) -> Result<Json<DeleteCommentResponse>, AppError> {
    let deleted_ids =
        CommentService::delete_comment(&state.store, comment_id, auth_user.user_id).await?;
    Ok(Json(DeleteCommentResponse {
        message: "Comment and its replies deleted".to_string(),
        deleted_ids,
    }))
}
