use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::http::extract::AppJson,
    app::state::AppState,
    dto::auth::{AuthResponse, LoginRequest, SignupRequest},
    error::AppError,
    usecases::auth::UserServices,
};

pub async fn signup_handle(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = UserServices::signup(&state.store, &state.jwt_config, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login_handle(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = UserServices::login(&state.store, &state.jwt_config, req).await?;
    Ok(Json(response))
}
