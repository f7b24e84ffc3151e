//! Extractors whose rejections go through `AppError`, so malformed bodies,
//! ids and query strings get the same JSON error shape as everything else.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query},
};

use crate::error::AppError;

#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
