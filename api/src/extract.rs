//! Request extractors whose rejections render as `{"error": ...}` like every
//! other failure.

use crate::errors::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// `axum::Json` with malformed or incomplete bodies reported as 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
