//! HTTP API Request Handlers
//!
//! Thin mapping from HTTP requests onto `ListingService` calls.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::core::ListingService;
use crate::domain::model::{Listing, ListingId, ListingUpdate, NewListing};
use crate::domain::query::ListingQueryParams;
use crate::utils::error::{ErrorCategory, ListingError};

use super::types::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: ListingService,
}

/// Wraps a `ListingError` so handlers can return it with `?`.
#[derive(Debug)]
pub struct ApiError(pub ListingError);

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ListingError::MalformedRequest {
            message: rejection.body_text(),
        })
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ListingError::MalformedRequest {
            message: rejection.body_text(),
        })
    }
}

pub fn status_for(err: &ListingError) -> StatusCode {
    match err.category() {
        ErrorCategory::Conflict => StatusCode::CONFLICT,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = ErrorResponse::new(
            status.as_u16(),
            self.0.code(),
            self.0.user_friendly_message(),
        );
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.service.backend_name().to_string(),
    })
}

pub async fn create_listing(
    State(state): State<AppState>,
    payload: Result<Json<NewListing>, JsonRejection>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    let Json(candidate) = payload?;
    debug!("HTTP create request: unitName={}", candidate.unit_name);

    let id = state.service.create(candidate).await?;
    Ok((StatusCode::CREATED, Json(MutationResponse::ok(id))))
}

pub async fn search_listings(
    State(state): State<AppState>,
    params: Result<Query<ListingQueryParams>, QueryRejection>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let Query(params) = params?;
    let listings = state.service.search(&params).await?;
    Ok(Json(listings))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    let listing = state.service.get(&ListingId::from(id)).await?;
    Ok(Json(listing))
}

pub async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ListingUpdate>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    let Json(fields) = payload?;
    let id = state.service.update(&ListingId::from(id), fields).await?;
    Ok(Json(MutationResponse::ok(id)))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.service.delete(&ListingId::from(id)).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Listing has been deleted".to_string(),
    }))
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found("No such route")),
    )
}
