use crate::error::{AppError, Result};
use crate::model::{CountResponse, CreateUrlRequest, CreateUrlResponse, DeleteUrlResponse, GetUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use burrow_core::ShortCode;
use tracing::debug;

fn parse_code(raw: &str) -> Result<ShortCode> {
    ShortCode::new(raw).map_err(|e| {
        debug!(error = %e, "Rejected short code");
        AppError::InvalidShortCode
    })
}

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Json<CreateUrlResponse>> {
    let Json(request) = payload.map_err(|e| {
        debug!(error = %e, "Rejected create request body");
        AppError::InvalidInput
    })?;

    let link = state
        .shortener()
        .shorten(&request.original_url)
        .await
        .map_err(AppError::create)?;

    Ok(Json(CreateUrlResponse {
        id: link.id,
        short_url: state.short_url(&link.short_code),
        original_url: link.original_url,
    }))
}

pub async fn get_url_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Json<GetUrlResponse>> {
    let code = parse_code(&short_code)?;
    let original_url = state
        .shortener()
        .resolve(&code)
        .await
        .map_err(AppError::Resolve)?;

    Ok(Json(GetUrlResponse { original_url }))
}

pub async fn count_url_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Json<CountResponse>> {
    let code = parse_code(&short_code)?;
    let count = state
        .shortener()
        .count(&code)
        .await
        .map_err(AppError::Count)?;

    Ok(Json(CountResponse {
        url: count.short_code.to_string(),
        count: count.count,
    }))
}

pub async fn delete_url_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Json<DeleteUrlResponse>> {
    let code = parse_code(&short_code)?;
    state
        .shortener()
        .delete(&code)
        .await
        .map_err(AppError::Delete)?;

    Ok(Json(DeleteUrlResponse {
        message: "Short URL deleted successfully",
    }))
}
