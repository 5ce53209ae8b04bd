use axum::{Json, http::StatusCode};
use serde::Serialize;

use crate::error::AppError;

/// ApiResponse
///
/// The success envelope: `{status:"success", message, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

/// What every handler returns: a success envelope with its status code, or an `AppError`.
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub fn success<T>(message: impl Into<String>, data: T) -> ApiResult<T> {
    reply(StatusCode::OK, message, data)
}

pub fn created<T>(message: impl Into<String>, data: T) -> ApiResult<T> {
    reply(StatusCode::CREATED, message, data)
}

fn reply<T>(status: StatusCode, message: impl Into<String>, data: T) -> ApiResult<T> {
    Ok((
        status,
        Json(ApiResponse {
            status: "success",
            message: message.into(),
            data,
        }),
    ))
}
