use axum::extract::{
    FromRequest, FromRequestParts, Request,
    rejection::{JsonRejection, QueryRejection},
};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A wrapper around `axum::Json<T>` that rejects with the error envelope instead of
/// Axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    tracing::warn!(error = %rejection, "request body rejected");
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "请求头Content-Type必须为application/json。",
        _ => "请求体格式无效。",
    };
    AppError::field("body", message)
}

/// Query-string counterpart of `JsonBody`.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(query_rejection(rejection)),
        }
    }
}

fn query_rejection(rejection: QueryRejection) -> AppError {
    tracing::warn!(error = %rejection, "query string rejected");
    AppError::field("query", "查询参数格式无效。")
}

/// A numeric `{id}` path segment. A non-numeric segment is rejected with the error envelope.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub i64);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<i64>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(id)) => Ok(PathId(id)),
            Err(rejection) => {
                tracing::warn!(error = %rejection, "path id rejected");
                Err(AppError::field("id", "ID必须是整数。"))
            }
        }
    }
}
