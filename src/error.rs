use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{models::Entity, repository::RepoError};

/// Message shown to clients in place of any internal fault detail.
pub const INTERNAL_MESSAGE: &str = "服务器错误，请联系管理员。";

/// FieldError
///
/// One entry of a validation failure: which input field, and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// AppError
///
/// The error taxonomy every handler and guard terminates with. Converted into the
/// failure envelope by `IntoResponse`.
#[derive(Debug, Error)]
pub enum AppError {
    /// 400: one or more input fields violate entity invariants.
    #[error("请求参数错误。")]
    Validation(Vec<FieldError>),
    /// 401: missing, malformed, invalid or expired credential.
    #[error("{0}")]
    Unauthorized(String),
    /// 403: valid credential, insufficient role.
    #[error("{0}")]
    Forbidden(String),
    /// 404: the id does not resolve to a live entity.
    #[error("{0}")]
    NotFound(String),
    /// 500: broken referential integrity or an unexpected store failure.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// NotFound for entity `E`, with the id embedded in the message.
    pub fn not_found<E: Entity>(id: i64) -> Self {
        AppError::NotFound(format!("ID: {}的{}未找到。", id, E::LABEL))
    }

    /// A validation failure carrying a single field error.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        AppError::Internal(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ErrorBody
///
/// The failure envelope: `{status:"error", message, errors?}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => {
                tracing::debug!(?errors, "validation failed");
                ErrorBody {
                    status: "error".to_string(),
                    message: "请求参数错误。".to_string(),
                    errors: Some(errors),
                }
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal fault");
                ErrorBody {
                    status: "error".to_string(),
                    message: INTERNAL_MESSAGE.to_string(),
                    errors: None,
                }
            }
            AppError::Unauthorized(message)
            | AppError::Forbidden(message)
            | AppError::NotFound(message) => {
                tracing::warn!(%status, %message, "request rejected");
                ErrorBody {
                    status: "error".to_string(),
                    message,
                    errors: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Duplicate(field) => AppError::field(field, duplicate_message(field)),
            RepoError::Database(e) => AppError::Internal(format!("database error: {e}")),
        }
    }
}

fn duplicate_message(field: &str) -> &'static str {
    match field {
        "email" => "邮箱已被注册，请直接登录。",
        "username" => "用户名已经存在。",
        "name" => "名称已经存在，请选择其他名称。",
        "courseId" => "您已经赞过该课程。",
        _ => "该值已经存在。",
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::models::Chapter;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let resp = error.into_response();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn internal_detail_is_redacted() {
        let (status, json) = body_json(AppError::internal("relation \"users\" does not exist")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], INTERNAL_MESSAGE);
        assert!(!json.to_string().contains("relation"));
    }

    #[tokio::test]
    async fn validation_lists_every_field() {
        let error = AppError::Validation(vec![
            FieldError::new("title", "标题不能为空。"),
            FieldError::new("rank", "排序必须是正整数。"),
        ]);
        let (status, json) = body_json(error).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
        assert_eq!(json["errors"][0]["field"], "title");
    }

    #[tokio::test]
    async fn not_found_embeds_the_id() {
        let (status, json) = body_json(AppError::not_found::<Chapter>(42)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "ID: 42的章节未找到。");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn duplicate_maps_to_validation() {
        let error = AppError::from(RepoError::Duplicate("username"));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }
}
