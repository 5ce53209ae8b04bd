//! HTTP handlers, grouped by resource.
//!
//! Public, user-scoped and admin handlers for the same resource live in one module; admin
//! handlers carry an `admin_` prefix. Every handler returns an `ApiResult` so that failures
//! always render as the error envelope.

use crate::{error::AppError, models::Entity};

pub mod articles;
pub mod auth;
pub mod categories;
pub mod chapters;
pub mod charts;
pub mod courses;
pub mod home;
pub mod likes;
pub mod settings;
pub mod users;

/// Turns a repository lookup into NotFound for entity `E` when nothing came back.
pub(crate) fn found<E: Entity>(row: Option<E>, id: i64) -> Result<E, AppError> {
    row.ok_or_else(|| AppError::not_found::<E>(id))
}

/// Turns a `false` from a repository delete into NotFound for entity `E`.
pub(crate) fn deleted<E: Entity>(removed: bool, id: i64) -> Result<(), AppError> {
    if removed {
        Ok(())
    } else {
        Err(AppError::not_found::<E>(id))
    }
}
