use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{
    Article, ArticleFilter, ArticleRecord, Category, CategoryRecord, Chapter, ChapterFilter,
    ChapterRecord, ChapterSummary, Course, CourseFilter, CourseRecord, Like, Page, Paged, Setting,
    SettingRecord, Sex, User, UserFilter, UserRecord,
};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Store failures as seen by the handlers. A unique-constraint violation is reported
/// with the client-facing field name it concerns; everything else is opaque.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("duplicate value for `{0}`")]
    Duplicate(&'static str),
    #[error(transparent)]
    Database(sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository Trait
///
/// The store-access interface. Associations are plain foreign-key fields resolved through
/// the named lookups below; soft-deleted rows are invisible to every `get_*`/`list_*`
/// unless a method says otherwise.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Articles (soft delete) ---
    /// Live articles, or the trash when `filter.deleted == Some(true)`. Newest first.
    async fn list_articles(&self, filter: &ArticleFilter, page: Page) -> RepoResult<Paged<Article>>;
    async fn get_article(&self, id: i64) -> RepoResult<Option<Article>>;
    async fn create_article(&self, record: &ArticleRecord) -> RepoResult<Article>;
    async fn update_article(&self, id: i64, record: &ArticleRecord) -> RepoResult<Option<Article>>;
    /// Returns false when the article is unknown or already deleted.
    async fn delete_article(&self, id: i64) -> RepoResult<bool>;
    /// Returns false unless the article exists *and* is in the trash.
    async fn restore_article(&self, id: i64) -> RepoResult<bool>;

    // --- Categories (hard delete) ---
    /// Ordered by rank ASC, id DESC.
    async fn list_categories(&self) -> RepoResult<Vec<Category>>;
    async fn get_category(&self, id: i64) -> RepoResult<Option<Category>>;
    async fn create_category(&self, record: &CategoryRecord) -> RepoResult<Category>;
    async fn update_category(&self, id: i64, record: &CategoryRecord) -> RepoResult<Option<Category>>;
    async fn delete_category(&self, id: i64) -> RepoResult<bool>;
    async fn count_courses_in_category(&self, category_id: i64) -> RepoResult<i64>;

    // --- Users (soft delete) ---
    async fn list_users(&self, filter: &UserFilter, page: Page) -> RepoResult<Paged<User>>;
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>>;
    /// Looks a live user up by email or username.
    async fn find_user_by_login(&self, login: &str) -> RepoResult<Option<User>>;
    async fn create_user(&self, record: &UserRecord) -> RepoResult<User>;
    async fn update_user(&self, id: i64, record: &UserRecord) -> RepoResult<Option<User>>;
    async fn delete_user(&self, id: i64) -> RepoResult<bool>;
    async fn count_courses_owned_by(&self, user_id: i64) -> RepoResult<i64>;
    /// Live users grouped by sex. Buckets with no users may be absent.
    async fn count_users_by_sex(&self) -> RepoResult<Vec<(Sex, i64)>>;
    /// Live users grouped by signup month (`YYYY-MM`), ascending.
    async fn count_users_by_month(&self) -> RepoResult<Vec<(String, i64)>>;

    // --- Courses (hard delete) ---
    /// Newest first. `name` matches case-insensitively anywhere in the course name.
    async fn list_courses(&self, filter: &CourseFilter, page: Page) -> RepoResult<Paged<Course>>;
    async fn get_course(&self, id: i64) -> RepoResult<Option<Course>>;
    async fn create_course(&self, record: &CourseRecord) -> RepoResult<Course>;
    async fn update_course(&self, id: i64, record: &CourseRecord) -> RepoResult<Option<Course>>;
    async fn delete_course(&self, id: i64) -> RepoResult<bool>;
    async fn count_chapters_in_course(&self, course_id: i64) -> RepoResult<i64>;

    // --- Chapters (hard delete) ---
    /// Ordered by rank ASC, id DESC.
    async fn list_chapters(&self, filter: &ChapterFilter, page: Page) -> RepoResult<Paged<Chapter>>;
    /// Every chapter of a course without its content, rank ASC, id DESC.
    async fn list_course_chapters(&self, course_id: i64) -> RepoResult<Vec<ChapterSummary>>;
    async fn get_chapter(&self, id: i64) -> RepoResult<Option<Chapter>>;
    async fn create_chapter(&self, record: &ChapterRecord) -> RepoResult<Chapter>;
    async fn update_chapter(&self, id: i64, record: &ChapterRecord) -> RepoResult<Option<Chapter>>;
    async fn delete_chapter(&self, id: i64) -> RepoResult<bool>;

    // --- Likes (hard delete, always scoped by the owning user) ---
    /// Courses liked by `user_id`, most recent like first.
    async fn list_liked_courses(&self, user_id: i64, page: Page) -> RepoResult<Paged<Course>>;
    /// Returns None when the pair already exists.
    async fn create_like(&self, user_id: i64, course_id: i64) -> RepoResult<Option<Like>>;
    /// Deletes like `id` only if it belongs to `user_id`.
    async fn delete_like(&self, id: i64, user_id: i64) -> RepoResult<bool>;

    // --- Settings (singleton) ---
    async fn get_setting(&self) -> RepoResult<Option<Setting>>;
    async fn update_setting(&self, id: i64, record: &SettingRecord) -> RepoResult<Option<Setting>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
