use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Enumerations (stored as SMALLINT) ---

/// Sex
///
/// Stored as 0/1/2 in `users.sex`. `Unknown` is the value for users who never chose.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, TS, ToSchema, Default,
)]
#[ts(export)]
#[repr(i16)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male = 0,
    Female = 1,
    #[default]
    Unknown = 2,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::Unknown];

    /// Human readable label used by the dashboard charts.
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "男性",
            Sex::Female => "女性",
            Sex::Unknown => "未选择",
        }
    }
}

/// Role
///
/// The RBAC field. Admin Auth only admits `Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema, Default,
)]
#[ts(export)]
#[repr(i16)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Ordinary = 0,
    Admin = 100,
}

/// DeletionPolicy
///
/// How a delete request is carried out for a given entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Sets `deleted_at`; the row stays in storage but disappears from default reads.
    Soft,
    /// Removes the row.
    Hard,
}

/// Entity
///
/// Per-entity metadata shared by handlers (display name for messages and deletion policy).
pub trait Entity {
    const TABLE: &'static str;
    const LABEL: &'static str;
    const DELETION: DeletionPolicy;
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A row of the `users` table. The password hash is loaded for sign-in but never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub nickname: String,
    #[serde(skip)]
    pub password: String,
    pub avatar: Option<String>,
    pub sex: Sex,
    pub company: Option<String>,
    pub introduce: Option<String>,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const LABEL: &'static str = "用户";
    const DELETION: DeletionPolicy = DeletionPolicy::Soft;
}

/// Article
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Article {
    const TABLE: &'static str = "articles";
    const LABEL: &'static str = "文章";
    const DELETION: DeletionPolicy = DeletionPolicy::Soft;
}

/// Category
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub rank: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const LABEL: &'static str = "分类";
    const DELETION: DeletionPolicy = DeletionPolicy::Hard;
}

/// Course
///
/// Owned by a `User` (`user_id`) and filed under a `Category` (`category_id`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub category_id: i64,
    pub user_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub recommended: bool,
    pub introductory: bool,
    pub content: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Course {
    const TABLE: &'static str = "courses";
    const LABEL: &'static str = "课程";
    const DELETION: DeletionPolicy = DeletionPolicy::Hard;
}

/// Chapter
///
/// Belongs to exactly one course; siblings are ordered by `rank` ASC, then `id` DESC.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub video: Option<String>,
    pub rank: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Chapter {
    const TABLE: &'static str = "chapters";
    const LABEL: &'static str = "章节";
    const DELETION: DeletionPolicy = DeletionPolicy::Hard;
}

/// Setting
///
/// Site-wide configuration. Exactly one row is expected.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i64,
    pub name: Option<String>,
    pub icp: Option<String>,
    pub copyright: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Like
///
/// Join row between a user and a course they liked. `(user_id, course_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Entity for Like {
    const TABLE: &'static str = "likes";
    const LABEL: &'static str = "点赞记录";
    const DELETION: DeletionPolicy = DeletionPolicy::Hard;
}

// --- Projections used by the public detail endpoints ---

/// ChapterSummary
///
/// A sibling chapter listed next to a chapter or course detail (content omitted).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub video: Option<String>,
    pub rank: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Chapter> for ChapterSummary {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id,
            course_id: chapter.course_id,
            title: chapter.title.clone(),
            video: chapter.video.clone(),
            rank: chapter.rank,
            created_at: chapter.created_at,
            updated_at: chapter.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CourseBrief {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

impl From<&Course> for CourseBrief {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            name: course.name.clone(),
            user_id: course.user_id,
        }
    }
}

/// UserBrief
///
/// Public view of a course owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserBrief {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub company: Option<String>,
}

impl From<&User> for UserBrief {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            avatar: user.avatar.clone(),
            company: user.company.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CategoryBrief {
    pub id: i64,
    pub name: String,
}

impl From<&Category> for CategoryBrief {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

/// ChapterDetail
///
/// Output of GET /chapters/{id}: the chapter, its course, the course owner and all siblings.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChapterDetail {
    pub chapter: Chapter,
    pub course: CourseBrief,
    pub user: UserBrief,
    pub chapters: Vec<ChapterSummary>,
}

/// CourseDetail
///
/// Output of GET /courses/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CourseDetail {
    pub course: Course,
    pub category: CategoryBrief,
    pub user: UserBrief,
    pub chapters: Vec<ChapterSummary>,
}

/// AdminCourseDetail
///
/// Output of GET /admin/courses/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminCourseDetail {
    pub course: Course,
    pub category: CategoryBrief,
    pub user: UserBrief,
}

/// AdminChapterDetail
///
/// Output of GET /admin/chapters/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminChapterDetail {
    pub chapter: Chapter,
    pub course: CourseBrief,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub recommended_courses: Vec<Course>,
    pub latest_courses: Vec<Course>,
    pub introductory_courses: Vec<Course>,
}

// --- Dashboard Schemas (Output) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SexChartEntry {
    pub value: i64,
    pub name: String,
}

/// MonthlyChart
///
/// Two parallel sequences sorted ascending by month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MonthlyChart {
    pub months: Vec<String>,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

// --- Pagination ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub current_page: i64,
    pub page_size: i64,
}

/// Page
///
/// Normalized pagination window. Out-of-range input falls back to sane defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub current_page: i64,
    pub page_size: i64,
}

impl Page {
    pub const DEFAULT_SIZE: i64 = 10;
    pub const MAX_SIZE: i64 = 100;
    /// Highest page number honored; larger requests read this page (which is empty).
    pub const MAX_PAGE: i64 = 1_000_000;

    pub fn new(current_page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            current_page: Self::normalize(current_page, 1, Self::MAX_PAGE),
            page_size: Self::normalize(page_size, Self::DEFAULT_SIZE, Self::MAX_SIZE),
        }
    }

    /// Absolute value, zero replaced by `default`, capped at `max`.
    fn normalize(value: Option<i64>, default: i64, max: i64) -> i64 {
        match value.map(i64::unsigned_abs) {
            None | Some(0) => default,
            Some(v) => i64::try_from(v).map_or(max, |v| v.min(max)),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.current_page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        Pagination {
            total,
            current_page: self.current_page,
            page_size: self.page_size,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Paged
///
/// A single page of rows plus the unpaginated total, as returned by the repository.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Paginated
///
/// The `data` of every list endpoint: one page of items and its position in the full result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(paged: Paged<T>, page: Page) -> Self {
        Self {
            items: paged.items,
            pagination: page.pagination(paged.total),
        }
    }
}

// --- Query Filters ---

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub current_page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        Page::new(self.current_page, self.page_size)
    }
}

/// ArticleFilter
///
/// `deleted = true` lists the trash (soft-deleted rows) instead of live rows.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ArticleFilter {
    pub title: Option<String>,
    pub deleted: Option<bool>,
    pub current_page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ArticleFilter {
    pub fn page(&self) -> Page {
        Page::new(self.current_page, self.page_size)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    pub email: Option<String>,
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub role: Option<Role>,
    pub current_page: Option<i64>,
    pub page_size: Option<i64>,
}

impl UserFilter {
    pub fn page(&self) -> Page {
        Page::new(self.current_page, self.page_size)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CourseFilter {
    pub category_id: Option<i64>,
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub recommended: Option<bool>,
    pub introductory: Option<bool>,
    pub current_page: Option<i64>,
    pub page_size: Option<i64>,
}

impl CourseFilter {
    pub fn page(&self) -> Page {
        Page::new(self.current_page, self.page_size)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ChapterFilter {
    pub course_id: Option<i64>,
    pub title: Option<String>,
    pub current_page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ChapterFilter {
    pub fn page(&self) -> Page {
        Page::new(self.current_page, self.page_size)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub current_page: Option<i64>,
    pub page_size: Option<i64>,
}

impl SearchQuery {
    pub fn page(&self) -> Page {
        Page::new(self.current_page, self.page_size)
    }
}

// --- Request Payloads (Input Schemas) ---
//
// Every field is optional so that create and partial update share one payload;
// validation decides which fields are required.

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ArticleRequest {
    /// Fills every absent field from the stored record.
    pub fn merge(self, current: &Article) -> Self {
        Self {
            title: self.title.or_else(|| Some(current.title.clone())),
            content: self.content.or_else(|| current.content.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
}

impl CategoryRequest {
    pub fn merge(self, current: &Category) -> Self {
        Self {
            name: self.name.or_else(|| Some(current.name.clone())),
            rank: self.rank.or(Some(current.rank)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introductory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CourseRequest {
    pub fn merge(self, current: &Course) -> Self {
        Self {
            category_id: self.category_id.or(Some(current.category_id)),
            name: self.name.or_else(|| Some(current.name.clone())),
            image: self.image.or_else(|| current.image.clone()),
            recommended: self.recommended.or(Some(current.recommended)),
            introductory: self.introductory.or(Some(current.introductory)),
            content: self.content.or_else(|| current.content.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
}

impl ChapterRequest {
    pub fn merge(self, current: &Chapter) -> Self {
        Self {
            course_id: self.course_id.or(Some(current.course_id)),
            title: self.title.or_else(|| Some(current.title.clone())),
            content: self.content.or_else(|| current.content.clone()),
            video: self.video.or_else(|| current.video.clone()),
            rank: self.rank.or(Some(current.rank)),
        }
    }
}

/// UserRequest
///
/// Admin create/update payload. On update an absent password keeps the stored hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserRequest {
    /// Merges onto the stored user. The password is left as given (absent means unchanged).
    pub fn merge(self, current: &User) -> Self {
        Self {
            email: self.email.or_else(|| Some(current.email.clone())),
            username: self.username.or_else(|| Some(current.username.clone())),
            nickname: self.nickname.or_else(|| Some(current.nickname.clone())),
            password: self.password,
            sex: self.sex.or(Some(current.sex)),
            avatar: self.avatar.or_else(|| current.avatar.clone()),
            company: self.company.or_else(|| current.company.clone()),
            introduce: self.introduce.or_else(|| current.introduce.clone()),
            role: self.role.or(Some(current.role)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub password: Option<String>,
}

impl From<SignUpRequest> for UserRequest {
    fn from(req: SignUpRequest) -> Self {
        Self {
            email: req.email,
            username: req.username,
            nickname: req.nickname,
            password: req.password,
            sex: Some(Sex::Unknown),
            role: Some(Role::Ordinary),
            ..Self::default()
        }
    }
}

/// SignInRequest
///
/// `login` accepts either the email or the username.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignInRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

/// UserInfoRequest
///
/// Profile fields a user may change on their own record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoRequest {
    pub nickname: Option<String>,
    pub sex: Option<Sex>,
    pub company: Option<String>,
    pub introduce: Option<String>,
    pub avatar: Option<String>,
}

impl UserInfoRequest {
    pub fn merge(self, current: &User) -> UserRequest {
        UserRequest {
            nickname: self.nickname,
            sex: self.sex,
            company: self.company,
            introduce: self.introduce,
            avatar: self.avatar,
            ..UserRequest::default()
        }
        .merge(current)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub current_password: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub course_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SettingRequest {
    pub name: Option<String>,
    pub icp: Option<String>,
    pub copyright: Option<String>,
}

impl SettingRequest {
    pub fn merge(self, current: &Setting) -> SettingRecord {
        SettingRecord {
            name: self.name.or_else(|| current.name.clone()),
            icp: self.icp.or_else(|| current.icp.clone()),
            copyright: self.copyright.or_else(|| current.copyright.clone()),
        }
    }
}

// --- Validated records (what the repository persists) ---

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArticleRecord {
    pub title: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryRecord {
    pub name: String,
    pub rank: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CourseRecord {
    pub category_id: i64,
    pub user_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub recommended: bool,
    pub introductory: bool,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChapterRecord {
    pub course_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub video: Option<String>,
    pub rank: i32,
}

/// UserRecord
///
/// `password` holds the argon2 hash, never the plain text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserRecord {
    pub email: String,
    pub username: String,
    pub nickname: String,
    pub password: String,
    pub sex: Sex,
    pub avatar: Option<String>,
    pub company: Option<String>,
    pub introduce: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingRecord {
    pub name: Option<String>,
    pub icp: Option<String>,
    pub copyright: Option<String>,
}
