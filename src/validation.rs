//! Input validation for request payloads.
//!
//! Each entity validator collects every field error before returning, so a client sees the
//! complete list in one response. Nothing is persisted when validation fails.

use crate::{
    error::{AppError, FieldError},
    models::{
        ArticleRecord, ArticleRequest, CategoryRecord, CategoryRequest, ChapterRecord,
        ChapterRequest, CourseRecord, CourseRequest, SettingRecord, UserRecord, UserRequest,
    },
};

/// Title/name length bounds, counted in characters.
pub const TITLE_MIN: usize = 2;
pub const TITLE_MAX: usize = 45;

pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 45;

/// Upper bound of the optional `VARCHAR(255)` columns (URLs, company, site settings).
pub const FIELD_MAX: usize = 255;

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Required text: present, not blank, length within bounds.
    fn text(&mut self, field: &str, label: &str, value: Option<&str>, min: usize, max: usize) -> String {
        let Some(value) = value else {
            self.push(field, format!("{label}必须存在。"));
            return String::new();
        };
        if value.trim().is_empty() {
            self.push(field, format!("{label}不能为空。"));
            return String::new();
        }
        let len = value.chars().count();
        if len < min || len > max {
            self.push(field, format!("{label}长度必须在{min}到{max}个字符之间。"));
        }
        value.to_string()
    }

    /// Optional text: absent is fine, present must not exceed `max` characters.
    fn optional(&mut self, field: &str, label: &str, value: Option<&String>, max: usize) -> Option<String> {
        let value = value?;
        if value.chars().count() > max {
            self.push(field, format!("{label}长度不能超过{max}个字符。"));
        }
        Some(value.clone())
    }

    fn positive(&mut self, field: &str, label: &str, value: Option<i32>) -> i32 {
        match value {
            None => {
                self.push(field, format!("{label}必须填写。"));
                0
            }
            Some(v) if v < 1 => {
                self.push(field, format!("{label}必须是正整数。"));
                v
            }
            Some(v) => v,
        }
    }

    fn id(&mut self, field: &str, label: &str, value: Option<i64>) -> i64 {
        match value {
            None => {
                self.push(field, format!("{label}必须填写。"));
                0
            }
            Some(v) => v,
        }
    }

    fn finish<T>(self, value: T) -> Result<T, AppError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

pub fn article(req: &ArticleRequest) -> Result<ArticleRecord, AppError> {
    let mut c = Checker::default();
    let title = c.text("title", "标题", req.title.as_deref(), TITLE_MIN, TITLE_MAX);
    c.finish(ArticleRecord {
        title,
        content: req.content.clone(),
    })
}

pub fn category(req: &CategoryRequest) -> Result<CategoryRecord, AppError> {
    let mut c = Checker::default();
    let name = c.text("name", "名称", req.name.as_deref(), TITLE_MIN, TITLE_MAX);
    let rank = c.positive("rank", "排序", req.rank);
    c.finish(CategoryRecord { name, rank })
}

/// Validates a course payload. `user_id` is the owner and never comes from the client.
pub fn course(req: &CourseRequest, user_id: i64) -> Result<CourseRecord, AppError> {
    let mut c = Checker::default();
    let category_id = c.id("categoryId", "分类ID", req.category_id);
    let name = c.text("name", "名称", req.name.as_deref(), TITLE_MIN, TITLE_MAX);
    let image = c.optional("image", "图片", req.image.as_ref(), FIELD_MAX);
    c.finish(CourseRecord {
        category_id,
        user_id,
        name,
        image,
        recommended: req.recommended.unwrap_or(false),
        introductory: req.introductory.unwrap_or(false),
        content: req.content.clone(),
    })
}

pub fn chapter(req: &ChapterRequest) -> Result<ChapterRecord, AppError> {
    let mut c = Checker::default();
    let course_id = c.id("courseId", "课程ID", req.course_id);
    let title = c.text("title", "标题", req.title.as_deref(), TITLE_MIN, TITLE_MAX);
    let rank = c.positive("rank", "排序", req.rank);
    let video = c.optional("video", "视频", req.video.as_ref(), FIELD_MAX);
    c.finish(ChapterRecord {
        course_id,
        title,
        content: req.content.clone(),
        video,
        rank,
    })
}

/// Validates a user payload.
///
/// The returned record carries the *plain* password (empty when absent and not required);
/// callers hash it before it reaches the repository.
pub fn user(req: &UserRequest, require_password: bool) -> Result<UserRecord, AppError> {
    let mut c = Checker::default();

    let email = match req.email.as_deref() {
        None => {
            c.push("email", "邮箱必须填写。");
            String::new()
        }
        Some(email) if !is_valid_email(email) => {
            c.push("email", "邮箱格式不正确。");
            email.to_string()
        }
        Some(email) => email.to_string(),
    };

    let username = c.text("username", "用户名", req.username.as_deref(), TITLE_MIN, TITLE_MAX);
    let nickname = c.text("nickname", "昵称", req.nickname.as_deref(), TITLE_MIN, TITLE_MAX);

    let password = match req.password.as_deref() {
        None if require_password => {
            c.push("password", "密码必须填写。");
            String::new()
        }
        None => String::new(),
        Some(password) => {
            if let Err(message) = validate_password(password) {
                c.push("password", message);
            }
            password.to_string()
        }
    };

    let avatar = c.optional("avatar", "头像", req.avatar.as_ref(), FIELD_MAX);
    let company = c.optional("company", "公司", req.company.as_ref(), FIELD_MAX);

    c.finish(UserRecord {
        email,
        username,
        nickname,
        password,
        sex: req.sex.unwrap_or_default(),
        avatar,
        company,
        introduce: req.introduce.clone(),
        role: req.role.unwrap_or_default(),
    })
}

/// Site settings are all optional; only their length is bounded.
pub fn setting(record: SettingRecord) -> Result<SettingRecord, AppError> {
    let mut c = Checker::default();
    let name = c.optional("name", "网站名称", record.name.as_ref(), FIELD_MAX);
    let icp = c.optional("icp", "备案号", record.icp.as_ref(), FIELD_MAX);
    let copyright = c.optional("copyright", "版权信息", record.copyright.as_ref(), FIELD_MAX);
    c.finish(SettingRecord {
        name,
        icp,
        copyright,
    })
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    let len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err("密码长度必须在6到45个字符之间。");
    }
    Ok(())
}

/// 验证邮箱格式：user@domain.tld
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || local.starts_with('.') || local.ends_with('.') {
        return false;
    }
    if !local
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'+' | b'-'))
    {
        return false;
    }
    if !domain.contains('.')
        || !domain
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
    {
        return false;
    }
    domain
        .split('.')
        .all(|part| !part.is_empty() && !part.starts_with('-') && !part.ends_with('-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Sex};

    fn titled(title: Option<&str>) -> ArticleRequest {
        ArticleRequest {
            title: title.map(str::to_string),
            content: None,
        }
    }

    fn messages(result: Result<impl std::fmt::Debug, AppError>) -> Vec<FieldError> {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn article_title_bounds() {
        assert!(article(&titled(Some("ab"))).is_ok());
        assert!(article(&titled(Some(&"字".repeat(45)))).is_ok());

        let too_short = messages(article(&titled(Some("a"))));
        assert_eq!(too_short[0].message, "标题长度必须在2到45个字符之间。");

        let too_long = messages(article(&titled(Some(&"x".repeat(46)))));
        assert_eq!(too_long[0].field, "title");
    }

    #[test]
    fn article_title_missing_or_blank() {
        assert_eq!(messages(article(&titled(None)))[0].message, "标题必须存在。");
        assert_eq!(messages(article(&titled(Some("   "))))[0].message, "标题不能为空。");
    }

    #[test]
    fn category_collects_all_errors() {
        let errors = messages(category(&CategoryRequest {
            name: Some(String::new()),
            rank: Some(0),
        }));
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "rank"]);
    }

    #[test]
    fn course_defaults_flags_and_keeps_owner() {
        let record = course(
            &CourseRequest {
                category_id: Some(3),
                name: Some("Rust 入门".into()),
                ..CourseRequest::default()
            },
            7,
        )
        .unwrap();
        assert_eq!(record.user_id, 7);
        assert!(!record.recommended);
        assert!(!record.introductory);
    }

    #[test]
    fn chapter_requires_course() {
        let errors = messages(chapter(&ChapterRequest {
            title: Some("第一章".into()),
            rank: Some(1),
            ..ChapterRequest::default()
        }));
        assert_eq!(errors[0].field, "courseId");
    }

    #[test]
    fn user_password_rules() {
        let req = UserRequest {
            email: Some("alice@example.com".into()),
            username: Some("alice".into()),
            nickname: Some("Alice".into()),
            ..UserRequest::default()
        };
        assert_eq!(messages(user(&req, true))[0].field, "password");

        let record = user(&req, false).unwrap();
        assert!(record.password.is_empty());
        assert_eq!(record.sex, Sex::Unknown);
        assert_eq!(record.role, Role::Ordinary);

        let short = UserRequest {
            password: Some("123".into()),
            ..req
        };
        assert_eq!(messages(user(&short, true))[0].field, "password");
    }

    #[test]
    fn url_and_profile_fields_are_bounded() {
        let long = "u".repeat(FIELD_MAX + 1);
        let errors = messages(course(
            &CourseRequest {
                category_id: Some(1),
                name: Some("Rust 入门".into()),
                image: Some(long.clone()),
                ..CourseRequest::default()
            },
            1,
        ));
        assert_eq!(errors[0].field, "image");

        let errors = messages(chapter(&ChapterRequest {
            course_id: Some(1),
            title: Some("第一章".into()),
            rank: Some(1),
            video: Some(long.clone()),
            ..ChapterRequest::default()
        }));
        assert_eq!(errors[0].field, "video");

        let errors = messages(user(
            &UserRequest {
                email: Some("alice@example.com".into()),
                username: Some("alice".into()),
                nickname: Some("Alice".into()),
                avatar: Some(long.clone()),
                company: Some(long),
                ..UserRequest::default()
            },
            false,
        ));
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["avatar", "company"]);

        let at_limit = "字".repeat(FIELD_MAX);
        assert!(
            course(
                &CourseRequest {
                    category_id: Some(1),
                    name: Some("Rust 入门".into()),
                    image: Some(at_limit),
                    ..CourseRequest::default()
                },
                1,
            )
            .is_ok()
        );
    }

    #[test]
    fn setting_lengths() {
        let ok = SettingRecord {
            name: Some("长乐未央".into()),
            icp: None,
            copyright: Some("©".into()),
        };
        assert_eq!(setting(ok.clone()).unwrap(), ok);

        let errors = messages(setting(SettingRecord {
            icp: Some("9".repeat(FIELD_MAX + 1)),
            ..ok
        }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "icp");
        assert_eq!(errors[0].message, "备案号长度不能超过255个字符。");
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@exa mple.com"));
    }
}
