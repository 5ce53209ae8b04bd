use chrono::Utc;
use course_platform::{
    models::{
        Article, ArticleRequest, Chapter, ChapterRequest, ChapterSummary, CourseRequest, Page,
        PageQuery, Role, Setting, SettingRequest, Sex, SignUpRequest, User, UserInfoRequest,
        UserRequest,
    },
    validation,
};
use serde_json::json;

// --- Serialization ---

#[test]
fn test_user_json_is_camel_case_without_password() {
    let user = User {
        id: 7,
        email: "a@example.com".to_string(),
        username: "alpha".to_string(),
        nickname: "阿尔法".to_string(),
        password: "$argon2id$secret".to_string(),
        role: Role::Admin,
        sex: Sex::Female,
        created_at: Utc::now(),
        ..User::default()
    };
    let json = serde_json::to_value(&user).unwrap();

    assert!(json.get("password").is_none());
    assert!(json.get("createdAt").is_some());
    assert!(json.get("created_at").is_none());
    assert_eq!(json["role"], "admin");
    assert_eq!(json["sex"], "female");
}

#[test]
fn test_request_payloads_accept_camel_case() {
    let req: CourseRequest = serde_json::from_value(json!({
        "categoryId": 3,
        "name": "Rust",
        "recommended": true,
    }))
    .unwrap();
    assert_eq!(req.category_id, Some(3));
    assert_eq!(req.recommended, Some(true));
    assert_eq!(req.introductory, None);

    let sign_up: SignUpRequest = serde_json::from_value(json!({
        "email": "x@example.com",
        "username": "x-user",
        "nickname": "x",
        "password": "123123",
        "role": "admin",
    }))
    .unwrap();
    let as_user = UserRequest::from(sign_up);
    assert_eq!(as_user.role, Some(Role::Ordinary));
    assert_eq!(as_user.sex, Some(Sex::Unknown));
}

#[test]
fn test_chapter_summary_omits_content() {
    let chapter = Chapter {
        id: 1,
        course_id: 2,
        title: "第一章".to_string(),
        content: Some("很长的正文".to_string()),
        rank: 1,
        ..Chapter::default()
    };
    let summary = ChapterSummary::from(&chapter);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["courseId"], 2);
    assert!(json.get("content").is_none());
}

// --- Pagination ---

#[test]
fn test_page_normalization() {
    assert_eq!(Page::new(None, None), Page { current_page: 1, page_size: 10 });
    assert_eq!(Page::new(Some(0), Some(0)), Page { current_page: 1, page_size: 10 });
    assert_eq!(Page::new(Some(-3), Some(-20)), Page { current_page: 3, page_size: 20 });
    assert_eq!(Page::new(Some(2), Some(5000)).page_size, Page::MAX_SIZE);

    // Extreme values are clamped instead of overflowing.
    let huge = Page::new(Some(i64::MAX), Some(i64::MAX));
    assert_eq!(huge.current_page, Page::MAX_PAGE);
    assert_eq!(huge.page_size, Page::MAX_SIZE);
    assert_eq!(huge.offset(), (Page::MAX_PAGE - 1) * Page::MAX_SIZE);

    let tiny = Page::new(Some(i64::MIN), Some(i64::MIN));
    assert_eq!(tiny.current_page, Page::MAX_PAGE);
    assert_eq!(tiny.page_size, Page::MAX_SIZE);
    assert!(tiny.offset() >= 0);

    let page = Page::new(Some(3), Some(20));
    assert_eq!(page.offset(), 40);
    assert_eq!(page.limit(), 20);
}

#[test]
fn test_page_query_parses_camel_case() {
    let query: PageQuery = serde_json::from_value(json!({ "currentPage": 4, "pageSize": 15 })).unwrap();
    let pagination = query.page().pagination(61);
    assert_eq!(pagination.current_page, 4);
    assert_eq!(pagination.page_size, 15);
    assert_eq!(pagination.total, 61);
}

// --- Partial updates ---

#[test]
fn test_merge_keeps_absent_fields() {
    let article = Article {
        id: 1,
        title: "旧标题".to_string(),
        content: Some("旧正文".to_string()),
        ..Article::default()
    };
    let merged = ArticleRequest {
        title: Some("新标题".to_string()),
        content: None,
    }
    .merge(&article);
    assert_eq!(merged.title.as_deref(), Some("新标题"));
    assert_eq!(merged.content.as_deref(), Some("旧正文"));

    let chapter = Chapter {
        course_id: 9,
        title: "章节".to_string(),
        rank: 4,
        ..Chapter::default()
    };
    let merged = ChapterRequest::default().merge(&chapter);
    assert_eq!(merged.course_id, Some(9));
    assert_eq!(merged.rank, Some(4));
}

#[test]
fn test_user_merge_never_carries_the_hash() {
    let user = User {
        email: "a@example.com".to_string(),
        username: "alpha".to_string(),
        nickname: "阿尔法".to_string(),
        password: "$argon2id$stored".to_string(),
        ..User::default()
    };
    let merged = UserRequest::default().merge(&user);
    assert_eq!(merged.password, None);
    assert_eq!(merged.email.as_deref(), Some("a@example.com"));

    let record = validation::user(&merged, false).unwrap();
    assert!(record.password.is_empty());
}

#[test]
fn test_user_info_merge_keeps_identity() {
    let user = User {
        email: "a@example.com".to_string(),
        username: "alpha".to_string(),
        nickname: "阿尔法".to_string(),
        role: Role::Admin,
        ..User::default()
    };
    let merged = UserInfoRequest {
        nickname: Some("贝塔".to_string()),
        ..UserInfoRequest::default()
    }
    .merge(&user);
    assert_eq!(merged.username.as_deref(), Some("alpha"));
    assert_eq!(merged.nickname.as_deref(), Some("贝塔"));
    assert_eq!(merged.role, Some(Role::Admin));
}

#[test]
fn test_setting_merge() {
    let setting = Setting {
        name: Some("长乐未央".to_string()),
        copyright: Some("© 2024".to_string()),
        ..Setting::default()
    };
    let record = SettingRequest {
        icp: Some("备案号".to_string()),
        ..SettingRequest::default()
    }
    .merge(&setting);
    assert_eq!(record.name.as_deref(), Some("长乐未央"));
    assert_eq!(record.icp.as_deref(), Some("备案号"));
    assert_eq!(record.copyright.as_deref(), Some("© 2024"));
}
