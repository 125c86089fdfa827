use chrono::{DateTime, Local};

/// 文章
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub description: String,
    pub pub_date: DateTime<Local>,
}

/// 文章列表项
///
/// 附带点赞总数以及当前访问者是否已点赞。
#[derive(Debug, sqlx::FromRow)]
pub struct ArticleSummary {
    #[sqlx(flatten)]
    pub article: Article,
    pub count_likes: i64,
    pub is_liked: bool,
}

/// 评论，作者为用户名
#[derive(Debug, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub body: String,
    pub author: String,
    pub pub_date: DateTime<Local>,
    pub count_likes: i64,
    pub is_liked: bool,
}

/// 点赞统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct LikeStatus {
    pub count_likes: i64,
    pub is_liked: bool,
}

/// 用户凭据
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}
