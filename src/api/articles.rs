use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};

use super::{ApiError, Querier, Result};

use crate::{
    auth::Viewer,
    content::LikeTarget,
    pagination::{PAGE_SIZE, Page, Paginator},
    state::AppState,
    storage::{Article, ArticleSummary, DBPool, LikeStatus},
};

/// 配置文章相关路由。
///
/// 路由包括：
/// - `GET /articles`：文章列表
/// - `GET /articles/{id}`：单篇文章
/// - `GET /articles/{id}/likes`：文章点赞状态
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/articles", get(article_list))
        .route("/articles/{id}", get(article))
        .route("/articles/{id}/likes", get(like_status))
}

/// 文章元信息，用于列表展示。
#[derive(Debug, Serialize)]
pub struct ArticleMeta {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub description: String,
    pub pub_date: i64,
    pub count_likes: i64,
    pub is_liked: bool,
}

impl ArticleMeta {
    fn new(article: Article, likes: LikeStatus) -> Self {
        Self {
            id: article.id,
            title: article.title,
            image: article.image,
            description: article.description,
            pub_date: article.pub_date.timestamp_millis(),
            count_likes: likes.count_likes,
            is_liked: likes.is_liked,
        }
    }
}

impl From<ArticleSummary> for ArticleMeta {
    fn from(summary: ArticleSummary) -> Self {
        ArticleMeta::new(
            summary.article,
            LikeStatus {
                count_likes: summary.count_likes,
                is_liked: summary.is_liked,
            },
        )
    }
}

/// 单篇文章，附带前后文章 id
#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    status: &'static str,
    #[serde(flatten)]
    meta: ArticleMeta,

    next_id: Option<i64>,
    previous_id: Option<i64>,
}

/// 文章列表页
#[derive(Debug, Serialize)]
pub struct ArticlePage {
    status: &'static str,
    articles: Vec<ArticleMeta>,
    page: Page,
}

impl ArticlePage {
    fn new(articles: Vec<ArticleSummary>, page: Page) -> Self {
        Self {
            status: "ok",
            articles: articles.into_iter().map(ArticleMeta::from).collect(),
            page,
        }
    }
}

/// 点赞状态
#[derive(Debug, Serialize)]
pub struct LikeStatusResponse {
    status: &'static str,
    count_likes: i64,
    is_liked: bool,
}

/// 查询参数，页码保留原始字符串以便回退到第一页或最后一页。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    page: Option<String>,
}

/// 获取文章列表。
///
/// 按发布时间倒序，每页 [`PAGE_SIZE`] 篇。
async fn article_list(
    Query(params): Query<ListParams>,
    viewer: Viewer,
    State(pool): State<DBPool>,
) -> Result<Json<ArticlePage>> {
    let count = pool.article_count().await?;
    let page = Paginator::new(count, PAGE_SIZE).page(params.page.as_deref());

    let articles = pool
        .article_list(viewer, PAGE_SIZE, page.offset(PAGE_SIZE))
        .await?;

    Ok(Json(ArticlePage::new(articles, page)))
}

/// 根据 id 获取单篇文章。
///
/// 文章不存在返回 [`ApiError::NotFound`]。
async fn article(
    Path(id): Path<i64>,
    viewer: Viewer,
    State(pool): State<DBPool>,
) -> Result<Json<ArticleDetail>> {
    let article = pool.article(id).await?.ok_or(ApiError::NotFound)?;

    let (next_id, previous_id, likes) = tokio::try_join!(
        pool.next_article_id(&article),
        pool.previous_article_id(&article),
        pool.like_status(LikeTarget::Article(id), viewer),
    )?;
    let likes = likes.ok_or(ApiError::NotFound)?;

    Ok(Json(ArticleDetail {
        status: "ok",
        meta: ArticleMeta::new(article, likes),
        next_id,
        previous_id,
    }))
}

/// 获取文章点赞数以及当前访问者是否已点赞。
async fn like_status(
    Path(id): Path<i64>,
    viewer: Viewer,
    State(pool): State<DBPool>,
) -> Result<Json<LikeStatusResponse>> {
    let likes = pool
        .like_status(LikeTarget::Article(id), viewer)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(LikeStatusResponse {
        status: "ok",
        count_likes: likes.count_likes,
        is_liked: likes.is_liked,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;

    fn summary(id: i64, is_liked: bool) -> ArticleSummary {
        ArticleSummary {
            article: Article {
                id,
                title: format!("title {id}"),
                image: "cover.png".to_string(),
                description: "desc".to_string(),
                pub_date: Local.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            },
            count_likes: 2,
            is_liked,
        }
    }

    #[test]
    fn test_article_page_shape() {
        let page = Paginator::new(1, PAGE_SIZE).page(None);
        let json = serde_json::to_value(ArticlePage::new(vec![summary(4, true)], page)).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["page"]["number"], 1);
        assert_eq!(json["articles"][0]["id"], 4);
        assert_eq!(json["articles"][0]["pub_date"], 1_700_000_000_000i64);
        assert_eq!(json["articles"][0]["is_liked"], true);
    }

    #[test]
    fn test_article_detail_is_flat() {
        let summary = summary(4, false);
        let detail = ArticleDetail {
            status: "ok",
            meta: ArticleMeta::from(summary),
            next_id: Some(5),
            previous_id: None,
        };
        let json = serde_json::to_value(detail).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["id"], 4);
        assert_eq!(json["count_likes"], 2);
        assert_eq!(json["next_id"], 5);
        assert!(json["previous_id"].is_null());
    }
}
