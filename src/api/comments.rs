use std::collections::BTreeMap;

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
    Querier, Result, Writer,
    response::{Ack, Outcome, RequestKind, respond},
};

use crate::{
    auth::Viewer,
    content::LikeTarget,
    form::{FieldErrors, INVALID_CHOICE, form_or_default, object_id, parse_id, required, validate},
    state::AppState,
    storage::{CommentRow, DBPool},
};

/// 配置评论相关路由。
///
/// - `GET /articles/{id}/comments`：文章评论列表
/// - `POST /comments/new`：发表评论（仅 API 请求）
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/articles/{id}/comments", get(comment_list))
        .route("/comments/new", post(comment_create))
}

/// 评论展示字段
#[derive(Debug, Serialize)]
pub struct CommentItem {
    id: i64,
    body: String,
    author: String,
    pub_date: i64,
    count_likes: i64,
    is_liked: bool,
}

impl From<CommentRow> for CommentItem {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            body: row.body,
            author: row.author,
            pub_date: row.pub_date.timestamp_millis(),
            count_likes: row.count_likes,
            is_liked: row.is_liked,
        }
    }
}

/// 评论列表，`comments` 以位置序号为键
#[derive(Debug, Serialize)]
pub struct CommentList {
    status: &'static str,
    comments: BTreeMap<usize, CommentItem>,
    comments_count: usize,
}

impl CommentList {
    fn new(rows: Vec<CommentRow>) -> Self {
        let comments: BTreeMap<_, _> = rows
            .into_iter()
            .map(CommentItem::from)
            .enumerate()
            .collect();

        Self {
            status: "ok",
            comments_count: comments.len(),
            comments,
        }
    }
}

/// 获取文章的全部评论。
///
/// 文章不存在时返回空列表。
async fn comment_list(
    Path(article_id): Path<i64>,
    viewer: Viewer,
    State(pool): State<DBPool>,
) -> Result<Json<CommentList>> {
    let rows = pool.comments(article_id, viewer).await?;
    Ok(Json(CommentList::new(rows)))
}

/// 评论表单：`article`、`body`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[garde(custom(object_id))]
    pub article: String,
    #[garde(custom(required))]
    pub body: String,
}

impl CommentForm {
    /// 校验通过后 `article` 总能解析为整数
    pub fn article_id(&self) -> Option<i64> {
        parse_id(&self.article)
    }

    pub fn body(&self) -> &str {
        self.body.trim()
    }
}

/// 发表评论，作者为当前登录用户。
async fn comment_create(
    kind: RequestKind,
    viewer: Viewer,
    State(pool): State<DBPool>,
    body: std::result::Result<Form<CommentForm>, FormRejection>,
) -> Result<Json<Ack>> {
    respond(kind, submit_comment(&pool, viewer, form_or_default(body))).await
}

#[instrument(name = "comment create", skip(pool, form))]
async fn submit_comment(pool: &DBPool, viewer: Viewer, form: CommentForm) -> Result<Outcome<Ack>> {
    let user_id = viewer.require_user()?;

    if let Err(errors) = validate(&form) {
        return Ok(Err(errors));
    }

    let article_id = match form.article_id() {
        Some(id) if pool.target_exists(LikeTarget::Article(id)).await? => id,
        _ => return Ok(Err(FieldErrors::single("article", INVALID_CHOICE))),
    };

    let id = pool.create_comment(user_id, article_id, form.body()).await?;
    tracing::info!(comment = id, article = article_id, "comment created");

    Ok(Ok(Ack::ok()))
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use super::*;
    use crate::form::REQUIRED;

    fn row(id: i64, body: &str) -> CommentRow {
        CommentRow {
            id,
            body: body.to_string(),
            author: "alice".to_string(),
            pub_date: Local::now(),
            count_likes: 1,
            is_liked: false,
        }
    }

    /// 表单与查询串同为 urlencoded 编码
    fn decode(query: &str) -> CommentForm {
        let uri: axum::http::Uri = format!("/?{query}").parse().unwrap();
        axum::extract::Query::<CommentForm>::try_from_uri(&uri).unwrap().0
    }

    fn comment(article: &str, body: &str) -> CommentForm {
        CommentForm {
            article: article.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_comment_form_valid() {
        let form = comment("3", "  nice post ");
        assert!(validate(&form).is_ok());
        assert_eq!(form.article_id(), Some(3));
        assert_eq!(form.body(), "nice post");
    }

    #[test]
    fn test_comment_form_reports_every_field() {
        let errors = validate(&comment("x", "")).unwrap_err();

        assert_eq!(errors.get("article"), Some(&[INVALID_CHOICE.to_string()][..]));
        assert_eq!(errors.get("body"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_comment_form_decodes_urlencoded_body() {
        let form: CommentForm = decode("article=7&body=hello+there");
        assert_eq!(form.article_id(), Some(7));
        assert_eq!(form.body(), "hello there");

        let empty: CommentForm = decode("");
        let errors = validate(&empty).unwrap_err();
        assert!(errors.get("article").is_some() && errors.get("body").is_some());
    }

    #[test]
    fn test_empty_comment_list() {
        let json = serde_json::to_value(CommentList::new(Vec::new())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "ok", "comments": {}, "comments_count": 0 })
        );
    }

    #[test]
    fn test_comment_list_keyed_by_position() {
        let json = serde_json::to_value(CommentList::new(vec![row(9, "newer"), row(4, "older")]))
            .unwrap();

        assert_eq!(json["comments_count"], 2);
        assert_eq!(json["comments"]["0"]["id"], 9);
        assert_eq!(json["comments"]["0"]["body"], "newer");
        assert_eq!(json["comments"]["1"]["author"], "alice");
        assert_eq!(json["comments"]["1"]["count_likes"], 1);
    }
}
