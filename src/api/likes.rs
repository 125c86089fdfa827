use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::routing::post;
use axum::{Form, Json, Router};
use garde::Validate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
    Querier, Result, Writer,
    response::{Outcome, RequestKind, respond},
};

use crate::{
    auth::Viewer,
    content::LikeTarget,
    form::{FieldErrors, INVALID_CHOICE, form_or_default, object_id, parse_id, validate},
    state::AppState,
    storage::DBPool,
};

/// 配置点赞路由，两个入口共用同一个切换逻辑。
///
/// - `POST /likes/article`：表单字段 `article`
/// - `POST /likes/comment`：表单字段 `comment`
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/likes/article", post(toggle_route::<ArticleLikeForm>))
        .route("/likes/comment", post(toggle_route::<CommentLikeForm>))
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ToggleAck {
    status: &'static str,
    is_liked: bool,
}

/// 可点赞对象的表单
pub trait TargetForm: Validate<Context = ()> + Default + DeserializeOwned + Send + 'static {
    /// 校验通过后调用
    fn target(&self) -> Option<LikeTarget>;
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ArticleLikeForm {
    #[garde(custom(object_id))]
    pub article: String,
}

impl TargetForm for ArticleLikeForm {
    fn target(&self) -> Option<LikeTarget> {
        parse_id(&self.article).map(LikeTarget::Article)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CommentLikeForm {
    #[garde(custom(object_id))]
    pub comment: String,
}

impl TargetForm for CommentLikeForm {
    fn target(&self) -> Option<LikeTarget> {
        parse_id(&self.comment).map(LikeTarget::Comment)
    }
}

async fn toggle_route<F: TargetForm>(
    kind: RequestKind,
    viewer: Viewer,
    State(pool): State<DBPool>,
    body: std::result::Result<Form<F>, FormRejection>,
) -> Result<Json<ToggleAck>> {
    respond(kind, toggle(&pool, viewer, form_or_default(body))).await
}

#[instrument(name = "like toggle", skip(pool, form))]
async fn toggle<F: TargetForm>(pool: &DBPool, viewer: Viewer, form: F) -> Result<Outcome<ToggleAck>> {
    let user_id = viewer.require_user()?;

    if let Err(errors) = validate(&form) {
        return Ok(Err(errors));
    }

    let target = match form.target() {
        Some(target) if pool.target_exists(target).await? => target,
        Some(target) => return Ok(Err(FieldErrors::single(target.field(), INVALID_CHOICE))),
        None => return Ok(Err(FieldErrors::single(FieldErrors::NON_FIELD, INVALID_CHOICE))),
    };

    let state = pool.toggle_like(user_id, target).await?;
    tracing::debug!(?target, ?state, "like toggled");

    Ok(Ok(ToggleAck {
        status: "ok",
        is_liked: state.is_liked(),
    }))
}
