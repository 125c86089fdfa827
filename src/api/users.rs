use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Form, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use garde::Validate;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::{
    Querier, Result, Writer,
    response::{Ack, Outcome, RequestKind, respond},
};

use crate::{
    auth::{self, SESSION_COOKIE},
    config::Config,
    form::{FieldErrors, form_or_default, required, validate},
    state::AppState,
    storage::DBPool,
};

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const INVALID_LOGIN: &str = "Please enter a correct username and password.";

/// 配置用户路由。
///
/// - `POST /users/register`：注册并登录
/// - `POST /users/auth`：登录
/// - `POST /users/logout`：注销当前会话
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/auth", post(login))
        .route("/users/logout", post(logout))
}

/// 登录成功响应，令牌同时写入 `sessionid` cookie
#[derive(Debug, Serialize)]
pub struct SessionAck {
    status: &'static str,
    token: Uuid,
}

/// 注册表单：`username`、`password1`、`password2`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[garde(custom(required), length(chars, max = USERNAME_MAX_LEN))]
    pub username: String,
    #[garde(custom(required), length(chars, min = PASSWORD_MIN_LEN))]
    pub password1: String,
    #[garde(custom(required), matches(password1))]
    pub password2: String,
}

impl RegisterForm {
    pub fn username(&self) -> &str {
        self.username.trim()
    }
}

/// 登录表单：`username`、`password`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AuthForm {
    #[garde(custom(required))]
    pub username: String,
    #[garde(custom(required))]
    pub password: String,
}

fn session_cookie(token: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

async fn open_session(pool: &DBPool, config: &Config, user_id: i64) -> Result<SessionAck> {
    let token = Uuid::new_v4();
    pool.create_session(user_id, token, Utc::now() + config.session_ttl())
        .await?;

    Ok(SessionAck {
        status: "ok",
        token,
    })
}

async fn register(
    kind: RequestKind,
    jar: CookieJar,
    State(pool): State<DBPool>,
    State(config): State<Arc<Config>>,
    body: std::result::Result<Form<RegisterForm>, FormRejection>,
) -> Result<(CookieJar, Json<SessionAck>)> {
    let ack = respond(kind, submit_register(&pool, &config, form_or_default(body))).await?;
    Ok((jar.add(session_cookie(ack.token)), ack))
}

#[instrument(name = "user register", skip_all)]
async fn submit_register(
    pool: &DBPool,
    config: &Config,
    form: RegisterForm,
) -> Result<Outcome<SessionAck>> {
    if let Err(errors) = validate(&form) {
        return Ok(Err(errors));
    }

    let password_hash = auth::hash_password(form.password1.clone()).await?;

    let Some(user_id) = pool.create_user(form.username(), &password_hash).await? else {
        return Ok(Err(FieldErrors::single("username", USERNAME_TAKEN)));
    };
    tracing::info!(user = user_id, "user registered");

    open_session(pool, config, user_id).await.map(Ok)
}

async fn login(
    kind: RequestKind,
    jar: CookieJar,
    State(pool): State<DBPool>,
    State(config): State<Arc<Config>>,
    body: std::result::Result<Form<AuthForm>, FormRejection>,
) -> Result<(CookieJar, Json<SessionAck>)> {
    let ack = respond(kind, submit_login(&pool, &config, form_or_default(body))).await?;
    Ok((jar.add(session_cookie(ack.token)), ack))
}

#[instrument(name = "user auth", skip_all)]
async fn submit_login(pool: &DBPool, config: &Config, form: AuthForm) -> Result<Outcome<SessionAck>> {
    if let Err(errors) = validate(&form) {
        return Ok(Err(errors));
    }

    let verified = match pool.user_by_username(form.username.trim()).await? {
        Some(user) => auth::verify_password(form.password, user.password_hash)
            .await?
            .then_some(user.id),
        None => None,
    };

    let Some(user_id) = verified else {
        return Ok(Err(FieldErrors::single(FieldErrors::NON_FIELD, INVALID_LOGIN)));
    };

    open_session(pool, config, user_id).await.map(Ok)
}

/// 注销当前会话并清除 cookie，未登录时同样返回成功。
async fn logout(
    headers: HeaderMap,
    jar: CookieJar,
    State(pool): State<DBPool>,
) -> Result<(CookieJar, Json<Ack>)> {
    if let Some(token) = auth::session_token(&headers) {
        pool.delete_session(token).await?;
    }

    let removal = Cookie::build(SESSION_COOKIE).path("/").build();
    Ok((jar.remove(removal), Json(Ack::ok())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::REQUIRED;

    fn register(username: &str, password1: &str, password2: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_register_form_valid() {
        let form = register(" alice ", "s3cret-pass", "s3cret-pass");
        assert!(validate(&form).is_ok());
        assert_eq!(form.username(), "alice");
    }

    #[test]
    fn test_register_form_password_mismatch() {
        let errors = validate(&register("alice", "s3cret-pass", "s3cret-pas")).unwrap_err();
        assert_eq!(errors.get("password2").map(<[String]>::len), Some(1));
        assert!(errors.get("password1").is_none());
    }

    #[test]
    fn test_register_form_short_password_and_missing_fields() {
        let errors = validate(&register("", "short", "short")).unwrap_err();

        assert_eq!(errors.get("username"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("password1").map(<[String]>::len), Some(1));
        assert!(errors.get("password2").is_none());
    }

    #[test]
    fn test_register_form_long_username() {
        let name = "u".repeat(USERNAME_MAX_LEN + 1);
        let errors = validate(&register(&name, "s3cret-pass", "s3cret-pass")).unwrap_err();
        assert!(errors.get("username").is_some());

        let name = "ü".repeat(USERNAME_MAX_LEN);
        assert!(validate(&register(&name, "s3cret-pass", "s3cret-pass")).is_ok());
    }

    #[test]
    fn test_auth_form_requires_both_fields() {
        let errors = validate(&AuthForm::default()).unwrap_err();
        assert_eq!(errors.get("username"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("password"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let token = Uuid::new_v4();
        let cookie = session_cookie(token);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), token.to_string());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_session_ack_serializes_token() {
        let token = Uuid::new_v4();
        let json = serde_json::to_value(SessionAck { status: "ok", token }).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "ok", "token": token.to_string() }));
    }
}
