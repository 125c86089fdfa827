use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{
    error::{ApiError, Error, Result},
    storage::{DBPool, Querier},
};

/// 会话 cookie 名
pub const SESSION_COOKIE: &str = "sessionid";

/// 当前访问者
///
/// 由请求携带的会话令牌解析得到；没有令牌、令牌未知或已过期时为 [`Viewer::Anonymous`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(i64),
}

impl Viewer {
    pub fn user_id(&self) -> Option<i64> {
        match *self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(id),
        }
    }

    /// 要求已登录，否则返回 [`ApiError::Unauthorized`]
    pub fn require_user(&self) -> Result<i64> {
        self.user_id().ok_or(Error::ApiError(ApiError::Unauthorized))
    }
}

/// 从请求头中取出会话令牌
///
/// 优先使用 `Authorization: Bearer <token>`，其次是 `sessionid` cookie。
pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|t| Uuid::parse_str(t.trim()).ok());

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .and_then(|c| Uuid::parse_str(c.value()).ok())
    })
}

impl<S> FromRequestParts<S> for Viewer
where
    DBPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Viewer::Anonymous);
        };

        let pool = DBPool::from_ref(state);
        Ok(pool
            .session_user(token)
            .await?
            .map_or(Viewer::Anonymous, Viewer::User))
    }
}

/// 使用 argon2 计算密码哈希（在阻塞线程中执行）
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    })
    .await?
}

/// 校验密码，存储的哈希无法解析时视为不匹配
pub async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    Ok(tokio::task::spawn_blocking(move || {
        PasswordHash::new(&password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    })
    .await?)
}
