use std::convert::Infallible;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use serde::Serialize;

use crate::{
    error::{ApiError, Error, Result},
    form::FieldErrors,
};

/// 表单处理结果：成功数据或字段错误
pub type Outcome<T> = std::result::Result<T, FieldErrors>;

/// 请求类型
///
/// 带 `X-Requested-With: XMLHttpRequest` 或 `Accept: application/json` 的请求视为 [`RequestKind::Api`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Api,
    Page,
}

impl RequestKind {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let xhr = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

        let wants_json = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        if xhr || wants_json {
            RequestKind::Api
        } else {
            RequestKind::Page
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestKind {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        Ok(RequestKind::from_headers(&parts.headers))
    }
}

/// 简单确认 `{"status": "ok"}`
#[derive(Debug, Serialize, PartialEq)]
pub struct Ack {
    pub status: &'static str,
}

impl Ack {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// 仅限 API 请求的表单响应
///
/// 非 API 请求直接返回 404，`handle` 不会被执行；
/// API 请求执行 `handle`，成功返回 JSON，字段错误返回 400 与错误表。
pub async fn respond<T, F>(kind: RequestKind, handle: F) -> Result<Json<T>>
where
    T: Serialize,
    F: Future<Output = Result<Outcome<T>>>,
{
    if kind == RequestKind::Page {
        return Err(ApiError::NotFound.into());
    }

    match handle.await? {
        Ok(data) => Ok(Json(data)),
        Err(errors) => Err(Error::Validation(errors)),
    }
}
