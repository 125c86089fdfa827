use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DBPool;
use crate::content::{LikeState, LikeTarget};

/// 即时写入操作
///
/// 与批量提交的 [`super::Store`] 不同，每个方法都是一次独立的数据库往返。
pub trait Writer: Send + Sync {
    type Error;

    /// 新增评论，返回评论 id
    fn create_comment(
        &self,
        user_id: i64,
        article_id: i64,
        body: &str,
    ) -> impl Future<Output = Result<i64, Self::Error>> + Send;

    /// 切换点赞状态，返回切换后的状态
    fn toggle_like(
        &self,
        user_id: i64,
        target: LikeTarget,
    ) -> impl Future<Output = Result<LikeState, Self::Error>> + Send;

    /// 新增用户，用户名已存在时返回 `None`
    fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send;

    /// 新增会话，并顺带清理已过期的会话
    fn create_session(
        &self,
        user_id: i64,
        token: Uuid,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn delete_session(&self, token: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl Writer for DBPool {
    type Error = sqlx::Error;

    async fn create_comment(
        &self,
        user_id: i64,
        article_id: i64,
        body: &str,
    ) -> Result<i64, Self::Error> {
        sqlx::query_scalar(
            "INSERT INTO comments (article_id, user_id, body) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(article_id)
        .bind(user_id)
        .bind(body)
        .fetch_one(self)
        .await
    }

    /// 单条语句完成“存在则删除，否则插入”。
    ///
    /// 并发的重复请求由 `likes_user_article` / `likes_user_comment` 唯一索引兜底：
    /// 冲突的插入被丢弃，此时状态为已点赞。
    async fn toggle_like(&self, user_id: i64, target: LikeTarget) -> Result<LikeState, Self::Error> {
        let sql = format!(
            r#"
            WITH removed AS (
                DELETE FROM likes WHERE user_id = $1 AND {col} = $2
                RETURNING id
            ), inserted AS (
                INSERT INTO likes (user_id, {col})
                SELECT $1, $2
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT DO NOTHING
                RETURNING id
            )
            SELECT EXISTS (SELECT 1 FROM removed)
            "#,
            col = target.column(),
        );

        let removed: bool = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(target.id())
            .fetch_one(self)
            .await?;

        Ok(if removed {
            LikeState::Unliked
        } else {
            LikeState::Liked
        })
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>, Self::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(self)
        .await
    }

    async fn create_session(
        &self,
        user_id: i64,
        token: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            WITH expired AS (
                DELETE FROM sessions WHERE expires_at <= now()
            )
            INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(self)
        .await?;
        Ok(())
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), Self::Error> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(self)
            .await?;
        Ok(())
    }
}
