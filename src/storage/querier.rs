use uuid::Uuid;

use super::{Article, ArticleSummary, CommentRow, DBPool, LikeStatus, UserCredentials};
use crate::{auth::Viewer, content::LikeTarget};

/// 只读查询
///
/// 所有需要“当前访问者”的查询都显式接收 [`Viewer`]，匿名访问者的点赞集合恒为空。
pub trait Querier: Send + Sync {
    type Error;

    /// 文章总数
    fn article_count(&self) -> impl Future<Output = Result<i64, Self::Error>> + Send;

    /// 按发布时间倒序分页查询文章，附带点赞数和访问者点赞状态
    fn article_list(
        &self,
        viewer: Viewer,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<ArticleSummary>, Self::Error>> + Send;

    /// 查询单篇文章，不存在返回 `None`
    fn article(&self, id: i64) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send;

    /// 发布时间在 `article` 之后的第一篇文章
    fn next_article_id(
        &self,
        article: &Article,
    ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send;

    /// 发布时间在 `article` 之前的最后一篇文章
    fn previous_article_id(
        &self,
        article: &Article,
    ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send;

    /// 点赞对象的点赞数和访问者点赞状态，对象不存在返回 `None`
    fn like_status(
        &self,
        target: LikeTarget,
        viewer: Viewer,
    ) -> impl Future<Output = Result<Option<LikeStatus>, Self::Error>> + Send;

    /// 文章下的全部评论，按发布时间倒序
    fn comments(
        &self,
        article_id: i64,
        viewer: Viewer,
    ) -> impl Future<Output = Result<Vec<CommentRow>, Self::Error>> + Send;

    /// 点赞对象是否存在
    fn target_exists(
        &self,
        target: LikeTarget,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send;

    /// 未过期会话对应的用户
    fn session_user(
        &self,
        token: Uuid,
    ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send;
}

impl Querier for DBPool {
    type Error = sqlx::Error;

    async fn article_count(&self) -> Result<i64, Self::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(self)
            .await
    }

    async fn article_list(
        &self,
        viewer: Viewer,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ArticleSummary>, Self::Error> {
        sqlx::query_as::<_, ArticleSummary>(
            r#"
            SELECT a.id, a.title, a.image, a.description, a.pub_date,
                   (SELECT COUNT(*) FROM likes l WHERE l.article_id = a.id) AS count_likes,
                   EXISTS (
                       SELECT 1 FROM likes l WHERE l.article_id = a.id AND l.user_id = $1
                   ) AS is_liked
            FROM articles a
            ORDER BY a.pub_date DESC, a.id DESC
            LIMIT $2
            OFFSET $3
            "#,
        )
        .bind(viewer.user_id())
        .bind(limit)
        .bind(offset)
        .fetch_all(self)
        .await
    }

    async fn article(&self, id: i64) -> Result<Option<Article>, Self::Error> {
        sqlx::query_as::<_, Article>(
            "SELECT id, title, image, description, pub_date FROM articles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self)
        .await
    }

    async fn next_article_id(&self, article: &Article) -> Result<Option<i64>, Self::Error> {
        sqlx::query_scalar(
            r#"
            SELECT id FROM articles
            WHERE pub_date > $1 OR (pub_date = $1 AND id > $2)
            ORDER BY pub_date, id
            LIMIT 1
            "#,
        )
        .bind(article.pub_date)
        .bind(article.id)
        .fetch_optional(self)
        .await
    }

    async fn previous_article_id(&self, article: &Article) -> Result<Option<i64>, Self::Error> {
        sqlx::query_scalar(
            r#"
            SELECT id FROM articles
            WHERE pub_date < $1 OR (pub_date = $1 AND id < $2)
            ORDER BY pub_date DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(article.pub_date)
        .bind(article.id)
        .fetch_optional(self)
        .await
    }

    async fn like_status(
        &self,
        target: LikeTarget,
        viewer: Viewer,
    ) -> Result<Option<LikeStatus>, Self::Error> {
        let sql = format!(
            r#"
            SELECT (SELECT COUNT(*) FROM likes l WHERE l.{col} = t.id) AS count_likes,
                   EXISTS (
                       SELECT 1 FROM likes l WHERE l.{col} = t.id AND l.user_id = $2
                   ) AS is_liked
            FROM {table} t
            WHERE t.id = $1
            "#,
            col = target.column(),
            table = target.table(),
        );

        sqlx::query_as::<_, LikeStatus>(&sql)
            .bind(target.id())
            .bind(viewer.user_id())
            .fetch_optional(self)
            .await
    }

    async fn comments(&self, article_id: i64, viewer: Viewer) -> Result<Vec<CommentRow>, Self::Error> {
        sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.body, u.username AS author, c.pub_date,
                   (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id) AS count_likes,
                   EXISTS (
                       SELECT 1 FROM likes l WHERE l.comment_id = c.id AND l.user_id = $2
                   ) AS is_liked
            FROM comments c
            INNER JOIN users u ON u.id = c.user_id
            WHERE c.article_id = $1
            ORDER BY c.pub_date DESC, c.id DESC
            "#,
        )
        .bind(article_id)
        .bind(viewer.user_id())
        .fetch_all(self)
        .await
    }

    async fn target_exists(&self, target: LikeTarget) -> Result<bool, Self::Error> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)",
            target.table()
        );
        sqlx::query_scalar(&sql)
            .bind(target.id())
            .fetch_one(self)
            .await
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<UserCredentials>, Self::Error> {
        sqlx::query_as::<_, UserCredentials>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self)
        .await
    }

    async fn session_user(&self, token: Uuid) -> Result<Option<i64>, Self::Error> {
        sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = $1 AND expires_at > now()")
            .bind(token)
            .fetch_optional(self)
            .await
    }
}
