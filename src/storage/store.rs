use crate::{content::NewArticle, error, storage::DBPool};

/// 批量写入文章
///
/// 操作先排队，在 [`Store::commit`] 时于同一个事务内执行。
pub trait Store: Send + Sync {
    /// 清空所有文章（评论和点赞随外键级联删除）
    fn clean(&mut self) -> &mut Self;
    /// 插入文章
    fn insert_article(&mut self, article: &NewArticle) -> &mut Self;
    /// 已排队的操作数
    fn pending(&self) -> usize;
    /// 提交更改
    fn commit(self) -> impl Future<Output = Result<(), error::Error>> + Send;
}

/// sqlx 的 [`Store`] 实现
pub struct SqlxStore {
    pool: DBPool,
    queries: Vec<sqlx::query::Query<'static, sqlx::Postgres, sqlx::postgres::PgArguments>>,
}

impl SqlxStore {
    pub fn new(pool: DBPool) -> Self {
        Self {
            pool,
            queries: Default::default(),
        }
    }
}

impl Store for SqlxStore {
    fn clean(&mut self) -> &mut Self {
        let query = sqlx::query("TRUNCATE TABLE articles CASCADE");
        self.queries.push(query);
        self
    }

    fn insert_article(&mut self, article: &NewArticle) -> &mut Self {
        let q = sqlx::query(
            r#"
            INSERT INTO articles (title, image, description, pub_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(article.title.to_owned())
        .bind(article.image.to_owned())
        .bind(article.description.to_owned())
        .bind(article.pub_date);

        self.queries.push(q);
        self
    }

    fn pending(&self) -> usize {
        self.queries.len()
    }

    async fn commit(mut self) -> Result<(), error::Error> {
        let mut tx = self.pool.begin().await?;

        for q in self.queries.drain(..) {
            q.execute(tx.as_mut()).await?;
        }

        Ok(tx.commit().await?)
    }
}
