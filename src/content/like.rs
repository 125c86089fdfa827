/// 点赞对象
///
/// 一条点赞记录只指向文章或评论之一，对应 `likes` 表的 `article_id` / `comment_id` 列。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Article(i64),
    Comment(i64),
}

impl LikeTarget {
    /// `likes` 表中的外键列
    pub fn column(&self) -> &'static str {
        match self {
            LikeTarget::Article(_) => "article_id",
            LikeTarget::Comment(_) => "comment_id",
        }
    }

    /// 被引用表
    pub fn table(&self) -> &'static str {
        match self {
            LikeTarget::Article(_) => "articles",
            LikeTarget::Comment(_) => "comments",
        }
    }

    /// 表单字段名
    pub fn field(&self) -> &'static str {
        match self {
            LikeTarget::Article(_) => "article",
            LikeTarget::Comment(_) => "comment",
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            LikeTarget::Article(id) | LikeTarget::Comment(id) => id,
        }
    }
}

/// 切换后的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Unliked,
    Liked,
}

impl LikeState {
    pub fn is_liked(self) -> bool {
        matches!(self, LikeState::Liked)
    }
}
