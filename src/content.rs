mod article;
mod like;

pub use self::{
    article::{ArticleImport, NewArticle, TITLE_MAX_LEN},
    like::{LikeState, LikeTarget},
};
