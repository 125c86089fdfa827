mod models;
mod postgres;
mod querier;
mod store;
mod writer;

pub use self::{
    models::{Article, ArticleSummary, CommentRow, LikeStatus, UserCredentials},
    postgres::{DBPool, init_db_from_env, init_schema, migrate, new_db_pool},
    querier::Querier,
    store::{SqlxStore, Store},
    writer::Writer,
};
