use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    storage::{DBPool, SqlxStore},
};

/// 应用程序上下文
///
/// [`AppState`] 封装了数据库连接池和服务配置，提供统一访问入口。
#[derive(Clone, FromRef)]
pub struct AppState {
    pool: DBPool,
    config: Arc<Config>,
}

impl AppState {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(pool: DBPool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// 获取仓储对象
    pub fn storage(&self) -> SqlxStore {
        SqlxStore::new(self.pool.clone())
    }
}
