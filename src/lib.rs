pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod form;
pub mod pagination;
pub mod state;
pub mod storage;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::Config;
use error::Result;
use state::AppState;

/// 初始化日志，级别由 `BLOG_LOG` 控制
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("BLOG_LOG"))
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::load()?;
    let pool = storage::new_db_pool(config.database_url.as_deref().unwrap_or_default()).await?;
    storage::init_schema(&pool).await?;
    let listen = config.listen.clone();

    api::run_server(AppState::new(pool, config), &listen).await
}
