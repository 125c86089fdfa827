use blogpost::{
    config::Config,
    content::ArticleImport,
    error::Result,
    storage::{self, SqlxStore, Store},
};

fn print_usage_and_exit() -> ! {
    eprintln!("Usage: blog-import [--reset] <articles.toml>");
    std::process::exit(1);
}

async fn import(path: &str, reset: bool) -> Result<usize> {
    let config = Config::load()?;
    let import = ArticleImport::parse(&std::fs::read_to_string(path)?)?;

    let pool = storage::new_db_pool(config.database_url.as_deref().unwrap_or_default()).await?;
    storage::init_schema(&pool).await?;

    let mut store = SqlxStore::new(pool);
    if reset {
        store.clean();
    }
    for article in &import.articles {
        store.insert_article(article);
    }
    tracing::info!(pending = store.pending(), reset, "committing import");
    store.commit().await?;

    Ok(import.articles.len())
}

#[tokio::main]
async fn main() {
    blogpost::init_tracing();

    let mut reset = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--reset" => reset = true,
            _ if path.is_none() => path = Some(arg),
            _ => {
                eprintln!("Too many arguments provided.");
                print_usage_and_exit();
            }
        }
    }

    let Some(path) = path else {
        eprintln!("Missing <articles.toml>");
        print_usage_and_exit();
    };

    match import(&path, reset).await {
        Ok(n) => println!("✅ Imported {} articles", n),
        Err(e) => {
            eprintln!("❌ Import failed: {}", e);
            std::process::exit(1);
        }
    }
}
