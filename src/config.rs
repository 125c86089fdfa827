use std::{env, fs};

use serde::Deserialize;

use crate::error::{Error, Result};

/// 服务配置
///
/// 先读取 `BLOG_CONFIG` 指向的 TOML 文件（可选），再由环境变量覆盖：
///
/// - `DATABASE_URL`：数据库连接串（必需）
/// - `BLOG_LISTEN`：监听地址，默认 `0.0.0.0:3000`
/// - `BLOG_SESSION_TTL_HOURS`：登录会话有效期（小时），默认 336
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: Option<String>,
    pub listen: String,
    pub session_ttl_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            listen: "0.0.0.0:3000".to_string(),
            session_ttl_hours: 24 * 14,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 从配置文件和环境变量加载
    pub fn load() -> Result<Self> {
        let mut config = match env::var("BLOG_CONFIG") {
            Ok(path) => Self::from_toml(&fs::read_to_string(path)?)?,
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| env::var(key).ok())?;

        if config.database_url.is_none() {
            return Err(Error::FormatError("`DATABASE_URL` is not set"));
        }
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(listen) = lookup("BLOG_LISTEN") {
            self.listen = listen;
        }
        if let Some(ttl) = lookup("BLOG_SESSION_TTL_HOURS") {
            self.session_ttl_hours = ttl
                .trim()
                .parse()
                .map_err(|_| Error::FormatError("`BLOG_SESSION_TTL_HOURS` must be an integer"))?;
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.listen, "0.0.0.0:3000");
        assert_eq!(config.session_ttl_hours, 336);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml(
            r#"
            database_url = "postgres://file/blog"
            listen = "127.0.0.1:8000"
            "#,
        )
        .unwrap();

        config
            .apply_overrides(|key| match key {
                "DATABASE_URL" => Some("postgres://env/blog".to_string()),
                "BLOG_SESSION_TTL_HOURS" => Some("2".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://env/blog"));
        assert_eq!(config.listen, "127.0.0.1:8000");
        assert_eq!(config.session_ttl(), chrono::Duration::hours(2));
    }

    #[test]
    fn test_invalid_ttl_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "BLOG_SESSION_TTL_HOURS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }
}
