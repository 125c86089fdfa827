use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

pub const TITLE_MAX_LEN: usize = 255;

/// 待写入的文章
#[derive(Debug, Deserialize)]
pub struct NewArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "parse_to_local")]
    pub pub_date: DateTime<Local>,
}

/// 文章导入文件
///
/// ```toml
/// [[articles]]
/// title = "Hello"
/// image = "https://example.com/a.png"
/// description = "..."
/// pub_date = "2018-02-13 18:17:16"
/// ```
#[derive(Debug, Deserialize)]
pub struct ArticleImport {
    #[serde(default)]
    pub articles: Vec<NewArticle>,
}

impl ArticleImport {
    pub fn parse(content: &str) -> Result<Self> {
        let import: ArticleImport = toml::from_str(content)?;

        if import
            .articles
            .iter()
            .any(|a| a.title.chars().count() > TITLE_MAX_LEN)
        {
            return Err(Error::FormatError("article title exceeds 255 characters"));
        }

        Ok(import)
    }
}

fn parse_to_local<'de, D>(deserializer: D) -> std::result::Result<DateTime<Local>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;

    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(&s) {
        return Ok(dt.with_timezone(&Local));
    }

    for fmt in &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return local(naive_dt);
        }
    }

    for fmt in &["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(&s, fmt) {
            return match date.and_hms_opt(0, 0, 0) {
                Some(naive_dt) => local(naive_dt),
                None => Err(serde::de::Error::custom("无法构建时间")),
            };
        }
    }

    Err(serde::de::Error::custom(format!("无法解析日期: {}", s)))
}

fn local<E: serde::de::Error>(naive_dt: NaiveDateTime) -> std::result::Result<DateTime<Local>, E> {
    Local
        .from_local_datetime(&naive_dt)
        .earliest()
        .ok_or_else(|| E::custom("本地时间不明确"))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_import_parses_all_date_formats() {
        let content = r#"
[[articles]]
title = "first"
image = "https://example.com/1.png"
description = "one"
pub_date = "2018-02-13 18:17:16"

[[articles]]
title = "second"
pub_date = "2018/02/13 18:18:13"

[[articles]]
title = "third"
pub_date = "2018-02-14"

[[articles]]
title = "fourth"
pub_date = "2018-02-15T10:00:00+00:00"
"#;

        let import = ArticleImport::parse(content).expect("parse import");
        assert_eq!(import.articles.len(), 4);

        let first = &import.articles[0];
        assert_eq!(first.title, "first");
        assert_eq!(first.image, "https://example.com/1.png");
        assert_eq!(first.pub_date.hour(), 18);
        assert_eq!(first.pub_date.second(), 16);

        let second = &import.articles[1];
        assert!(second.image.is_empty(), "image defaults to empty");
        assert!(first.pub_date < second.pub_date);

        assert_eq!(import.articles[2].pub_date.day(), 14);
        assert_eq!(import.articles[2].pub_date.hour(), 0);

        assert!(import.articles[3].pub_date > import.articles[2].pub_date);
    }

    #[test]
    fn test_import_rejects_bad_date() {
        let content = r#"
[[articles]]
title = "x"
pub_date = "yesterday"
"#;
        assert!(ArticleImport::parse(content).is_err());
    }

    #[test]
    fn test_import_rejects_long_title() {
        let content = format!(
            "[[articles]]\ntitle = \"{}\"\npub_date = \"2018-02-13\"\n",
            "a".repeat(TITLE_MAX_LEN + 1)
        );
        assert!(ArticleImport::parse(&content).is_err());
    }
}
