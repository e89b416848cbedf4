use anyhow::{bail, Context};
use domain::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::env;

/// ログの出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl Config {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の取得関数から設定を読み込む（未設定の項目はデフォルト値）
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::to_lowercase) {
            None => defaults.log_format,
            Some(format) if format == "json" => LogFormat::Json,
            Some(format) if format == "pretty" => LogFormat::Pretty,
            Some(other) => bail!("LOG_FORMAT must be 'json' or 'pretty': {other}"),
        };

        let default_page_size = parse_u32(&lookup, "DEFAULT_PAGE_SIZE", defaults.default_page_size)?;
        let max_page_size = parse_u32(&lookup, "MAX_PAGE_SIZE", defaults.max_page_size)?;
        if default_page_size == 0 || default_page_size > max_page_size {
            bail!(
                "DEFAULT_PAGE_SIZE must be between 1 and MAX_PAGE_SIZE ({max_page_size}): {default_page_size}"
            );
        }

        Ok(Config {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
            default_page_size,
            max_page_size,
        })
    }
}

fn parse_u32<F>(lookup: &F, key: &str, default: u32) -> anyhow::Result<u32>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u32>()
            .with_context(|| format!("{key} must be a non-negative integer: {value}")),
        None => Ok(default),
    }
}
