//! 远程法术目录
//!
//! 启动时请求一次目录接口，返回 `results` 中的条目，保持服务端顺序。

use crate::config::AppSettings;
use crate::spell::Spell;
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::time::Duration;

/// 目录加载错误
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 目录接口响应
#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub count: Option<usize>,
    pub results: Vec<Spell>,
}

/// 目录来源
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Spell>, CatalogError>;
}

/// 基于 reqwest 的目录客户端
pub struct CatalogClient {
    client: reqwest::Client,
    url: String,
}

impl CatalogClient {
    pub fn new(url: impl Into<String>) -> Result<Self, CatalogError> {
        Self::with_timeout(url, None)
    }

    pub fn with_timeout(
        url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("spellbook/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    pub fn from_settings(settings: &AppSettings) -> Result<Self, CatalogError> {
        Self::with_timeout(
            settings.catalog_url.clone(),
            settings.request_timeout_secs.map(Duration::from_secs),
        )
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn load(&self) -> Result<Vec<Spell>, CatalogError> {
        info!("Fetching spell catalog from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        // 先取文本再解析，区分网络错误和格式错误
        let body = response.text().await?;
        let parsed: CatalogResponse = serde_json::from_str(&body)?;

        debug!(
            "Catalog returned {} spells (count field: {:?})",
            parsed.results.len(),
            parsed.count
        );
        Ok(parsed.results)
    }
}

/// 固定内容的目录，用于离线和测试
pub struct StaticCatalog {
    spells: Vec<Spell>,
}

impl StaticCatalog {
    pub fn new(spells: Vec<Spell>) -> Self {
        Self { spells }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load(&self) -> Result<Vec<Spell>, CatalogError> {
        Ok(self.spells.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_response() {
        let json = r#"{
            "count": 2,
            "results": [
                {"index": "fireball", "name": "Fireball", "desc": "A bright streak", "level": 3},
                {"index": "acid-arrow", "name": "Acid Arrow", "url": "/api/2014/spells/acid-arrow"}
            ]
        }"#;

        let parsed: CatalogResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.count, Some(2));
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].index, "fireball");
        assert_eq!(parsed.results[1].index, "acid-arrow");
    }

    #[test]
    fn test_parse_rejects_missing_results() {
        let result: Result<CatalogResponse, _> = serde_json::from_str(r#"{"count": 0}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        // 绑定后立即释放，拿到一个没有监听的端口
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let client = CatalogClient::new(format!("http://{}/api/spells", addr)).unwrap();
        assert!(matches!(client.load().await, Err(CatalogError::Http(_))));
    }

    #[tokio::test]
    async fn test_static_catalog() {
        let catalog = StaticCatalog::new(vec![Spell::new("light", "Light", "")]);
        let spells = catalog.load().await.unwrap();
        assert_eq!(spells.len(), 1);
    }
}
