//! Client side of the remote autocomplete service.
//!
//! The service owns the prefix tree and its frequency counters. Every
//! endpoint is a `GET` with query parameters; bodies are plain text except
//! the tree snapshot, which is JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AssistError, Result};
use crate::stats::{StatEntry, parse_stats};
use crate::trie_view::{TrieNodeView, parse_snapshot};

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Ranked completions for `prefix`, at most `k`, in service order.
    async fn query(&self, prefix: &str, k: usize) -> Result<Vec<String>>;

    /// Reports that `word` was chosen while `prefix` was being typed.
    async fn select(&self, prefix: &str, word: &str) -> Result<()>;

    async fn insert(&self, word: &str) -> Result<()>;

    async fn delete(&self, word: &str) -> Result<()>;

    async fn snapshot(&self) -> Result<TrieNodeView>;

    async fn stats(&self) -> Result<Vec<StatEntry>>;
}

/// Splits a newline-separated word list, dropping blank lines.
pub fn parse_word_list(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Clone)]
pub struct HttpService {
    client: Client,
    base_url: String,
}

impl HttpService {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// A client whose requests fail with a timeout error after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AssistError::Url(base_url));
        }
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("GET {url} {params:?}");

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssistError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CompletionService for HttpService {
    async fn query(&self, prefix: &str, k: usize) -> Result<Vec<String>> {
        let k = k.to_string();
        let body = self
            .get_text("query", &[("prefix", prefix), ("k", k.as_str())])
            .await?;
        Ok(parse_word_list(&body))
    }

    async fn select(&self, prefix: &str, word: &str) -> Result<()> {
        self.get_text("select", &[("prefix", prefix), ("word", word)])
            .await
            .map(|_| ())
    }

    async fn insert(&self, word: &str) -> Result<()> {
        self.get_text("insert", &[("word", word)]).await.map(|_| ())
    }

    async fn delete(&self, word: &str) -> Result<()> {
        self.get_text("delete", &[("word", word)]).await.map(|_| ())
    }

    async fn snapshot(&self) -> Result<TrieNodeView> {
        let body = self.get_text("trie", &[]).await?;
        parse_snapshot(&body)
    }

    async fn stats(&self) -> Result<Vec<StatEntry>> {
        let body = self.get_text("stats", &[]).await?;
        Ok(parse_stats(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_list() {
        assert_eq!(
            parse_word_list("apple\n apply \n\napt\n"),
            vec!["apple", "apply", "apt"]
        );
        assert!(parse_word_list("").is_empty());
    }

    #[test]
    fn test_base_url_validation() {
        let service = HttpService::new("http://localhost:8080/").unwrap();
        assert_eq!(service.base_url(), "http://localhost:8080");
        assert!(matches!(
            HttpService::new("localhost:8080"),
            Err(AssistError::Url(_))
        ));
    }
}
