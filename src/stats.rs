//! Usage statistics published by the service, polled for display only.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::service::CompletionService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatEntry {
    pub key: String,
    pub value: String,
}

/// Parses `key=value` lines. Lines without `=` are skipped.
pub fn parse_stats(body: &str) -> Vec<StatEntry> {
    body.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(StatEntry {
                key: key.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

/// Polls `/stats` every `interval` and publishes the latest successful
/// result. Failed polls keep the previous value.
pub fn spawn_stats_poll<S>(
    service: Arc<S>,
    interval: Duration,
) -> (JoinHandle<()>, watch::Receiver<Vec<StatEntry>>)
where
    S: CompletionService + ?Sized + 'static,
{
    let (tx, rx) = watch::channel(Vec::new());
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match service.stats().await {
                Ok(entries) => {
                    if tx.send(entries).is_err() {
                        log::debug!("Stats display closed, stopping poll");
                        break;
                    }
                }
                Err(e) => log::warn!("Stats poll failed: {e}"),
            }
        }
    });
    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats() {
        let entries = parse_stats("words=370105\nqueries = 12\ngarbage\n=nokey\nempty=\n");
        assert_eq!(
            entries,
            vec![
                StatEntry { key: "words".into(), value: "370105".into() },
                StatEntry { key: "queries".into(), value: "12".into() },
                StatEntry { key: "empty".into(), value: "".into() },
            ]
        );
    }
}
