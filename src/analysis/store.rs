//! Bounded in-memory retention of completed analyses for export

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use super::models::AnalysisReport;
use crate::config::AnalysisConfig;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
struct StoredAnalysis {
    report: Arc<AnalysisReport>,
    stored_at: Instant,
}

/// LRU store keyed by `analysis_id`; entries older than the TTL are dropped
/// when touched or on [`AnalysisStore::purge_expired`].
pub struct AnalysisStore {
    entries: Mutex<LruCache<String, StoredAnalysis>>,
    ttl: Duration,
}

impl AnalysisStore {
    pub fn new(config: &AnalysisConfig) -> AppResult<Self> {
        let capacity = NonZeroUsize::new(config.store_capacity).ok_or_else(|| {
            AppError::configuration("analysis.store_capacity must be greater than zero")
        })?;

        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: config.store_ttl,
        })
    }

    pub async fn insert(&self, report: AnalysisReport) -> Arc<AnalysisReport> {
        let report = Arc::new(report);
        let mut entries = self.entries.lock().await;
        let evicted = entries.push(
            report.analysis_id.clone(),
            StoredAnalysis {
                report: report.clone(),
                stored_at: Instant::now(),
            },
        );
        if let Some((id, _)) = evicted
            && id != report.analysis_id
        {
            debug!("Evicted analysis {} (store full)", id);
        }
        report
    }

    pub async fn get(&self, analysis_id: &str) -> Option<Arc<AnalysisReport>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(analysis_id) {
            Some(stored) if stored.stored_at.elapsed() < self.ttl => {
                return Some(stored.report.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(analysis_id);
            debug!("Analysis {} expired", analysis_id);
        }
        None
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, stored)| stored.stored_at.elapsed() >= self.ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            entries.pop(id);
        }
        expired.len()
    }
}
