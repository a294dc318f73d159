//! Instruction document cache
//!
//! Analysis prompts embed a policy document maintained as a shared Google
//! Doc. The document is fetched through its plain-text export, kept for a
//! fixed TTL, and served from memory in between. Fetch failures never reach
//! callers: they get the last good copy (even if stale) or, when nothing was
//! ever loaded, a static fallback message.
//!
//! No single-flight guard: concurrent callers that hit an expired entry may
//! each fetch, and the last successful write wins.

use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub mod source;

pub use source::{DocumentSource, HttpDocumentSource};

use crate::config::InstructionsConfig;
use crate::errors::{InstructionError, InstructionResult};

/// Instruction text handed to the analysis layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructions {
    pub content: String,
    pub updated: DateTime<Utc>,
}

/// A successfully fetched document, replaced wholesale on the next fetch
#[derive(Debug, Clone)]
pub struct CachedInstructions {
    pub content: String,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedInstructions {
    fn new(content: String, fetched_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        let expires_at = fetched_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            content,
            fetched_at,
            expires_at,
        }
    }

    fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    fn to_instructions(&self) -> Instructions {
        Instructions {
            content: self.content.clone(),
            updated: self.fetched_at,
        }
    }
}

/// Point-in-time view of the cache for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub configured: bool,
    pub cached: bool,
    pub fresh: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub content_chars: usize,
}

/// TTL cache in front of the remote instruction document
pub struct InstructionCache {
    document_url: String,
    export_base_url: String,
    ttl: TimeDelta,
    fallback_message: String,
    source: Arc<dyn DocumentSource>,
    state: RwLock<Option<CachedInstructions>>,
}

impl InstructionCache {
    pub fn new(config: &InstructionsConfig, source: Arc<dyn DocumentSource>) -> Self {
        Self {
            document_url: config.document_url.clone(),
            export_base_url: config.export_base_url.trim_end_matches('/').to_string(),
            ttl: TimeDelta::from_std(config.ttl).unwrap_or(TimeDelta::MAX),
            fallback_message: config.fallback_message.clone(),
            source,
            state: RwLock::new(None),
        }
    }

    /// Return the cached document while fresh, otherwise refetch it.
    ///
    /// Never fails: on any fetch error the previous copy or the fallback
    /// message is returned.
    pub async fn get_instructions(&self) -> Instructions {
        let now = Utc::now();
        if let Some(cached) = self.state.read().await.as_ref()
            && cached.is_fresh_at(now)
        {
            debug!("Serving cached instructions (expires {})", cached.expires_at);
            return cached.to_instructions();
        }

        match self.refresh().await {
            Ok(instructions) => instructions,
            Err(e) => {
                warn!("Failed to load instructions: {}", e);
                match self.state.read().await.as_ref() {
                    Some(stale) => {
                        info!(
                            "Using stale instructions fetched at {}",
                            stale.fetched_at
                        );
                        stale.to_instructions()
                    }
                    None => Instructions {
                        content: self.fallback_message.clone(),
                        updated: Utc::now(),
                    },
                }
            }
        }
    }

    /// Fetch the document and replace the cached copy
    async fn refresh(&self) -> InstructionResult<Instructions> {
        let document_id = extract_document_id(&self.document_url)?;
        let url = export_url(&self.export_base_url, &document_id);

        let body = self.source.fetch_text(&url).await?;
        let content = body.trim_start_matches('\u{feff}').to_string();
        if content.trim().is_empty() {
            return Err(InstructionError::EmptyDocument { url });
        }

        let cached = CachedInstructions::new(content, Utc::now(), self.ttl);
        let instructions = cached.to_instructions();
        info!(
            "Loaded instruction document {} ({} chars, expires {})",
            document_id,
            cached.content.chars().count(),
            cached.expires_at
        );
        *self.state.write().await = Some(cached);

        Ok(instructions)
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        let state = self.state.read().await;
        let now = Utc::now();
        CacheSnapshot {
            configured: !self.document_url.is_empty(),
            cached: state.is_some(),
            fresh: state.as_ref().is_some_and(|c| c.is_fresh_at(now)),
            fetched_at: state.as_ref().map(|c| c.fetched_at),
            expires_at: state.as_ref().map(|c| c.expires_at),
            content_chars: state
                .as_ref()
                .map(|c| c.content.chars().count())
                .unwrap_or(0),
        }
    }
}

fn document_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/document/d/([a-zA-Z0-9_-]+)").expect("document id pattern is valid")
    })
}

/// Pull the document identifier out of a Google Docs share URL
pub fn extract_document_id(url: &str) -> InstructionResult<String> {
    document_id_pattern()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            InstructionError::invalid_config(
                "instructions.document_url",
                format!("'{url}' is not a Google Docs document URL"),
            )
        })
}

/// Plain-text export URL for a document id
pub fn export_url(base_url: &str, document_id: &str) -> String {
    format!("{base_url}/document/d/{document_id}/export?format=txt")
}
