use std::sync::Arc;

use crate::db::{Cache, CacheKey};

use super::{Summarizer, SummaryError, SummaryOptions};

/// Read-through Redis cache in front of a summarization provider
///
/// Identical title, content and options never hit the provider twice within
/// the TTL. Cache failures are logged and fall through to the provider.
pub struct CachedSummarizer {
    inner: Arc<dyn Summarizer>,
    cache: Cache,
    ttl: u64,
}

impl CachedSummarizer {
    pub fn new(inner: Arc<dyn Summarizer>, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait::async_trait]
impl Summarizer for CachedSummarizer {
    async fn summarize(
        &self,
        content: &str,
        options: &SummaryOptions,
    ) -> Result<String, SummaryError> {
        let variant = format!("{}:{}", options.style, options.max_length);
        let key = CacheKey::summary(options.title.as_deref(), &variant, content);

        match self.cache.get_from_cache::<String>(&key).await {
            Ok(Some(summary)) => {
                tracing::debug!(key = %key, "Summary cache hit");
                return Ok(summary);
            }
            Ok(None) => tracing::debug!(key = %key, "Summary cache miss"),
            Err(e) => tracing::warn!(error = %e, "Summary cache read failed"),
        }

        let summary = self.inner.summarize(content, options).await?;
        self.cache.set_in_background(&key, &summary, self.ttl);
        Ok(summary)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
