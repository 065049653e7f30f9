//! Summarizer gateway and providers
//!
//! The gateway wraps an optional pluggable provider. It never retries: callers
//! decide what to do on failure (the enrichment engine falls back to an
//! extractive summary).
use std::{fmt::Display, sync::Arc, time::Duration};

pub mod cached;
pub mod openai;

pub use cached::CachedSummarizer;
pub use openai::OpenAiSummarizer;

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("no summarization provider is configured")]
    ProviderUnavailable,

    #[error("summarization provider failed: {0}")]
    ProviderError(String),
}

impl From<reqwest::Error> for SummaryError {
    fn from(err: reqwest::Error) -> Self {
        SummaryError::ProviderError(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStyle {
    Concise,
    Detailed,
    BulletPoints,
}

impl Display for SummaryStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let style = match self {
            SummaryStyle::Concise => "concise",
            SummaryStyle::Detailed => "detailed",
            SummaryStyle::BulletPoints => "bullet-points",
        };
        f.write_str(style)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    pub title: Option<String>,
    /// Word budget handed to the provider
    pub max_length: u32,
    pub style: SummaryStyle,
}

/// Trait for summarization providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        content: &str,
        options: &SummaryOptions,
    ) -> Result<String, SummaryError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Entry point for summary generation, bounded by a timeout
#[derive(Clone)]
pub struct SummarizerGateway {
    provider: Option<Arc<dyn Summarizer>>,
    timeout: Duration,
}

impl SummarizerGateway {
    pub fn new(provider: Arc<dyn Summarizer>, timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            timeout,
        }
    }

    /// A gateway with no provider; every call fails with `ProviderUnavailable`
    pub fn unavailable() -> Self {
        Self {
            provider: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.name())
    }

    pub async fn generate_summary(
        &self,
        content: &str,
        options: &SummaryOptions,
    ) -> Result<String, SummaryError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(SummaryError::ProviderUnavailable)?;

        let summary = tokio::time::timeout(self.timeout, provider.summarize(content, options))
            .await
            .map_err(|_| {
                SummaryError::ProviderError(format!("timed out after {:?}", self.timeout))
            })??;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(SummaryError::ProviderError(
                "provider returned an empty summary".to_string(),
            ));
        }

        Ok(summary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SummaryOptions {
        SummaryOptions {
            title: Some("Title".to_string()),
            max_length: 150,
            style: SummaryStyle::Concise,
        }
    }

    struct SlowSummarizer;

    #[async_trait::async_trait]
    impl Summarizer for SlowSummarizer {
        async fn summarize(&self, _: &str, _: &SummaryOptions) -> Result<String, SummaryError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_unavailable_without_provider() {
        let gateway = SummarizerGateway::unavailable();

        let result = gateway.generate_summary("content", &options()).await;
        assert!(matches!(result, Err(SummaryError::ProviderUnavailable)));
        assert_eq!(gateway.provider_name(), None);
    }

    #[tokio::test]
    async fn test_returns_provider_summary() {
        let mut mock = MockSummarizer::new();
        mock.expect_summarize()
            .withf(|content, opts| content == "content" && opts.max_length == 150)
            .times(1)
            .returning(|_, _| Ok("  A generated summary.  ".to_string()));
        mock.expect_name().return_const("mock");

        let gateway = SummarizerGateway::new(Arc::new(mock), Duration::from_secs(1));

        let summary = gateway.generate_summary("content", &options()).await.unwrap();
        assert_eq!(summary, "A generated summary.");
        assert_eq!(gateway.provider_name(), Some("mock"));
    }

    #[tokio::test]
    async fn test_blank_summary_is_provider_error() {
        let mut mock = MockSummarizer::new();
        mock.expect_summarize()
            .returning(|_, _| Ok("   ".to_string()));

        let gateway = SummarizerGateway::new(Arc::new(mock), Duration::from_secs(1));

        let result = gateway.generate_summary("content", &options()).await;
        assert!(matches!(result, Err(SummaryError::ProviderError(_))));
    }

    #[tokio::test]
    async fn test_provider_error_is_passed_through_without_retry() {
        let mut mock = MockSummarizer::new();
        mock.expect_summarize()
            .times(1)
            .returning(|_, _| Err(SummaryError::ProviderError("boom".to_string())));

        let gateway = SummarizerGateway::new(Arc::new(mock), Duration::from_secs(1));

        let result = gateway.generate_summary("content", &options()).await;
        assert!(matches!(result, Err(SummaryError::ProviderError(msg)) if msg == "boom"));
    }

    #[tokio::test]
    async fn test_timeout_is_provider_error() {
        let gateway = SummarizerGateway::new(Arc::new(SlowSummarizer), Duration::from_millis(20));

        let result = gateway.generate_summary("content", &options()).await;
        assert!(matches!(result, Err(SummaryError::ProviderError(_))));
    }

    #[test]
    fn test_style_display() {
        assert_eq!(SummaryStyle::Concise.to_string(), "concise");
        assert_eq!(SummaryStyle::BulletPoints.to_string(), "bullet-points");
    }
}
