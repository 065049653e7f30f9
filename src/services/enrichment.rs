use crate::{
    metrics::Metrics,
    models::{CreateArticleRequest, NewArticle},
    services::summarizer::{SummarizerGateway, SummaryOptions, SummaryStyle},
};

/// Word budget requested from the summarizer
pub const SUMMARY_MAX_WORDS: u32 = 150;

/// Character budget of the extractive fallback
pub const EXTRACT_MAX_CHARS: usize = 200;

/// Paragraphs this short or shorter never make a summary
pub const MIN_PARAGRAPH_CHARS: usize = 50;

pub const MAX_AUTO_TAGS: usize = 5;

pub const ELLIPSIS: &str = "...";

/// Topical keywords, in the order tags are reported
pub const TAG_VOCABULARY: &[&str] = &[
    "javascript",
    "typescript",
    "nodejs",
    "react",
    "angular",
    "vue",
    "python",
    "java",
    "golang",
    "rust",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "gcp",
    "devops",
    "ci/cd",
    "microservices",
    "api",
    "database",
    "mongodb",
    "postgresql",
    "redis",
    "machine learning",
    "ai",
    "blockchain",
    "web3",
    "security",
];

/// Fills in the summary and tags of a new article
///
/// The summarizer is injected at construction. Its failures never reach the
/// caller: the engine falls back to [`extractive_summary`] instead. Every call
/// to a configured provider is counted by provider and outcome.
#[derive(Clone)]
pub struct EnrichmentEngine {
    gateway: SummarizerGateway,
    metrics: Metrics,
}

impl EnrichmentEngine {
    pub fn new(gateway: SummarizerGateway, metrics: Metrics) -> Self {
        Self { gateway, metrics }
    }

    pub async fn enrich(&self, request: CreateArticleRequest) -> NewArticle {
        let (summary, is_ai_generated) = match request.summary {
            Some(summary) if !summary.trim().is_empty() => (summary, false),
            _ => self.derive_summary(&request.title, &request.content).await,
        };

        let tags = match request.tags {
            Some(tags) if !tags.is_empty() => tags,
            _ => extract_tags(&request.content),
        };

        NewArticle {
            title: request.title,
            content: request.content,
            author: request.author,
            summary,
            tags,
            is_ai_generated,
        }
    }

    async fn derive_summary(&self, title: &str, content: &str) -> (String, bool) {
        let options = SummaryOptions {
            title: Some(title.to_string()),
            max_length: SUMMARY_MAX_WORDS,
            style: SummaryStyle::Concise,
        };

        let result = self.gateway.generate_summary(content, &options).await;
        let provider = self.gateway.provider_name();
        if let Some(provider) = provider {
            self.metrics.record_ai_summary(provider, result.is_ok());
        }

        match result {
            Ok(summary) => {
                tracing::info!(
                    provider = provider.unwrap_or("none"),
                    "Generated article summary"
                );
                (summary, true)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = provider.unwrap_or("none"),
                    "Summary generation failed, using extractive summary"
                );
                (extractive_summary(content), false)
            }
        }
    }
}

/// Deterministic summary built from the content itself
///
/// Picks the first blank-line separated paragraph longer than
/// [`MIN_PARAGRAPH_CHARS`]; when none qualifies the raw content is used.
/// Anything longer than [`EXTRACT_MAX_CHARS`] is cut and marked with an ellipsis.
pub fn extractive_summary(content: &str) -> String {
    let first_paragraph = content
        .split("\n\n")
        .find(|p| p.chars().count() > MIN_PARAGRAPH_CHARS);

    match first_paragraph {
        Some(paragraph) if paragraph.chars().count() <= EXTRACT_MAX_CHARS => paragraph.to_string(),
        Some(paragraph) => truncate_with_ellipsis(paragraph),
        None => truncate_with_ellipsis(content),
    }
}

fn truncate_with_ellipsis(text: &str) -> String {
    let mut truncated: String = text.chars().take(EXTRACT_MAX_CHARS).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Vocabulary keywords found in the content, at most [`MAX_AUTO_TAGS`]
///
/// Plain case-insensitive substring matching, reported in vocabulary order.
pub fn extract_tags(content: &str) -> Vec<String> {
    let content = content.to_lowercase();

    TAG_VOCABULARY
        .iter()
        .filter(|keyword| content.contains(*keyword))
        .take(MAX_AUTO_TAGS)
        .map(|keyword| keyword.to_string())
        .collect()
}
