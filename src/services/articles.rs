use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::{
    db::ArticleStore,
    error::{AppError, AppResult},
    metrics::Metrics,
    models::{
        Article, ArticleCounter, ArticleFilter, ArticleQuery, ArticleSort, CreateArticleRequest,
        ListArticlesQuery, Page, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
    },
    services::enrichment::EnrichmentEngine,
};

const TITLE_MIN_CHARS: usize = 5;
const TITLE_MAX_CHARS: usize = 200;
const CONTENT_MIN_CHARS: usize = 50;
/// Largest offset the SQL store can express
const MAX_OFFSET: usize = i64::MAX as usize;

/// Article ingestion and reads
#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
    enrichment: EnrichmentEngine,
    metrics: Metrics,
}

impl ArticleService {
    pub fn new(store: Arc<dyn ArticleStore>, enrichment: EnrichmentEngine, metrics: Metrics) -> Self {
        Self {
            store,
            enrichment,
            metrics,
        }
    }

    /// Validates, enriches and persists a new article
    pub async fn create_article(&self, request: CreateArticleRequest) -> AppResult<Article> {
        validate_create_article(&request)?;

        let start = Instant::now();
        let new_article = self.enrichment.enrich(request).await;
        let ai_summary = new_article.is_ai_generated;

        let article = self.store.create(new_article).await?;
        self.metrics.record_article_created(ai_summary);

        tracing::info!(
            article_id = %article.id,
            tags = ?article.tags,
            ai_summary,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Article created"
        );

        Ok(article)
    }

    /// Newest-first listing with optional tag and author filters
    pub async fn get_articles(&self, query: ListArticlesQuery) -> AppResult<Page<Article>> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        let offset = query.offset.unwrap_or(0);
        if offset > MAX_OFFSET {
            return Err(AppError::InvalidInput(format!(
                "offset must be at most {}",
                MAX_OFFSET
            )));
        }

        let filter = ArticleFilter {
            tags_any: query.tag_list(),
            author: query.author.filter(|a| !a.trim().is_empty()),
            exclude_ids: Vec::new(),
        };
        let article_query = ArticleQuery {
            filter: filter.clone(),
            sort: ArticleSort::Newest,
            limit: Some(limit),
            offset,
        };

        let (items, total) = tokio::try_join!(
            self.store.find(&article_query),
            self.store.count(&filter)
        )?;

        tracing::debug!(count = items.len(), total, "Articles retrieved");

        Ok(Page::new(items, total, limit, offset))
    }

    /// Returns the article and counts the read as a view
    ///
    /// The view increment runs in the background after the read succeeds. Its
    /// failure is logged and never fails the read, and the returned article
    /// carries the count from before the increment.
    pub async fn get_article(&self, id: Uuid) -> AppResult<Article> {
        let article = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article with ID {} not found", id)))?;

        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.increment(id, ArticleCounter::Views, 1).await {
                tracing::error!(article_id = %id, error = %e, "Failed to count article view");
            }
        });

        Ok(article)
    }
}

fn validate_create_article(request: &CreateArticleRequest) -> AppResult<()> {
    let title_len = request.title.trim().chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
        return Err(AppError::InvalidInput(format!(
            "title must be between {} and {} characters",
            TITLE_MIN_CHARS, TITLE_MAX_CHARS
        )));
    }

    if request.content.trim().chars().count() < CONTENT_MIN_CHARS {
        return Err(AppError::InvalidInput(format!(
            "content must be at least {} characters",
            CONTENT_MIN_CHARS
        )));
    }

    if request.author.trim().is_empty() {
        return Err(AppError::InvalidInput("author must not be empty".to_string()));
    }

    Ok(())
}
