use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::Stores,
    error::{AppError, AppResult},
    metrics::Metrics,
    models::{Article, ArticleFilter, ArticleQuery, ArticleSort, InteractionFilter},
};

pub const DEFAULT_RECOMMENDATIONS: usize = 10;
pub const MAX_RECOMMENDATIONS: usize = 50;

pub const STRATEGY: &str = "hybrid";

/// Reported with every response; it is not derived from the candidates
pub const CONFIDENCE: f64 = 0.85;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub recommendations: Vec<Article>,
    pub total: usize,
    pub strategy: &'static str,
    pub confidence: f64,
}

/// Hybrid interest and popularity recommender
///
/// Read-only. Given unchanged storage the same user and limit always yield
/// the same ordered list.
#[derive(Clone)]
pub struct RecommendationEngine {
    stores: Stores,
    metrics: Metrics,
}

impl RecommendationEngine {
    pub fn new(stores: Stores, metrics: Metrics) -> Self {
        Self { stores, metrics }
    }

    pub async fn recommend(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> AppResult<RecommendationResponse> {
        let recommendations = self
            .get_recommendations(user_id, effective_limit(limit))
            .await?;
        self.metrics.record_recommendation_generated(STRATEGY);

        Ok(RecommendationResponse {
            total: recommendations.len(),
            recommendations,
            strategy: STRATEGY,
            confidence: CONFIDENCE,
        })
    }

    /// Up to `limit` articles the user has never interacted with
    ///
    /// Interest matches come first, then the most popular articles back-fill
    /// the remaining slots.
    pub async fn get_recommendations(&self, user_id: Uuid, limit: usize) -> AppResult<Vec<Article>> {
        let user = self
            .stores
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let exclude_ids = self.exclude_set(user_id).await?;

        let interest_matches = if user.interests.is_empty() {
            Vec::new()
        } else {
            self.stores
                .articles
                .find(&ArticleQuery {
                    filter: ArticleFilter {
                        tags_any: user.interests.clone(),
                        author: None,
                        exclude_ids: exclude_ids.clone(),
                    },
                    sort: ArticleSort::InterestRank,
                    limit: Some(interest_cap(limit)),
                    offset: 0,
                })
                .await?
        };

        let popular_cap = popularity_cap(limit, interest_matches.len());
        let popular = if popular_cap == 0 {
            Vec::new()
        } else {
            self.stores
                .articles
                .find(&ArticleQuery {
                    filter: ArticleFilter {
                        exclude_ids,
                        ..Default::default()
                    },
                    sort: ArticleSort::Popularity,
                    // Room for articles already picked by interest
                    limit: Some(popular_cap + interest_matches.len()),
                    offset: 0,
                })
                .await?
        };

        tracing::debug!(
            %user_id,
            interest = interest_matches.len(),
            popular = popular.len(),
            limit,
            "Recommendation candidates fetched"
        );

        Ok(merge_candidates(interest_matches, popular, limit))
    }

    /// Every article the user has interacted with, in first-seen order
    async fn exclude_set(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let history = self
            .stores
            .interactions
            .find(&InteractionFilter::by_user(user_id), None)
            .await?;

        let mut seen = HashSet::new();
        Ok(history
            .into_iter()
            .map(|i| i.article_id)
            .filter(|id| seen.insert(*id))
            .collect())
    }
}

/// Absent or zero means the default; anything larger than the cap is clamped
pub fn effective_limit(limit: Option<usize>) -> usize {
    match limit {
        None | Some(0) => DEFAULT_RECOMMENDATIONS,
        Some(limit) => limit.min(MAX_RECOMMENDATIONS),
    }
}

/// ceil(limit * 0.6)
fn interest_cap(limit: usize) -> usize {
    (limit * 3).div_ceil(5)
}

/// floor(limit * 0.4), raised to cover whatever interest matching left unfilled
fn popularity_cap(limit: usize, interest_count: usize) -> usize {
    (limit * 2 / 5).max(limit.saturating_sub(interest_count))
}

/// Interest candidates first, duplicates dropped keeping the first occurrence
pub fn merge_candidates(interest: Vec<Article>, popular: Vec<Article>, limit: usize) -> Vec<Article> {
    let mut seen = HashSet::new();
    interest
        .into_iter()
        .chain(popular)
        .filter(|article| seen.insert(article.id))
        .take(limit)
        .collect()
}
