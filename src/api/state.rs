use crate::{
    db::Stores,
    metrics::Metrics,
    services::{
        summarizer::SummarizerGateway, ArticleService, EnrichmentEngine, InteractionTracker,
        RecommendationEngine, UserService,
    },
};

/// Shared application state
///
/// Every service is cheap to clone and shares the same stores.
#[derive(Clone)]
pub struct AppState {
    pub articles: ArticleService,
    pub users: UserService,
    pub interactions: InteractionTracker,
    pub recommendations: RecommendationEngine,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(stores: Stores, summarizer: SummarizerGateway, metrics: Metrics) -> Self {
        Self {
            articles: ArticleService::new(
                stores.articles.clone(),
                EnrichmentEngine::new(summarizer, metrics.clone()),
                metrics.clone(),
            ),
            users: UserService::new(stores.users.clone()),
            interactions: InteractionTracker::new(stores.clone()),
            recommendations: RecommendationEngine::new(stores, metrics.clone()),
            metrics,
        }
    }
}
