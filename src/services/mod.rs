pub mod articles;
pub mod enrichment;
pub mod interactions;
pub mod recommendations;
pub mod summarizer;
pub mod users;

pub use articles::ArticleService;
pub use enrichment::EnrichmentEngine;
pub use interactions::InteractionTracker;
pub use recommendations::{RecommendationEngine, RecommendationResponse};
pub use users::UserService;
