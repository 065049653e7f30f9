//! Storage interfaces for the three collections.
//!
//! Implementations must provide atomic increments and enforce the unique
//! constraints on `User.username` and on the interaction
//! (user, article, type) triple.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::MeteredStore,
    error::AppResult,
    metrics::Metrics,
    models::{
        Article, ArticleCounter, ArticleFilter, ArticleQuery, Interaction, InteractionFilter,
        InteractionType, NewArticle, NewUser, User,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn create(&self, article: NewArticle) -> AppResult<Article>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Article>>;

    async fn find(&self, query: &ArticleQuery) -> AppResult<Vec<Article>>;

    async fn count(&self, filter: &ArticleFilter) -> AppResult<u64>;

    /// Atomically adds `delta` to a counter. Returns `false` when the article does not exist.
    async fn increment(&self, id: Uuid, counter: ArticleCounter, delta: i64) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DuplicateUsername` when the username is taken
    async fn create(&self, user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Newest first
    async fn list(&self, limit: usize) -> AppResult<Vec<User>>;

    /// Atomically adds `delta` to the interaction counter
    async fn increment_interaction_count(&self, id: Uuid, delta: i64) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Fails with `DuplicateInteraction` when the triple already exists
    async fn create(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        interaction_type: InteractionType,
    ) -> AppResult<Interaction>;

    /// Newest first; no limit when `None`
    async fn find(
        &self,
        filter: &InteractionFilter,
        limit: Option<usize>,
    ) -> AppResult<Vec<Interaction>>;
}

/// Handles to every collection, shared by the services
#[derive(Clone)]
pub struct Stores {
    pub articles: Arc<dyn ArticleStore>,
    pub users: Arc<dyn UserStore>,
    pub interactions: Arc<dyn InteractionStore>,
}

impl Stores {
    /// Uses one backend for all three collections
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: ArticleStore + UserStore + InteractionStore + 'static,
    {
        Self {
            articles: backend.clone(),
            users: backend.clone(),
            interactions: backend,
        }
    }

    /// Like [`Stores::from_backend`], timing every call into `metrics`
    pub fn metered<S>(backend: Arc<S>, metrics: Metrics) -> Self
    where
        S: ArticleStore + UserStore + InteractionStore + 'static,
    {
        Self::from_backend(Arc::new(MeteredStore::new(backend, metrics)))
    }
}
