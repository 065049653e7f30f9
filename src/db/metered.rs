//! Store decorator that reports the duration of every call

use std::{future::Future, sync::Arc, time::Instant};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::{ArticleStore, InteractionStore, UserStore},
    error::AppResult,
    metrics::Metrics,
    models::{
        Article, ArticleCounter, ArticleFilter, ArticleQuery, Interaction, InteractionFilter,
        InteractionType, NewArticle, NewUser, User,
    },
};

const ARTICLES: &str = "articles";
const USERS: &str = "users";
const INTERACTIONS: &str = "interactions";

/// Wraps a backend and times each operation, failed ones included
pub struct MeteredStore<S> {
    inner: Arc<S>,
    metrics: Metrics,
}

impl<S> MeteredStore<S> {
    pub fn new(inner: Arc<S>, metrics: Metrics) -> Self {
        Self { inner, metrics }
    }

    async fn timed<T, F>(&self, operation: &str, collection: &str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let start = Instant::now();
        let result = call.await;
        self.metrics
            .record_db_query(operation, collection, start.elapsed());
        result
    }
}

#[async_trait]
impl<S: ArticleStore> ArticleStore for MeteredStore<S> {
    async fn create(&self, article: NewArticle) -> AppResult<Article> {
        self.timed("create", ARTICLES, ArticleStore::create(self.inner.as_ref(), article))
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Article>> {
        self.timed("findById", ARTICLES, ArticleStore::find_by_id(self.inner.as_ref(), id))
            .await
    }

    async fn find(&self, query: &ArticleQuery) -> AppResult<Vec<Article>> {
        self.timed("find", ARTICLES, ArticleStore::find(self.inner.as_ref(), query))
            .await
    }

    async fn count(&self, filter: &ArticleFilter) -> AppResult<u64> {
        self.timed("count", ARTICLES, self.inner.count(filter)).await
    }

    async fn increment(&self, id: Uuid, counter: ArticleCounter, delta: i64) -> AppResult<bool> {
        self.timed("increment", ARTICLES, self.inner.increment(id, counter, delta))
            .await
    }
}

#[async_trait]
impl<S: UserStore> UserStore for MeteredStore<S> {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        self.timed("create", USERS, UserStore::create(self.inner.as_ref(), user))
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.timed("findById", USERS, UserStore::find_by_id(self.inner.as_ref(), id))
            .await
    }

    async fn list(&self, limit: usize) -> AppResult<Vec<User>> {
        self.timed("list", USERS, self.inner.list(limit)).await
    }

    async fn increment_interaction_count(&self, id: Uuid, delta: i64) -> AppResult<bool> {
        self.timed(
            "increment",
            USERS,
            self.inner.increment_interaction_count(id, delta),
        )
        .await
    }
}

#[async_trait]
impl<S: InteractionStore> InteractionStore for MeteredStore<S> {
    async fn create(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        interaction_type: InteractionType,
    ) -> AppResult<Interaction> {
        self.timed(
            "create",
            INTERACTIONS,
            InteractionStore::create(self.inner.as_ref(), user_id, article_id, interaction_type),
        )
        .await
    }

    async fn find(
        &self,
        filter: &InteractionFilter,
        limit: Option<usize>,
    ) -> AppResult<Vec<Interaction>> {
        self.timed(
            "find",
            INTERACTIONS,
            InteractionStore::find(self.inner.as_ref(), filter, limit),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::AppError;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: None,
            interests: vec![],
        }
    }

    #[tokio::test]
    async fn test_operations_are_timed_per_collection() {
        let metrics = Metrics::new().unwrap();
        let store = MeteredStore::new(Arc::new(MemoryStore::new()), metrics.clone());

        let user = UserStore::create(&store, new_user("ferris")).await.unwrap();
        UserStore::find_by_id(&store, user.id).await.unwrap();
        ArticleStore::find_by_id(&store, Uuid::new_v4()).await.unwrap();

        let body = metrics.render().unwrap();
        assert!(body.contains(r#"db_query_duration_seconds_count{collection="users",operation="create"} 1"#));
        assert!(body.contains(r#"db_query_duration_seconds_count{collection="users",operation="findById"} 1"#));
        assert!(body.contains(r#"db_query_duration_seconds_count{collection="articles",operation="findById"} 1"#));
    }

    #[tokio::test]
    async fn test_failed_operations_are_timed_and_passed_through() {
        let metrics = Metrics::new().unwrap();
        let store = MeteredStore::new(Arc::new(MemoryStore::new()), metrics.clone());

        UserStore::create(&store, new_user("ferris")).await.unwrap();
        let duplicate = UserStore::create(&store, new_user("ferris")).await;

        assert!(matches!(duplicate, Err(AppError::DuplicateUsername(_))));
        assert!(metrics
            .render()
            .unwrap()
            .contains(r#"db_query_duration_seconds_count{collection="users",operation="create"} 2"#));
    }
}
