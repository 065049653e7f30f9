use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::store::{ArticleStore, InteractionStore, UserStore},
    error::{AppError, AppResult},
    models::{
        Article, ArticleCounter, ArticleFilter, ArticleQuery, Interaction, InteractionFilter,
        InteractionType, NewArticle, NewUser, User,
    },
};

#[derive(Default)]
struct Tables {
    articles: HashMap<Uuid, Article>,
    users: HashMap<Uuid, User>,
    /// Insertion order
    interactions: Vec<Interaction>,
}

/// In-process store with the same semantics as the PostgreSQL store
///
/// Used when no database is configured and by tests. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed article, keeping its id, counters and timestamps
    pub async fn insert_article(&self, article: Article) {
        let mut tables = self.tables.write().await;
        tables.articles.insert(article.id, article);
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn create(&self, article: NewArticle) -> AppResult<Article> {
        let now = Utc::now();
        let created = Article {
            id: Uuid::new_v4(),
            title: article.title,
            content: article.content,
            author: article.author,
            summary: article.summary,
            tags: article.tags,
            view_count: 0,
            like_count: 0,
            is_ai_generated: article.is_ai_generated,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.write().await;
        tables.articles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Article>> {
        let tables = self.tables.read().await;
        Ok(tables.articles.get(&id).cloned())
    }

    async fn find(&self, query: &ArticleQuery) -> AppResult<Vec<Article>> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Article> = tables
            .articles
            .values()
            .filter(|a| query.filter.matches(a))
            .cloned()
            .collect();

        matching.sort_by(|a, b| query.sort.compare(a, b));

        let window = matching.into_iter().skip(query.offset);
        Ok(match query.limit {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        })
    }

    async fn count(&self, filter: &ArticleFilter) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables.articles.values().filter(|a| filter.matches(a)).count() as u64)
    }

    async fn increment(&self, id: Uuid, counter: ArticleCounter, delta: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(article) = tables.articles.get_mut(&id) else {
            return Ok(false);
        };

        match counter {
            ArticleCounter::Views => article.view_count += delta,
            ArticleCounter::Likes => article.like_count += delta,
        }
        article.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateUsername(user.username));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            interests: user.interests,
            article_count: 0,
            interaction_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn list(&self, limit: usize) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        users.truncate(limit);
        Ok(users)
    }

    async fn increment_interaction_count(&self, id: Uuid, delta: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(false);
        };

        user.interaction_count += delta;
        user.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn create(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        interaction_type: InteractionType,
    ) -> AppResult<Interaction> {
        let mut tables = self.tables.write().await;
        let exists = tables.interactions.iter().any(|i| {
            i.user_id == user_id
                && i.article_id == article_id
                && i.interaction_type == interaction_type
        });
        if exists {
            return Err(AppError::DuplicateInteraction);
        }

        let interaction = Interaction {
            id: Uuid::new_v4(),
            user_id,
            article_id,
            interaction_type,
            created_at: Utc::now(),
        };
        tables.interactions.push(interaction.clone());
        Ok(interaction)
    }

    async fn find(
        &self,
        filter: &InteractionFilter,
        limit: Option<usize>,
    ) -> AppResult<Vec<Interaction>> {
        let tables = self.tables.read().await;
        // Latest insert first, then a stable sort keeps that order among equal timestamps
        let mut matching: Vec<Interaction> = tables
            .interactions
            .iter()
            .rev()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let Some(limit) = limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }
}
