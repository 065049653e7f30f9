use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::store::{ArticleStore, InteractionStore, UserStore},
    error::{AppError, AppResult},
    models::{
        Article, ArticleCounter, ArticleFilter, ArticleQuery, Interaction, InteractionFilter,
        InteractionType, NewArticle, NewUser, User,
    },
};

const ARTICLE_COLUMNS: &str = "id, title, content, author, summary, tags, view_count, \
     like_count, is_ai_generated, created_at, updated_at";
const USER_COLUMNS: &str =
    "id, username, email, interests, article_count, interaction_count, created_at, updated_at";
const INTERACTION_COLUMNS: &str = "id, user_id, article_id, interaction_type, created_at";

/// Creates a PostgreSQL connection pool and applies pending migrations
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Row counts and offsets beyond what Postgres accepts are a caller error
fn to_sql_count(value: usize, name: &str) -> AppResult<i64> {
    i64::try_from(value).map_err(|_| AppError::InvalidInput(format!("{} is too large", name)))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn push_article_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
    builder.push(" WHERE TRUE");

    if !filter.tags_any.is_empty() {
        builder.push(" AND tags && ").push_bind(filter.tags_any.clone());
    }

    if let Some(author) = &filter.author {
        builder
            .push(" AND strpos(lower(author), lower(")
            .push_bind(author.clone())
            .push(")) > 0");
    }

    if !filter.exclude_ids.is_empty() {
        builder
            .push(" AND NOT (id = ANY(")
            .push_bind(filter.exclude_ids.clone())
            .push("))");
    }
}

/// PostgreSQL-backed store for articles, users and interactions
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PgStore {
    async fn create(&self, article: NewArticle) -> AppResult<Article> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO articles (id, title, content, author, summary, tags, is_ai_generated, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {ARTICLE_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Article>(&sql)
            .bind(Uuid::new_v4())
            .bind(article.title)
            .bind(article.content)
            .bind(article.author)
            .bind(article.summary)
            .bind(article.tags)
            .bind(article.is_ai_generated)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn find(&self, query: &ArticleQuery) -> AppResult<Vec<Article>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {ARTICLE_COLUMNS} FROM articles"));
        push_article_filter(&mut builder, &query.filter);

        builder.push(" ORDER BY ").push(query.sort.order_by());
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(to_sql_count(limit, "limit")?);
        }
        if query.offset > 0 {
            builder
                .push(" OFFSET ")
                .push_bind(to_sql_count(query.offset, "offset")?);
        }

        let articles = builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn count(&self, filter: &ArticleFilter) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles");
        push_article_filter(&mut builder, filter);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn increment(&self, id: Uuid, counter: ArticleCounter, delta: i64) -> AppResult<bool> {
        let column = counter.column();
        let sql = format!(
            "UPDATE articles SET {column} = {column} + $1, updated_at = NOW() WHERE id = $2"
        );

        let result = sqlx::query(&sql)
            .bind(delta)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (id, username, email, interests, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {USER_COLUMNS}"
        );

        let username = user.username.clone();
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(user.username)
            .bind(user.email)
            .bind(user.interests)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::DuplicateUsername(username)
                } else {
                    AppError::Database(e)
                }
            })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self, limit: usize) -> AppResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id ASC LIMIT $1"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(to_sql_count(limit, "limit")?)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn increment_interaction_count(&self, id: Uuid, delta: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET interaction_count = interaction_count + $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(delta)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl InteractionStore for PgStore {
    async fn create(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        interaction_type: InteractionType,
    ) -> AppResult<Interaction> {
        let sql = format!(
            "INSERT INTO interactions (id, user_id, article_id, interaction_type, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {INTERACTION_COLUMNS}"
        );

        sqlx::query_as::<_, Interaction>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(article_id)
            .bind(interaction_type.as_str())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::DuplicateInteraction
                } else {
                    AppError::Database(e)
                }
            })
    }

    async fn find(
        &self,
        filter: &InteractionFilter,
        limit: Option<usize>,
    ) -> AppResult<Vec<Interaction>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {INTERACTION_COLUMNS} FROM interactions WHERE TRUE"
        ));

        if let Some(user_id) = filter.user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(article_id) = filter.article_id {
            builder.push(" AND article_id = ").push_bind(article_id);
        }
        if let Some(interaction_type) = filter.interaction_type {
            builder
                .push(" AND interaction_type = ")
                .push_bind(interaction_type.as_str());
        }

        builder.push(" ORDER BY created_at DESC, id ASC");
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(to_sql_count(limit, "limit")?);
        }

        let interactions = builder
            .build_query_as::<Interaction>()
            .fetch_all(&self.pool)
            .await?;
        Ok(interactions)
    }
}
