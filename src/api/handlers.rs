use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::AppState;
use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{
        Article, CreateArticleRequest, CreateInteractionRequest, CreateUserRequest, Interaction,
        InteractionType, ListArticlesQuery, Page, User,
    },
    services::RecommendationResponse,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInteractionsQuery {
    pub interaction_type: Option<InteractionType>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub limit: Option<usize>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Prometheus scrape endpoint
pub async fn metrics(
    State(state): State<AppState>,
) -> AppResult<([(HeaderName, String); 1], String)> {
    let body = state.metrics.render()?;
    Ok(([(CONTENT_TYPE, state.metrics.content_type())], body))
}

/// Create an article, deriving its summary and tags when omitted
pub async fn create_article(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateArticleRequest>,
) -> AppResult<(StatusCode, Json<Article>)> {
    tracing::debug!(%request_id, title = %request.title, "Creating article");
    let article = state.articles.create_article(request).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> AppResult<Json<Page<Article>>> {
    let page = state.articles.get_articles(query).await?;
    Ok(Json(page))
}

/// Fetch one article; counts as a view
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Article>> {
    let article = state.articles.get_article(id).await?;
    Ok(Json(article))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    tracing::debug!(%request_id, username = %request.username, "Creating user");
    let user = state.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.users.list_users().await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let user = state.users.get_user(id).await?;
    Ok(Json(user))
}

/// Record an interaction; a repeated (user, article, type) is a conflict
pub async fn create_interaction(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateInteractionRequest>,
) -> AppResult<(StatusCode, Json<Interaction>)> {
    tracing::debug!(
        %request_id,
        user_id = %request.user_id,
        article_id = %request.article_id,
        "Recording interaction"
    );
    let interaction = state
        .interactions
        .record(request.user_id, request.article_id, request.interaction_type)
        .await?;
    Ok((StatusCode::CREATED, Json(interaction)))
}

pub async fn get_user_interactions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<UserInteractionsQuery>,
) -> AppResult<Json<Vec<Interaction>>> {
    let interactions = state
        .interactions
        .find_by_user(user_id, query.interaction_type)
        .await?;
    Ok(Json(interactions))
}

pub async fn get_article_interactions(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> AppResult<Json<Vec<Interaction>>> {
    let interactions = state.interactions.find_by_article(article_id).await?;
    Ok(Json(interactions))
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<RecommendationsQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let response = state.recommendations.recommend(user_id, query.limit).await?;
    Ok(Json(response))
}
