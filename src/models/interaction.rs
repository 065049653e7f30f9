use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// Kind of engagement a user had with an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    View,
    Like,
    Share,
    Bookmark,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown interaction type: {0}")]
pub struct UnknownInteractionType(pub String);

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::View => "view",
            InteractionType::Like => "like",
            InteractionType::Share => "share",
            InteractionType::Bookmark => "bookmark",
        }
    }
}

impl Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = UnknownInteractionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(InteractionType::View),
            "like" => Ok(InteractionType::Like),
            "share" => Ok(InteractionType::Share),
            "bookmark" => Ok(InteractionType::Bookmark),
            other => Err(UnknownInteractionType(other.to_string())),
        }
    }
}

impl TryFrom<String> for InteractionType {
    type Error = UnknownInteractionType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single recorded engagement; create-only and immutable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub article_id: Uuid,
    #[sqlx(try_from = "String")]
    pub interaction_type: InteractionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInteractionRequest {
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub interaction_type: InteractionType,
}

/// Filter over the interaction collection; results are always newest-first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionFilter {
    pub user_id: Option<Uuid>,
    pub article_id: Option<Uuid>,
    pub interaction_type: Option<InteractionType>,
}

impl InteractionFilter {
    pub fn by_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn by_article(article_id: Uuid) -> Self {
        Self {
            article_id: Some(article_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, interaction: &Interaction) -> bool {
        self.user_id.map_or(true, |id| interaction.user_id == id)
            && self.article_id.map_or(true, |id| interaction.article_id == id)
            && self
                .interaction_type
                .map_or(true, |t| interaction.interaction_type == t)
    }
}
