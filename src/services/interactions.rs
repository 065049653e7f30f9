use uuid::Uuid;

use crate::{
    db::Stores,
    error::{AppError, AppResult},
    models::{ArticleCounter, Interaction, InteractionFilter, InteractionType},
};

/// Most recent interactions returned by a single read
pub const HISTORY_LIMIT: usize = 100;

/// Records engagement events and fans out their counter updates
///
/// Recording happens in two phases. The interaction itself is persisted first
/// under the unique (user, article, type) constraint; only then are the
/// article and user counters bumped. The phases are not transactional: a
/// counter failure after a successful insert is logged and the interaction is
/// still returned, so counters can lag the interaction history.
#[derive(Clone)]
pub struct InteractionTracker {
    stores: Stores,
}

impl InteractionTracker {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn record(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        interaction_type: InteractionType,
    ) -> AppResult<Interaction> {
        self.check_references(user_id, article_id).await?;

        let interaction = self
            .stores
            .interactions
            .create(user_id, article_id, interaction_type)
            .await?;

        tracing::info!(
            interaction_id = %interaction.id,
            %user_id,
            %article_id,
            interaction_type = %interaction_type,
            "Interaction recorded"
        );

        self.apply_counters(&interaction).await;

        Ok(interaction)
    }

    /// Newest first, optionally narrowed to one interaction type
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        interaction_type: Option<InteractionType>,
    ) -> AppResult<Vec<Interaction>> {
        let filter = InteractionFilter {
            interaction_type,
            ..InteractionFilter::by_user(user_id)
        };
        self.stores
            .interactions
            .find(&filter, Some(HISTORY_LIMIT))
            .await
    }

    pub async fn find_by_article(&self, article_id: Uuid) -> AppResult<Vec<Interaction>> {
        self.stores
            .interactions
            .find(&InteractionFilter::by_article(article_id), Some(HISTORY_LIMIT))
            .await
    }

    async fn check_references(&self, user_id: Uuid, article_id: Uuid) -> AppResult<()> {
        if self.stores.users.find_by_id(user_id).await?.is_none() {
            return Err(AppError::InvalidReference("Invalid user ID".to_string()));
        }

        if self.stores.articles.find_by_id(article_id).await?.is_none() {
            return Err(AppError::InvalidReference("Invalid article ID".to_string()));
        }

        Ok(())
    }

    async fn apply_counters(&self, interaction: &Interaction) {
        if let Some(counter) = article_counter(interaction.interaction_type) {
            match self
                .stores
                .articles
                .increment(interaction.article_id, counter, 1)
                .await
            {
                Ok(true) => {}
                Ok(false) => tracing::warn!(
                    article_id = %interaction.article_id,
                    "Article disappeared before its counter was updated"
                ),
                Err(e) => tracing::error!(
                    article_id = %interaction.article_id,
                    counter = counter.column(),
                    error = %e,
                    "Failed to update article counter"
                ),
            }
        }

        match self
            .stores
            .users
            .increment_interaction_count(interaction.user_id, 1)
            .await
        {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                user_id = %interaction.user_id,
                "User disappeared before its counter was updated"
            ),
            Err(e) => tracing::error!(
                user_id = %interaction.user_id,
                error = %e,
                "Failed to update user interaction count"
            ),
        }
    }
}

/// The article counter an interaction type bumps, if any
fn article_counter(interaction_type: InteractionType) -> Option<ArticleCounter> {
    match interaction_type {
        InteractionType::View => Some(ArticleCounter::Views),
        InteractionType::Like => Some(ArticleCounter::Likes),
        InteractionType::Share | InteractionType::Bookmark => None,
    }
}
