use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored article with its derived summary, tags and engagement counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Free-text author name, not a reference to a user
    pub author: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub view_count: i64,
    pub like_count: i64,
    /// True only when the summary came from the summarizer gateway
    pub is_ai_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new article, before enrichment
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// A fully enriched article ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub author: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub is_ai_generated: bool,
}

/// Engagement counters on an article that support atomic increments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleCounter {
    Views,
    Likes,
}

impl ArticleCounter {
    pub fn column(&self) -> &'static str {
        match self {
            ArticleCounter::Views => "view_count",
            ArticleCounter::Likes => "like_count",
        }
    }
}

/// Filter over the article collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
    /// Match articles carrying at least one of these tags
    pub tags_any: Vec<String>,
    /// Case-insensitive substring match on the author
    pub author: Option<String>,
    pub exclude_ids: Vec<Uuid>,
}

impl ArticleFilter {
    pub fn matches(&self, article: &Article) -> bool {
        if !self.tags_any.is_empty() && !article.tags.iter().any(|t| self.tags_any.contains(t)) {
            return false;
        }

        if let Some(author) = &self.author {
            if !article
                .author
                .to_lowercase()
                .contains(&author.to_lowercase())
            {
                return false;
            }
        }

        !self.exclude_ids.contains(&article.id)
    }
}

/// Sort orders supported by the article store
///
/// Every order ends with the article id so results are fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleSort {
    /// created_at desc
    #[default]
    Newest,
    /// created_at desc, like_count desc
    InterestRank,
    /// like_count desc, view_count desc, created_at desc
    Popularity,
}

impl ArticleSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            ArticleSort::Newest => "created_at DESC, id ASC",
            ArticleSort::InterestRank => "created_at DESC, like_count DESC, id ASC",
            ArticleSort::Popularity => "like_count DESC, view_count DESC, created_at DESC, id ASC",
        }
    }

    pub fn compare(&self, a: &Article, b: &Article) -> std::cmp::Ordering {
        let primary = match self {
            ArticleSort::Newest => b.created_at.cmp(&a.created_at),
            ArticleSort::InterestRank => b
                .created_at
                .cmp(&a.created_at)
                .then(b.like_count.cmp(&a.like_count)),
            ArticleSort::Popularity => b
                .like_count
                .cmp(&a.like_count)
                .then(b.view_count.cmp(&a.view_count))
                .then(b.created_at.cmp(&a.created_at)),
        };
        primary.then(a.id.cmp(&b.id))
    }
}

/// A filtered, sorted and windowed article lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleQuery {
    pub filter: ArticleFilter,
    pub sort: ArticleSort,
    /// No limit when `None`
    pub limit: Option<usize>,
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn article(tags: &[&str], likes: i64, views: i64, age_secs: i64) -> Article {
        let created = Utc::now() - Duration::seconds(age_secs);
        Article {
            id: Uuid::new_v4(),
            title: "Title".to_string(),
            content: "Body".to_string(),
            author: "Ada Lovelace".to_string(),
            summary: "Summary".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            view_count: views,
            like_count: likes,
            is_ai_generated: false,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_filter_matches_any_tag() {
        let filter = ArticleFilter {
            tags_any: vec!["rust".to_string(), "go".to_string()],
            ..Default::default()
        };

        assert!(filter.matches(&article(&["rust", "api"], 0, 0, 0)));
        assert!(!filter.matches(&article(&["python"], 0, 0, 0)));
        assert!(!filter.matches(&article(&[], 0, 0, 0)));
    }

    #[test]
    fn test_filter_author_is_case_insensitive_substring() {
        let filter = ArticleFilter {
            author: Some("LOVE".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&article(&[], 0, 0, 0)));

        let filter = ArticleFilter {
            author: Some("turing".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&article(&[], 0, 0, 0)));
    }

    #[test]
    fn test_filter_excludes_ids() {
        let a = article(&[], 0, 0, 0);
        let filter = ArticleFilter {
            exclude_ids: vec![a.id],
            ..Default::default()
        };
        assert!(!filter.matches(&a));
    }

    #[test]
    fn test_popularity_sort_order() {
        let mut articles = vec![
            article(&[], 1, 100, 0),
            article(&[], 5, 0, 10),
            article(&[], 5, 3, 20),
        ];
        let expected = vec![articles[2].id, articles[1].id, articles[0].id];

        articles.sort_by(|a, b| ArticleSort::Popularity.compare(a, b));

        let ids: Vec<Uuid> = articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_interest_rank_prefers_recent_then_likes() {
        let older_popular = article(&[], 50, 0, 100);
        let newer = article(&[], 0, 0, 1);

        assert_eq!(
            ArticleSort::InterestRank.compare(&newer, &older_popular),
            std::cmp::Ordering::Less
        );
    }
}
