//! Domain types shared by the stores and the front-end.
use crate::api::wire::{RawArticle, RawFullArticle, RawUser};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source tag stamped on every article; only one backend is used.
pub const SOURCE_DEVTO: &str = "devto";

const UNKNOWN_AUTHOR: &str = "Unknown";
const UNKNOWN_USERNAME: &str = "unknown";

/// Article summary as shown in listings.
///
/// Never mutated once built; a re-fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source: &'static str,
    pub tags: Vec<String>,
    pub author: String,
    /// Author handle; together with `slug` it addresses the article.
    pub username: String,
    pub image: Option<String>,
    pub profile_image: Option<String>,
    pub reading_time: Option<u32>,
    pub reactions_count: Option<u32>,
    pub comments_count: Option<u32>,
    pub slug: String,
}

impl Article {
    pub fn has_any_tag(&self, wanted: &[String]) -> bool {
        wanted.iter().any(|tag| self.tags.contains(tag))
    }
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        let user = raw.user.unwrap_or_default();
        let profile_image = avatar(&user);
        Self {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
            published_at: raw.published_at.as_deref().and_then(parse_timestamp),
            source: SOURCE_DEVTO,
            tags: raw.tag_list.map(|t| t.into_vec()).unwrap_or_default(),
            author: user.name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            username: user.username.unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
            image: raw.cover_image,
            profile_image,
            reading_time: raw.reading_time_minutes,
            reactions_count: raw.positive_reactions_count,
            comments_count: raw.comments_count,
            slug: raw.slug.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub profile_image: Option<String>,
}

/// Full article with body, fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullArticle {
    pub id: u64,
    pub title: String,
    pub body_markdown: String,
    pub body_html: String,
    pub published_at: Option<DateTime<Utc>>,
    pub user: Author,
    pub tags: Vec<String>,
    pub reactions_count: u32,
    pub comments_count: u32,
    pub reading_time: u32,
    pub url: String,
}

impl From<RawFullArticle> for FullArticle {
    fn from(raw: RawFullArticle) -> Self {
        let user = raw.user.unwrap_or_default();
        let profile_image = avatar(&user);
        // `tags` is the array form on this endpoint; `tag_list` is a fallback
        let tags = raw
            .tags
            .or(raw.tag_list)
            .map(|t| t.into_vec())
            .unwrap_or_default();
        Self {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            body_markdown: raw.body_markdown.unwrap_or_default(),
            body_html: raw.body_html.unwrap_or_default(),
            published_at: raw.published_at.as_deref().and_then(parse_timestamp),
            user: Author {
                name: user.name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
                profile_image,
            },
            tags,
            reactions_count: raw.positive_reactions_count.unwrap_or(0),
            comments_count: raw.comments_count.unwrap_or(0),
            reading_time: raw.reading_time_minutes.unwrap_or(0),
            url: raw.url.unwrap_or_default(),
        }
    }
}

/// Popular tag record from `GET /tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub bg_color_hex: Option<String>,
    #[serde(default)]
    pub text_color_hex: Option<String>,
}

/// Server-side `state` filter of a listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    Fresh,
    Rising,
    All,
}

impl StateFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StateFilter::Fresh => "fresh",
            StateFilter::Rising => "rising",
            StateFilter::All => "all",
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fresh" => Ok(StateFilter::Fresh),
            "rising" => Ok(StateFilter::Rising),
            "all" => Ok(StateFilter::All),
            other => Err(format!(
                "unknown state filter '{other}' (expected fresh, rising or all)"
            )),
        }
    }
}

fn avatar(user: &RawUser) -> Option<String> {
    user.profile_image_90
        .clone()
        .or_else(|| user.profile_image.clone())
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!(value = %s, error = %e, "Unparseable published_at");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(json: &str) -> RawArticle {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_full_listing_record_maps_all_fields() {
        let article = Article::from(raw(
            r#"{
                "id": 42,
                "title": "Ownership 101",
                "description": "Borrowing explained",
                "url": "https://dev.to/alice/ownership-101",
                "published_at": "2024-01-02T03:04:05Z",
                "tag_list": ["rust", "beginners"],
                "user": {"name": "Alice", "username": "alice", "profile_image_90": "https://img/90.png", "profile_image": "https://img/full.png"},
                "cover_image": "https://img/cover.png",
                "reading_time_minutes": 4,
                "positive_reactions_count": 12,
                "comments_count": 3,
                "slug": "ownership-101"
            }"#,
        ));

        assert_eq!(article.id, 42);
        assert_eq!(article.title, "Ownership 101");
        assert_eq!(article.description, "Borrowing explained");
        assert_eq!(article.source, "devto");
        assert_eq!(article.tags, vec!["rust", "beginners"]);
        assert_eq!(article.author, "Alice");
        assert_eq!(article.username, "alice");
        assert_eq!(article.profile_image.as_deref(), Some("https://img/90.png"));
        assert_eq!(article.image.as_deref(), Some("https://img/cover.png"));
        assert_eq!(article.reading_time, Some(4));
        assert_eq!(article.reactions_count, Some(12));
        assert_eq!(article.comments_count, Some(3));
        assert_eq!(article.slug, "ownership-101");
        assert_eq!(
            article.published_at.map(|d| d.to_rfc3339()),
            Some("2024-01-02T03:04:05+00:00".to_string())
        );
    }

    #[test]
    fn test_missing_user_falls_back_to_literals() {
        let article = Article::from(raw(r#"{"id": 1, "slug": "s"}"#));
        assert_eq!(article.author, "Unknown");
        assert_eq!(article.username, "unknown");
        assert_eq!(article.description, "");
        assert!(article.tags.is_empty());
        assert!(article.profile_image.is_none());
    }

    #[test]
    fn test_avatar_falls_back_to_full_profile_image() {
        let article = Article::from(raw(
            r#"{"id": 1, "user": {"name": "B", "username": "b", "profile_image": "https://img/full.png"}}"#,
        ));
        assert_eq!(article.profile_image.as_deref(), Some("https://img/full.png"));
    }

    #[test]
    fn test_bad_timestamp_is_dropped_not_fatal() {
        let article = Article::from(raw(r#"{"id": 1, "published_at": "yesterday"}"#));
        assert!(article.published_at.is_none());
    }

    #[test]
    fn test_full_article_prefers_tags_array() {
        let raw: RawFullArticle = serde_json::from_str(
            r##"{"id": 5, "title": "T", "body_markdown": "# T", "body_html": "<h1>T</h1>",
                "tag_list": "a, b", "tags": ["a", "b", "c"],
                "user": {"name": "Carol", "profile_image_90": "https://img/c.png"},
                "positive_reactions_count": 9, "comments_count": 1, "reading_time_minutes": 2,
                "url": "https://dev.to/carol/t"}"##,
        )
        .unwrap();
        let full = FullArticle::from(raw);
        assert_eq!(full.tags, vec!["a", "b", "c"]);
        assert_eq!(full.user.name, "Carol");
        assert_eq!(full.user.profile_image.as_deref(), Some("https://img/c.png"));
        assert_eq!(full.body_markdown, "# T");
        assert_eq!(full.body_html, "<h1>T</h1>");
        assert_eq!(full.reactions_count, 9);
    }

    #[test]
    fn test_has_any_tag_is_or() {
        let mut article = Article::from(raw(r#"{"id": 1}"#));
        article.tags = vec!["go".to_string(), "rust".to_string()];
        assert!(article.has_any_tag(&["python".to_string(), "go".to_string()]));
        assert!(!article.has_any_tag(&["python".to_string()]));
        assert!(!article.has_any_tag(&[]));
    }

    #[test]
    fn test_state_filter_round_trips_through_str() {
        assert_eq!("Rising".parse::<StateFilter>(), Ok(StateFilter::Rising));
        assert_eq!(StateFilter::Fresh.to_string(), "fresh");
        assert!("hot".parse::<StateFilter>().is_err());
    }
}
