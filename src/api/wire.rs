//! Wire shapes returned by the content API.
//!
//! Everything except `id` is optional here; fallbacks are applied when the
//! records are mapped into [`crate::models`] types.
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub profile_image_90: Option<String>,
    pub profile_image: Option<String>,
}

/// `tag_list` is an array on listing endpoints but a comma-separated string on
/// the single-article endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    List(Vec<String>),
    Joined(String),
}

impl TagList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagList::List(tags) => tags,
            TagList::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawArticle {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub tag_list: Option<TagList>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub reading_time_minutes: Option<u32>,
    #[serde(default)]
    pub positive_reactions_count: Option<u32>,
    #[serde(default)]
    pub comments_count: Option<u32>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFullArticle {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body_markdown: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub tags: Option<TagList>,
    #[serde(default)]
    pub tag_list: Option<TagList>,
    #[serde(default)]
    pub positive_reactions_count: Option<u32>,
    #[serde(default)]
    pub comments_count: Option<u32>,
    #[serde(default)]
    pub reading_time_minutes: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}
