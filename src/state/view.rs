use super::search::FilterState;
use crate::models::Article;

/// Compute the filtered view of the loaded articles.
///
/// Selected tags match with OR semantics; the query is a case-insensitive
/// substring match on title or description. Only already-loaded articles are
/// considered, so a filter never causes a fetch.
pub fn filter_articles<'a>(articles: &'a [Article], filters: &FilterState) -> Vec<&'a Article> {
    let query = filters.query.to_lowercase();
    articles
        .iter()
        .filter(|a| filters.selected_tags.is_empty() || a.has_any_tag(&filters.selected_tags))
        .filter(|a| {
            query.is_empty()
                || a.title.to_lowercase().contains(&query)
                || a.description.to_lowercase().contains(&query)
        })
        .collect()
}
