//! The search index adapter. [`project`] flattens the content store into one
//! list of [`SearchableRecord`]s and [`filter`] narrows that list down to the
//! records matching a free-text query.

use crate::content::{ContentStore, Newsletter, Resource};
use crate::markdown;
use crate::tag::Tag;
use chrono::NaiveDate;
use serde::Serialize;

/// Which content collection a [`SearchableRecord`] was projected from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Newsletter,
    Resource,
}

/// The unified shape search works over. Derived from the content store and
/// never stored.
#[derive(Clone, Debug, Serialize)]
pub struct SearchableRecord {
    pub id: String,
    pub source: SourceType,
    pub title: String,
    pub summary: String,
    pub tags: Vec<Tag>,
    pub date: Option<NaiveDate>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl From<&Newsletter> for SearchableRecord {
    fn from(n: &Newsletter) -> SearchableRecord {
        SearchableRecord {
            id: n.id.clone(),
            source: SourceType::Newsletter,
            title: n.title.clone(),
            summary: n.summary.clone(),
            tags: n.tags.clone(),
            date: Some(n.date),
            image: Some(n.image.clone()),
            link: Some(n.link.clone()),
        }
    }
}

impl From<&Resource> for SearchableRecord {
    /// Resources have no summary of their own, so their bullet points stand
    /// in for one. The open link is preferred over the download link.
    fn from(r: &Resource) -> SearchableRecord {
        SearchableRecord {
            id: r.id.clone(),
            source: SourceType::Resource,
            title: r.title.clone(),
            summary: r.points.join("; "),
            tags: Vec::new(),
            date: None,
            image: None,
            link: r.open_link.clone().or_else(|| r.download_link.clone()),
        }
    }
}

/// Projects every newsletter and then every resource into a
/// [`SearchableRecord`], keeping declaration order.
pub fn project(store: &ContentStore) -> Vec<SearchableRecord> {
    store
        .newsletters()
        .iter()
        .map(SearchableRecord::from)
        .chain(store.resources().iter().map(SearchableRecord::from))
        .collect()
}

impl SearchableRecord {
    /// The summary as displayed, with its Markdown markup removed.
    pub fn summary_text(&self) -> String {
        markdown::to_text(&self.summary)
    }

    /// Reports whether `query`, already lower-cased, is a substring of the
    /// lower-cased title, displayed summary, or space-joined tag names.
    fn matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query)
            || self.summary_text().to_lowercase().contains(query)
            || self
                .tags
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<&str>>()
                .join(" ")
                .to_lowercase()
                .contains(query)
    }
}

/// Returns the records matching `query` case-insensitively, in their input
/// order. The empty query matches everything.
pub fn filter(records: &[SearchableRecord], query: &str) -> Vec<SearchableRecord> {
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|r| r.matches(&query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn ids(records: &[SearchableRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_project_order() {
        let records = project(&ContentStore::builtin());
        assert_eq!(10, records.len());
        assert_eq!(SourceType::Newsletter, records[0].source);
        assert_eq!("au-continental-ai-strategy", records[0].id);
        assert_eq!(SourceType::Resource, records[5].source);
        assert_eq!("ai-governance-101", records[5].id);
    }

    #[test]
    fn test_project_ids_unique() {
        let records = project(&ContentStore::builtin());
        let unique: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(records.len(), unique.len());
    }

    #[test]
    fn test_resource_projection() {
        let records = project(&ContentStore::builtin());
        let templates = records
            .iter()
            .find(|r| r.id == "practical-templates")
            .unwrap();
        assert!(templates.summary.starts_with("AI Risk Review"));
        assert!(templates.summary.contains("; Model Card"));
        assert!(templates.tags.is_empty());
        assert_eq!(None, templates.date);
        assert_eq!(
            Some("https://responsibleaibeyond.org/resources/practical-templates"),
            templates.link.as_deref()
        );
    }

    #[test]
    fn test_filter_matches_tags_case_insensitively() {
        let records = project(&ContentStore::builtin());
        let found = filter(&records, "dpi");
        // The DPI issue by tag and title; the templates resource by its
        // checklist point.
        assert_eq!(
            vec!["dpi-angle", "practical-templates"],
            ids(&found)
        );
    }

    #[test]
    fn test_filter_matches_tag_only() {
        let records = project(&ContentStore::builtin());
        assert_eq!(vec!["localization-agri-llms"], ids(&filter(&records, "AGRICULTURE")));
        // Joined tags are searchable across the separator.
        assert_eq!(vec!["dpi-angle"], ids(&filter(&records, "dpi open")));
    }

    #[test]
    fn test_filter_summary() {
        let records = project(&ContentStore::builtin());
        assert_eq!(vec!["model-evaluations-101"], ids(&filter(&records, "checklist teams")));
    }

    #[test]
    fn test_filter_ignores_summary_markup() {
        let mut record = SearchableRecord::from(&ContentStore::builtin().newsletters()[0]);
        record.summary = "Hello *world*, meet `DPI`.".to_owned();
        let records = vec![record];
        assert_eq!("Hello world, meet DPI.", records[0].summary_text());
        assert_eq!(1, filter(&records, "hello world").len());
        assert_eq!(1, filter(&records, "meet dpi").len());
        assert!(filter(&records, "*world*").is_empty());
    }

    #[test]
    fn test_filter_empty_query_matches_all() {
        let records = project(&ContentStore::builtin());
        assert_eq!(ids(&records), ids(&filter(&records, "")));
    }

    #[test]
    fn test_filter_no_results() {
        let records = project(&ContentStore::builtin());
        assert!(filter(&records, "quantum blockchain").is_empty());
    }
}
