use serde::{Deserialize, Serialize};

/// One book mention recovered from a challenge page.
///
/// `author` and `cover` may be empty until enrichment fills them; `id` is
/// absent when the source reference never carried a numeric book id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonMeta {
    pub year: String,
    pub name: String,
}

/// Wire shape of one achievement in the season artifact. `book_count` is
/// always recomputed from `books` before serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementReport {
    pub name: String,
    #[serde(default)]
    pub source_url: String,
    pub book_count: usize,
    pub books: Vec<BookRecord>,
}

/// Per-achievement JSON file written during scraping and merged by `compile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementFile {
    #[serde(default)]
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<SeasonMeta>,
    pub name: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub book_count: usize,
    pub books: Vec<BookRecord>,
}

/// A book identity referenced by more than one achievement. `id` is set only
/// for entries of the by-id map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupeMaps {
    pub duplicates_by_title_author: Vec<DuplicateEntry>,
    pub duplicates_by_id: Vec<DuplicateEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonArtifact {
    pub season: SeasonMeta,
    pub generated_at: String,
    pub achievements: Vec<AchievementReport>,
    pub dedupe: DedupeMaps,
}
