use std::collections::HashMap;

use crate::formats::{AchievementReport, DedupeMaps, DuplicateEntry};

/// Compute both cross-achievement duplicate maps from the final record sets.
///
/// The (title, author) map catches cross-listings that never resolved an id;
/// the id map is exact and immune to title or author formatting drift. Both
/// are derived data, rebuilt in full on every run.
pub fn build_duplicate_maps(achievements: &[AchievementReport]) -> DedupeMaps {
    let mut by_title_author: HashMap<(String, String), DuplicateEntry> = HashMap::new();
    let mut by_id: HashMap<String, DuplicateEntry> = HashMap::new();

    for report in achievements {
        for book in &report.books {
            let key = (normalize(&book.title), normalize(&book.author));
            if !key.0.is_empty() {
                let entry = by_title_author.entry(key).or_insert_with(|| DuplicateEntry {
                    id: None,
                    title: book.title.clone(),
                    author: book.author.clone(),
                    achievements: Vec::new(),
                });
                push_unique(&mut entry.achievements, &report.name);
            }

            if let Some(id) = book.id.as_deref()
                && !id.trim().is_empty()
            {
                let entry = by_id.entry(id.trim().to_owned()).or_insert_with(|| {
                    DuplicateEntry {
                        id: Some(id.trim().to_owned()),
                        title: book.title.clone(),
                        author: book.author.clone(),
                        achievements: Vec::new(),
                    }
                });
                push_unique(&mut entry.achievements, &report.name);
            }
        }
    }

    DedupeMaps {
        duplicates_by_title_author: finish(by_title_author.into_values()),
        duplicates_by_id: finish(by_id.into_values()),
    }
}

fn normalize(field: &str) -> String {
    field.trim().to_lowercase()
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_owned());
    }
}

/// Keep entries referenced by more than one achievement, with deterministic
/// ordering inside and across entries.
fn finish(entries: impl Iterator<Item = DuplicateEntry>) -> Vec<DuplicateEntry> {
    let mut out = entries
        .filter(|entry| entry.achievements.len() > 1)
        .collect::<Vec<_>>();
    for entry in &mut out {
        entry.achievements.sort();
    }
    out.sort_by_cached_key(|entry| (entry.title.to_lowercase(), entry.author.to_lowercase()));
    out
}
