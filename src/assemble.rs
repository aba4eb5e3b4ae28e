use chrono::{SecondsFormat, Utc};

use crate::dedupe::build_duplicate_maps;
use crate::formats::{AchievementReport, BookRecord, SeasonArtifact, SeasonMeta};

/// One achievement's extraction outcome plus its configured count bounds.
#[derive(Debug, Clone)]
pub struct AchievementOutcome {
    pub name: String,
    pub source_url: String,
    pub expected_min: usize,
    pub expected_max: usize,
    pub books: Vec<BookRecord>,
}

pub fn utc_now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Merge scrape outcomes into the season artifact. A book count outside its
/// achievement's expected range is an operator signal that the source layout
/// may have changed; it is logged and the records are kept as-is.
pub fn assemble(
    season: SeasonMeta,
    outcomes: Vec<AchievementOutcome>,
    generated_at: String,
) -> SeasonArtifact {
    let achievements = outcomes
        .into_iter()
        .map(report_from_outcome)
        .collect::<Vec<_>>();
    assemble_reports(season, achievements, generated_at)
}

/// Merge already-built reports (the `compile` path, where count bounds are
/// not available) into the season artifact, recomputing the duplicate maps.
pub fn assemble_reports(
    season: SeasonMeta,
    achievements: Vec<AchievementReport>,
    generated_at: String,
) -> SeasonArtifact {
    let dedupe = build_duplicate_maps(&achievements);
    SeasonArtifact {
        season,
        generated_at,
        achievements,
        dedupe,
    }
}

fn report_from_outcome(outcome: AchievementOutcome) -> AchievementReport {
    let book_count = outcome.books.len();
    if book_count < outcome.expected_min || book_count > outcome.expected_max {
        tracing::warn!(
            achievement = %outcome.name,
            book_count,
            expected_min = outcome.expected_min,
            expected_max = outcome.expected_max,
            "book count outside the expected range; verify the source URL and layout"
        );
    }

    AchievementReport {
        name: outcome.name,
        source_url: outcome.source_url,
        book_count,
        books: outcome.books,
    }
}
