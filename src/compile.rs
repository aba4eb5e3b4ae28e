use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assemble;
use crate::cli::CompileArgs;
use crate::config;
use crate::formats::{AchievementFile, AchievementReport};
use crate::store;

/// Merge per-achievement JSON files into the season artifact without any
/// network activity. Duplicate maps and book counts are recomputed from the
/// files' record sets, never trusted from input.
pub fn run(args: CompileArgs) -> anyhow::Result<()> {
    let config = config::load(Path::new(&args.config)).context("load config")?;

    let input_dir = args
        .input_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.achievements_dir());
    let out_path = args
        .out
        .map(PathBuf::from)
        .unwrap_or_else(|| config.season_path());

    let reports = read_achievement_files(&input_dir)?;
    if reports.is_empty() {
        anyhow::bail!(
            "no achievement files found in {}",
            input_dir.display()
        );
    }

    let books: usize = reports.iter().map(|report| report.book_count).sum();
    let artifact = assemble::assemble_reports(
        config.season_meta(),
        reports,
        assemble::utc_now_rfc3339(),
    );

    store::write_json(&out_path, &artifact).context("write season artifact")?;
    tracing::info!(
        path = %out_path.display(),
        achievements = artifact.achievements.len(),
        books,
        "wrote season artifact"
    );

    Ok(())
}

/// Read `*.json` files in file-name order. A file that does not parse as an
/// achievement is skipped with a warning rather than failing the merge.
fn read_achievement_files(dir: &Path) -> anyhow::Result<Vec<AchievementReport>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("read achievements dir: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut reports = Vec::new();
    for path in paths {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read achievement file: {}", path.display()))?;
        let file: AchievementFile = match serde_json::from_str(&contents) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    %err,
                    "skipping malformed achievement file"
                );
                continue;
            }
        };

        reports.push(AchievementReport {
            book_count: file.books.len(),
            name: file.name,
            source_url: file.source_url,
            books: file.books,
        });
    }

    Ok(reports)
}
