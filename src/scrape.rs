use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::assemble::{self, AchievementOutcome};
use crate::cli::ScrapeArgs;
use crate::config::{self, AchievementConfig, SeasonConfig, SourceErrorPolicy};
use crate::enrich;
use crate::extract;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::formats::{AchievementFile, SeasonArtifact, SeasonMeta};
use crate::store;

pub async fn run(args: ScrapeArgs) -> anyhow::Result<()> {
    let config = config::load(Path::new(&args.config)).context("load config")?;
    let fetcher = HttpFetcher::new(&config.scrape.user_agent).context("build http fetcher")?;

    let artifact = scrape_season(&config, &fetcher, &args).await?;

    if args.dry_run {
        let books: usize = artifact.achievements.iter().map(|a| a.book_count).sum();
        tracing::info!(
            achievements = artifact.achievements.len(),
            books,
            "dry run complete; nothing written"
        );
        return Ok(());
    }

    let out_path = config.season_path();
    store::write_json(&out_path, &artifact).context("write season artifact")?;
    tracing::info!(path = %out_path.display(), "wrote season artifact");

    Ok(())
}

/// Run the full pipeline: one achievement at a time, fetch → extract →
/// enrich → per-achievement file, with the configured delay between
/// achievements, then assemble the season artifact.
pub async fn scrape_season(
    config: &SeasonConfig,
    fetcher: &dyn PageFetcher,
    args: &ScrapeArgs,
) -> anyhow::Result<SeasonArtifact> {
    let season = config.season_meta();
    let achievements_dir = config.achievements_dir();
    let scrape_delay = Duration::from_millis(config.scrape.respect_delay_ms);
    let enrich_delay = Duration::from_millis(config.enrich.respect_delay_ms);

    let selected = select_achievements(&config.achievements, &args.only);
    if selected.is_empty() {
        anyhow::bail!("no achievements selected");
    }

    let mut outcomes = Vec::new();
    for achievement in selected {
        tracing::info!(
            achievement = %achievement.name,
            url = %achievement.url,
            "fetching source page"
        );

        let html = match fetcher.fetch(&achievement.url).await {
            Ok(html) => html,
            Err(err) => match config.scrape.on_source_error {
                SourceErrorPolicy::Skip => {
                    tracing::warn!(
                        achievement = %achievement.name,
                        error = %format!("{err:#}"),
                        "source page fetch failed; skipping achievement"
                    );
                    tokio::time::sleep(scrape_delay).await;
                    continue;
                }
                SourceErrorPolicy::Abort => {
                    return Err(err).with_context(|| {
                        format!("fetch source page for '{}'", achievement.name)
                    });
                }
            },
        };

        if (args.save_html || config.scrape.save_html) && !args.dry_run {
            let html_path = store::source_html_path(
                Path::new(&config.scrape.html_out_dir),
                &season.year,
                &season.name,
                &achievement.name,
            );
            store::write_source_html(&html_path, &html).context("save source html")?;
        }

        let base = Url::parse(&achievement.url)
            .with_context(|| format!("parse achievement url: {}", achievement.url))?;
        let mut books = extract::extract_cards(&html, &base);
        tracing::info!(
            achievement = %achievement.name,
            count = books.len(),
            "extracted book cards"
        );

        if config.enrich.fill_missing_authors && !args.dry_run {
            let filled = enrich::enrich_missing_authors(
                fetcher,
                &mut books,
                config.enrich.max_books_per_achievement,
                enrich_delay,
            )
            .await;
            tracing::info!(achievement = %achievement.name, filled, "filled missing authors");
        }

        let outcome = AchievementOutcome {
            name: achievement.name.clone(),
            source_url: achievement.url.clone(),
            expected_min: achievement.expected_min,
            expected_max: achievement.expected_max,
            books,
        };

        if !args.dry_run {
            write_achievement_file(&achievements_dir, &season, &outcome)
                .with_context(|| format!("write achievement file for '{}'", outcome.name))?;
        }
        outcomes.push(outcome);

        tokio::time::sleep(scrape_delay).await;
    }

    Ok(assemble::assemble(
        season,
        outcomes,
        assemble::utc_now_rfc3339(),
    ))
}

/// `--only` names select achievements explicitly (even disabled ones);
/// without it, every enabled achievement runs.
fn select_achievements<'a>(
    all: &'a [AchievementConfig],
    only: &[String],
) -> Vec<&'a AchievementConfig> {
    if only.is_empty() {
        return all.iter().filter(|a| a.enabled).collect();
    }

    let wanted = only
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect::<HashSet<_>>();
    all.iter()
        .filter(|a| wanted.contains(&a.name.trim().to_lowercase()))
        .collect()
}

fn write_achievement_file(
    dir: &Path,
    season: &SeasonMeta,
    outcome: &AchievementOutcome,
) -> anyhow::Result<()> {
    let file = AchievementFile {
        generated_at: assemble::utc_now_rfc3339(),
        season: Some(season.clone()),
        name: outcome.name.clone(),
        source_url: outcome.source_url.clone(),
        book_count: outcome.books.len(),
        books: outcome.books.clone(),
    };

    let path = dir.join(format!("{}.json", store::slug(&outcome.name)));
    store::write_json(&path, &file)?;
    tracing::info!(path = %path.display(), books = file.book_count, "wrote achievement file");

    Ok(())
}
