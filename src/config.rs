use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

use crate::fetch::DEFAULT_USER_AGENT;
use crate::formats::SeasonMeta;

/// Season config loaded from a JSON file. Missing required fields are fatal
/// at load time, before any network activity.
#[derive(Debug, Clone, Deserialize)]
pub struct SeasonConfig {
    pub output: OutputConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub enrich: EnrichConfig,
    #[serde(default)]
    pub compile: CompileConfig,
    #[serde(default)]
    pub achievements: Vec<AchievementConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub year: String,
    pub season: String,
    /// Season artifact path; `{year}` and `{season}` tokens are substituted
    /// lowercased.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub respect_delay_ms: u64,
    pub user_agent: String,
    pub save_html: bool,
    pub html_out_dir: String,
    pub on_source_error: SourceErrorPolicy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            respect_delay_ms: 600,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            save_html: false,
            html_out_dir: "fixtures/html".to_owned(),
            on_source_error: SourceErrorPolicy::Skip,
        }
    }
}

/// What to do when an achievement's source page cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorPolicy {
    /// Log a warning and continue with the remaining achievements.
    Skip,
    /// Fail the whole run.
    Abort,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub fill_missing_authors: bool,
    pub max_books_per_achievement: usize,
    pub respect_delay_ms: u64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            fill_missing_authors: true,
            max_books_per_achievement: 300,
            respect_delay_ms: 450,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    pub input_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AchievementConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub expected_min: usize,
    #[serde(default = "default_expected_max")]
    pub expected_max: usize,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_expected_max() -> usize {
    usize::MAX
}

fn default_enabled() -> bool {
    true
}

pub fn load(path: &Path) -> anyhow::Result<SeasonConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let config: SeasonConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parse config: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

impl SeasonConfig {
    fn validate(&self) -> anyhow::Result<()> {
        if self.output.year.trim().is_empty() {
            anyhow::bail!("config output.year must not be empty");
        }
        if self.output.season.trim().is_empty() {
            anyhow::bail!("config output.season must not be empty");
        }
        if self.output.path.trim().is_empty() {
            anyhow::bail!("config output.path must not be empty");
        }

        for achievement in &self.achievements {
            if achievement.name.trim().is_empty() {
                anyhow::bail!("achievement name must not be empty");
            }
            if achievement.url.trim().is_empty() {
                anyhow::bail!("achievement '{}' url must not be empty", achievement.name);
            }
            if achievement.expected_min > achievement.expected_max {
                anyhow::bail!(
                    "achievement '{}' expected_min exceeds expected_max",
                    achievement.name
                );
            }
        }

        Ok(())
    }

    pub fn season_meta(&self) -> SeasonMeta {
        SeasonMeta {
            year: self.output.year.trim().to_owned(),
            name: self.output.season.trim().to_owned(),
        }
    }

    /// Season artifact path with `{year}`/`{season}` tokens substituted.
    pub fn season_path(&self) -> PathBuf {
        let year = self.output.year.trim().to_lowercase();
        let season = self.output.season.trim().to_lowercase();
        PathBuf::from(
            self.output
                .path
                .replace("{year}", &year)
                .replace("{season}", &season),
        )
    }

    /// Directory holding per-achievement JSON files.
    pub fn achievements_dir(&self) -> PathBuf {
        match &self.compile.input_dir {
            Some(dir) => PathBuf::from(dir),
            None => {
                let year = self.output.year.trim().to_lowercase();
                let season = self.output.season.trim().to_lowercase();
                Path::new("data").join(year).join(season).join("achievements")
            }
        }
    }
}
