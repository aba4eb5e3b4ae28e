use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;
use serde::Serialize;

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// File-name slug: lowercase alphanumeric runs joined by underscores.
pub fn slug(name: &str) -> String {
    SLUG_RE
        .replace_all(&name.trim().to_lowercase(), "_")
        .trim_matches('_')
        .to_owned()
}

pub fn write_json(path: &Path, value: &impl Serialize) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let mut json = serde_json::to_string_pretty(value).context("serialize json")?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("write json: {}", path.display()))?;

    Ok(())
}

/// Path for a saved copy of a fetched source page, used to build fixtures.
pub fn source_html_path(dir: &Path, year: &str, season: &str, achievement: &str) -> PathBuf {
    dir.join(format!(
        "{}_{}_{}.html",
        slug(year),
        slug(season),
        slug(achievement)
    ))
}

pub fn write_source_html(path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create html dir: {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("write html: {}", path.display()))?;
    Ok(())
}
