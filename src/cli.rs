use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape challenge pages and write the season artifact.
    Scrape(ScrapeArgs),
    /// Merge previously written per-achievement files into the season artifact.
    Compile(CompileArgs),
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Path to the season config JSON.
    #[arg(long, default_value = "config/season.json")]
    pub config: String,

    /// Scrape only the named achievements (repeatable, case-insensitive).
    #[arg(long)]
    pub only: Vec<String>,

    /// Preflight: extract without enriching or writing any output.
    #[arg(long)]
    pub dry_run: bool,

    /// Save fetched source pages (for fixture building).
    #[arg(long)]
    pub save_html: bool,
}

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Path to the season config JSON.
    #[arg(long, default_value = "config/season.json")]
    pub config: String,

    /// Override the per-achievement input directory.
    #[arg(long)]
    pub input_dir: Option<String>,

    /// Override the season artifact output path.
    #[arg(long)]
    pub out: Option<String>,
}
