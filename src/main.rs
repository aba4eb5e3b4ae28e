use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    seasonscrape::logging::init().context("init logging")?;

    let cli = seasonscrape::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        seasonscrape::cli::Command::Scrape(args) => {
            seasonscrape::scrape::run(args).await.context("scrape")?;
        }
        seasonscrape::cli::Command::Compile(args) => {
            seasonscrape::compile::run(args).context("compile")?;
        }
    }

    Ok(())
}
