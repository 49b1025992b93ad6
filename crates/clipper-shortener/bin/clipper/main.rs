use anyhow::Context;
use clap::Parser;
use clipper_shortener::{build_service, telemetry, Settings};
use tracing::info;

/// Shortens each URL given on the command line and prints `code url`.
#[derive(Debug, Parser)]
#[command(name = "clipper")]
struct CLI {
    #[command(flatten)]
    settings: Settings,

    #[arg(required = true)]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init()?;

    let config = CLI::parse();
    info!(
        storage_backend = %config.settings.storage,
        urls = config.urls.len(),
        "starting clipper"
    );

    let service = build_service(&config.settings).await?;
    for url in &config.urls {
        let record = service
            .shorten(url)
            .await
            .with_context(|| format!("failed to shorten {url}"))?;
        println!("{} {}", record.code, record.original_url);
    }

    Ok(())
}
