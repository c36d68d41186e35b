mod cli;
mod preview;

use anyhow::{Context, Result};
use clap::Parser;
use grada_core::catalog::Catalog;
use grada_media::MediaSource;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin().clone(),
    };

    if args.list {
        for preset in catalog.iter() {
            println!(
                "{:<14} {:<18} {}",
                preset.category.label(),
                preset.key().unwrap_or("-"),
                preset.name
            );
        }
        return Ok(());
    }

    let input = args.input.clone().context("no input image given")?;
    let source = MediaSource::from_path(&input);

    let session = args.build_session(&catalog, source.kind())?;

    let snapshot = session.snapshot();
    info!(
        input = %input.display(),
        preset = args.preset.as_deref().unwrap_or("none"),
        passthrough = snapshot.plan.is_passthrough(),
        "grading"
    );

    let frame = preview::render(&source, &snapshot, args.cpu).await?;

    let output = args.output_path(&input);
    preview::save_png(&frame, &output)?;
    info!(output = %output.display(), width = frame.width, height = frame.height, "wrote preview");
    Ok(())
}
