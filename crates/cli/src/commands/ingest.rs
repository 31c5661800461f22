//! `dualchat ingest`: Chunk, embed and append documents to the vector index.

use std::path::{Path, PathBuf};

use dualchat_knowledge::{FileIndex, Ingestor};
use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    paths: &[PathBuf],
    source_url: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let services = dualchat_providers::build_from_config(&config);

    let index = FileIndex::open(&config.knowledge_base.path);
    let ingestor = Ingestor::new(services.embedder.clone(), config.knowledge_base.chunk_size);

    info!(files = paths.len(), index = %index.path().display(), "Ingesting");
    let report = ingestor.ingest(paths, source_url, &index).await?;

    println!(
        "Indexed {} chunks from {} files into {}",
        report.chunks,
        report.files,
        index.path().display()
    );
    Ok(())
}
