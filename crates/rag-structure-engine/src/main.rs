use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use rag_structure_engine::utils::init_logger;
use rag_structure_engine::{Page, Settings, StructureEngine};

#[derive(Parser, Debug)]
#[command(
    name = "rag-structure-engine",
    version,
    about = "Outline and chunk extracted page text"
)]
struct Args {
    /// JSON array of `{"page_num": 1, "text": "..."}` objects, one file per document
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Settings file without extension (toml, yaml or json)
    #[arg(long, default_value = "config/settings")]
    config: PathBuf,

    /// Write chunk metadata records as JSON lines here instead of stdout
    #[arg(long)]
    chunks_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load_from(&args.config)?;
    init_logger(&settings.logging)?;

    let documents = args
        .inputs
        .iter()
        .map(|path| read_pages(path))
        .collect::<Result<Vec<_>>>()?;

    let engine = StructureEngine::new(&settings);
    let results = engine.extract_many(&documents);

    let mut lines = Vec::new();
    for (path, (chunks, outline)) in args.inputs.iter().zip(&results) {
        info!(
            "{}: title {:?}, {} chapters, {} chunks",
            path.display(),
            outline.title,
            outline.chapters.len(),
            chunks.len()
        );
        println!("{}", outline.to_json()?);

        for chunk in chunks {
            lines.push(serde_json::to_string(&chunk.to_metadata())?);
        }
    }

    match &args.chunks_out {
        Some(out) => std::fs::write(out, lines.join("\n"))
            .with_context(|| format!("writing {}", out.display()))?,
        None => lines.iter().for_each(|line| println!("{}", line)),
    }

    Ok(())
}

fn read_pages(path: &Path) -> Result<Vec<Page>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let pages =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(pages)
}
