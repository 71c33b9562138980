use anyhow::Result;
use clap::{Parser, Subcommand};
use rag_ingest::config::ChunkSettings;
use rag_ingest::document::DocumentLoader;
use rag_ingest::utils::logger::init_logger;
use rag_ingest::worker::{chunk_document, ChunkSummary};
use rag_ingest::{DocumentProcessor, Settings};
use rag_store::{DbPool, HttpEmbeddingClient, PgVectorStore, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "rag-ingest",
    version,
    about = "Chunk documents and load them into a vector index"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, chunk, embed and store a document
    Ingest {
        /// PDF, text or spreadsheet file
        file: PathBuf,

        /// Target index (default: ingest.index_name)
        #[arg(long)]
        index: Option<String>,
    },

    /// Show dimension and chunk count of an index
    Stats { name: String },

    /// List all indexes
    List,

    /// Delete one index, or every index with --all
    DeleteIndex {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,

        #[arg(long)]
        all: bool,
    },

    /// Print chunks as JSON lines without embedding or storing
    Chunk { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Offline: only the chunking and loader sections are needed.
        Command::Chunk { file } => {
            let settings = ChunkSettings::load()?;
            init_logger()?;
            print_chunks(&settings, &file)
        }
        command => {
            let settings = Settings::load()?;
            init_logger()?;
            run(command, &settings).await
        }
    }
}

async fn run(command: Command, settings: &Settings) -> Result<()> {
    let (pool, store) = connect(settings).await?;

    match command {
        Command::Ingest { file, index } => {
            let index_name = index.unwrap_or_else(|| settings.ingest.index_name.clone());
            let processor = DocumentProcessor::new(settings, store)?;
            let report = processor.process_file(&file, &index_name).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Stats { name } => {
            let stats = store.describe_index(&name).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::List => {
            for name in store.list_indexes().await? {
                println!("{}", name);
            }
        }
        Command::DeleteIndex { name, all } => match name {
            Some(name) if !all => {
                if !store.delete_index(&name).await? {
                    anyhow::bail!("Index not found: {}", name);
                }
            }
            _ => {
                let deleted = store.delete_all_indexes().await?;
                info!("Deleted {} indexes", deleted);
            }
        },
        Command::Chunk { file } => print_chunks(&settings.chunk_settings(), &file)?,
    }

    pool.close().await;
    Ok(())
}

async fn connect(settings: &Settings) -> Result<(DbPool, Arc<dyn VectorStore>)> {
    let pool = DbPool::new(&settings.database).await?;
    let embedder = Arc::new(HttpEmbeddingClient::new(settings.embedding.clone())?);

    let store = PgVectorStore::new(pool.clone(), embedder);
    store.migrate().await?;

    Ok((pool, Arc::new(store)))
}

fn print_chunks(settings: &ChunkSettings, file: &Path) -> Result<()> {
    let loader = DocumentLoader::from_config(&settings.loader)?;
    let document = loader.load(file)?;

    let (text_chunks, table_chunks) = chunk_document(
        &document,
        &settings.chunking.paragraph_chunker()?,
        &settings.chunking.table_chunker()?,
    );

    for (index, chunk) in text_chunks.iter().chain(&table_chunks).enumerate() {
        println!("{}", serde_json::to_string(&ChunkSummary::new(index, chunk))?);
    }

    Ok(())
}
