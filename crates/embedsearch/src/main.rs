use clap::{Parser, Subcommand};
use embedsearch_common::{logger, AppConfig, EmbedSearchError};
use embedsearch_embedding::OllamaClient;
use embedsearch_vector::{render, PgDocumentStore, RetrievalEngine, RetrievalOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    }
}

#[derive(Parser)]
#[command(name = "embedsearch")]
#[command(about = "Store texts with embeddings and find similar ones", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a text and store it
    Insert {
        /// Text to insert
        text: String,
    },

    /// Find stored texts similar to a query text
    Query {
        /// Query text
        text: String,

        /// Largest store distance to keep (overrides MAX_DISTANCE)
        #[arg(long)]
        max_distance: Option<f64>,

        /// Maximum number of results (overrides MAX_RESULTS)
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_cancelled() => {
            eprintln!("Interrupted");
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), EmbedSearchError> {
    // Project root .env wins over the working directory one read by from_env()
    load_dotenv_from_project_root();

    let mut config = AppConfig::from_env()?;

    if let Commands::Query { max_distance, limit, .. } = &cli.command {
        if let Some(max_distance) = max_distance {
            config.max_distance = *max_distance;
        }
        if limit.is_some() {
            config.max_results = *limit;
        }
        config.validate()?;
    }

    match &config.log_dir {
        Some(log_dir) => logger::setup_logging(log_dir, &config.log_level)?,
        None => logger::setup_console_logging(&config.log_level)?,
    }

    tracing::info!("EmbedSearch starting...");
    tracing::debug!("  Ollama: {} ({})", config.ollama_base_url, config.embedding_model);
    tracing::debug!("  Table: {}", config.documents_table);

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            ctrl_c_token.cancel();
        }
    });

    let store = PgDocumentStore::connect(&config).await?;
    store.verify_schema().await?;

    let embedder = OllamaClient::from_config(&config)?;
    let engine = RetrievalEngine::new(
        Arc::new(embedder),
        Arc::new(store),
        RetrievalOptions::from_config(&config),
    )
    .with_cancellation(cancel);

    match cli.command {
        Commands::Insert { text } => {
            let id = engine.insert(&text).await?;
            println!("{}", render::insert_confirmation(id));
        }
        Commands::Query { text, .. } => {
            let outcome = engine.query(&text).await?;
            println!("{}", render::render_outcome(&outcome));
        }
    }

    Ok(())
}
