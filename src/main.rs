use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use wayfarer_api::RestApi;
use wayfarer_embedding::{Embedder, HashEmbedder, OpenAiEmbedder, OpenAiEmbedderConfig};
use wayfarer_storage::StorageManager;
use wayfarer_travel::{
    check_api_key, AllowAllModerator, AssistantConfig, DocumentBuilder, GroundingPolicy, Indexer,
    Moderator, OpenAiModerator, PolicyReasoner, RandomPrices, RecordStore, SeedData,
    TravelAssistant,
};

/// Retrieval-grounded travel recommendations
#[derive(Parser, Debug)]
#[command(name = "wayfarer")]
#[command(about = "Hotel, flight and experience recommendations over a fixed catalogue", long_about = None)]
struct Args {
    /// Root directory of the collection directories
    #[arg(short, long, env = "DB_PATH", default_value = "./data/store")]
    data_dir: PathBuf,

    /// Directory holding hotels.json, flights.json and experiences.json
    #[arg(long, default_value = "./data/seed")]
    seed_dir: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    http_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Remote embedding model; the local hashing embedder is used when unset
    #[arg(long, env = "EMBEDDING_MODEL")]
    embedding_model: Option<String>,

    /// Embedding dimension
    #[arg(long, default_value_t = 256)]
    embedding_dim: usize,

    /// Key for the embedding and moderation provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, default_value = "https://api.openai.com/v1")]
    api_base: String,

    /// Timeout for every external call, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Only check the recommendations that are present
    #[arg(long)]
    lenient_grounding: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Populate empty collections, then serve HTTP (default)
    Serve,
    /// Populate empty collections and exit
    Ingest,
    /// Delete all three collections
    Reset,
}

fn embedder(args: &Args, timeout: Duration) -> anyhow::Result<Arc<dyn Embedder>> {
    match &args.embedding_model {
        Some(model) => {
            let api_key = check_api_key(args.api_key.as_deref())?;
            let embedder = OpenAiEmbedder::new(OpenAiEmbedderConfig {
                api_base: args.api_base.clone(),
                api_key: api_key.to_string(),
                model: model.clone(),
                dimensions: args.embedding_dim,
                timeout,
            })?;
            info!("Embedding with remote model {}", model);
            Ok(Arc::new(embedder))
        }
        None => {
            info!("Embedding with local feature hashing ({} dims)", args.embedding_dim);
            Ok(Arc::new(HashEmbedder::new(args.embedding_dim)?))
        }
    }
}

fn moderator(args: &Args, timeout: Duration) -> anyhow::Result<Arc<dyn Moderator>> {
    match args.api_key.as_deref() {
        Some(key) => {
            let key = check_api_key(Some(key))?;
            Ok(Arc::new(OpenAiModerator::new(args.api_base.clone(), key, timeout)?))
        }
        None => {
            warn!("OPENAI_API_KEY is not set, content moderation disabled");
            Ok(Arc::new(AllowAllModerator))
        }
    }
}

async fn ingest(store: Arc<RecordStore>, seed_dir: &Path) -> anyhow::Result<()> {
    let seed = SeedData::load(seed_dir)?;
    info!("Loaded {} seed records from {:?}", seed.len(), seed_dir);

    let indexer = Indexer::new(store, DocumentBuilder::new(Arc::new(RandomPrices::new())));
    for report in indexer.populate_all(&seed).await? {
        if !report.failures.is_empty() {
            warn!(
                domain = %report.domain,
                failed = report.failures.len(),
                "some records were not indexed"
            );
        }
        info!("{}: {:?}", report.domain, report.outcome);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Wayfarer v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let timeout = Duration::from_millis(args.timeout_ms);
    let storage = Arc::new(StorageManager::new(&args.data_dir)?);
    let store = Arc::new(RecordStore::open(storage, embedder(&args, timeout)?)?.with_timeout(timeout));
    info!("Record store initialized");

    let command = args.command.unwrap_or(Command::Serve);
    match command {
        Command::Reset => {
            store.delete_all()?;
            info!("All collections deleted");
            return Ok(());
        }
        Command::Ingest => {
            ingest(store, &args.seed_dir).await?;
            return Ok(());
        }
        Command::Serve => ingest(store.clone(), &args.seed_dir).await?,
    }

    let grounding = if args.lenient_grounding {
        GroundingPolicy::PresentOnly
    } else {
        GroundingPolicy::RequireAll
    };
    let assistant = Arc::new(TravelAssistant::new(
        store,
        moderator(&args, timeout)?,
        Arc::new(PolicyReasoner),
        AssistantConfig {
            timeout,
            grounding,
            ..Default::default()
        },
    ));

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(assistant, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("Wayfarer started successfully");
    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
