use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workshop::api;
use workshop::client::{views, Poller, WorkshopClient};
use workshop::config::Config;
use workshop::models::{Draft, Entity, Idea, Learning, Note, Task};
use workshop::store::{Document, Store};

#[derive(Parser)]
#[command(name = "workshop")]
#[command(about = "Personal productivity dashboard backed by JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port for HTTP API (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address (overrides WORKSHOP_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Directory holding the collection documents (overrides WORKSHOP_DATA_DIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Poll a collection and print a summary on every refresh
    Watch {
        collection: CollectionName,

        /// Refresh interval in milliseconds
        #[arg(short, long, default_value = "2000")]
        interval_ms: u64,
    },
    /// Check server health
    Status {
        /// Keep checking every 5 seconds
        #[arg(short, long)]
        watch: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CollectionName {
    Tasks,
    Ideas,
    Drafts,
    Notes,
    Learnings,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "workshop=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve {
            port,
            host,
            data_dir,
        }) => serve(port, host, data_dir).await?,
        Some(Commands::Watch {
            collection,
            interval_ms,
        }) => {
            let client = WorkshopClient::from_env();
            let interval = Duration::from_millis(interval_ms);
            match collection {
                CollectionName::Tasks => watch::<Task>(client, interval, summarize_tasks).await,
                CollectionName::Ideas => watch::<Idea>(client, interval, summarize_ideas).await,
                CollectionName::Drafts => watch::<Draft>(client, interval, summarize_drafts).await,
                CollectionName::Notes => watch::<Note>(client, interval, summarize_notes).await,
                CollectionName::Learnings => {
                    watch::<Learning>(client, interval, summarize_learnings).await
                }
            }
        }
        Some(Commands::Status { watch }) => status(watch).await?,
        None => serve(None, None, None).await?,
    }

    Ok(())
}

async fn serve(
    port: Option<u16>,
    host: Option<String>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }

    tracing::info!("Data directory: {}", config.data_dir.display());
    if config.security.api_key.is_none() {
        tracing::warn!("WORKSHOP_API_KEY is not set; API is unauthenticated");
    }

    let store = Store::open(&config.data_dir);
    let app = api::create_router_with_config(store, config.security.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Workshop API listening on http://{}", config.bind_addr());

    axum::serve(listener, app).await?;
    Ok(())
}

async fn watch<E: Entity>(
    client: WorkshopClient,
    interval: Duration,
    summarize: fn(&Document<E>) -> String,
) {
    println!("Watching {} at {}", E::COLLECTION, client.base_url());

    let poller = Poller::<Document<E>>::collection_every(client, interval);
    let mut updates = poller.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                match (&state.data, &state.error) {
                    (_, Some(error)) => println!("[{}] error: {}", E::COLLECTION, error),
                    (Some(document), None) => println!("{}", summarize(document)),
                    (None, None) => {}
                }
            }
        }
    }

    poller.stop();
}

async fn status(watch: bool) -> anyhow::Result<()> {
    let client = WorkshopClient::from_env();

    if !watch {
        let health = client.health().await?;
        println!("{} ({})", health.status, health.timestamp);
        return Ok(());
    }

    let poller = Poller::health(client);
    let mut updates = poller.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                match (state.data, state.error) {
                    (_, Some(error)) => println!("down: {}", error),
                    (Some(health), None) => println!("{} ({})", health.status, health.timestamp),
                    (None, None) => {}
                }
            }
        }
    }
    Ok(())
}

fn summarize_tasks(document: &Document<Task>) -> String {
    let board = views::TaskBoard::new(&document.records);
    format!(
        "{} tasks: {} todo, {} in progress, {} done",
        document.records.len(),
        board.todo.len(),
        board.in_progress.len(),
        board.done.len()
    )
}

fn summarize_ideas(document: &Document<Idea>) -> String {
    let counts = views::ideas_by_category(&document.records)
        .into_iter()
        .map(|(category, count)| format!("{} {}", count, category))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} ideas ({})", document.records.len(), counts)
}

fn summarize_drafts(document: &Document<Draft>) -> String {
    let ready = views::ready_drafts(&document.records);
    let latest = document
        .records
        .first()
        .map(|d| format!(", latest by {} is {}", d.author.as_str(), d.status.as_str()))
        .unwrap_or_default();
    format!(
        "{} drafts, {} ready{}",
        document.records.len(),
        ready.len(),
        latest
    )
}

fn summarize_notes(document: &Document<Note>) -> String {
    let latest = document
        .records
        .last()
        .map(|n| format!(", latest: {} ({})", n.title, n.date))
        .unwrap_or_default();
    format!("{} notes{}", document.records.len(), latest)
}

fn summarize_learnings(document: &Document<Learning>) -> String {
    format!(
        "{} learnings, {} unread, cursor {}",
        document.records.len(),
        views::unread_count(&document.records),
        document.cursor().unwrap_or("-")
    )
}
