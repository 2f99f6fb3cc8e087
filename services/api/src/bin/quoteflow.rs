//! services/api/src/bin/quoteflow.rs
//!
//! A terminal client for a running QuoteFlow server. Saved quotes and the
//! daily generation count persist in a local storage file between runs.

use api_lib::{
    adapters::{FileKeyValueStore, HttpQuoteEndpoint},
    cli::{self, Command},
    config::Config,
    error::ApiError,
};
use quoteflow_core::{
    domain::Category,
    ports::SystemClock,
    store::QuotesStore,
    QuoteGenerator,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Oops! Something went wrong: {}", e);
        if matches!(e, ApiError::Usage(_)) {
            eprintln!("\n{}", cli::USAGE);
        } else {
            eprintln!("Please try again in a moment.");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ApiError> {
    let command = Command::parse(std::env::args().skip(1))?;

    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let storage = Arc::new(FileKeyValueStore::new(config.store_path.clone()));
    info!(path = %storage.path().display(), "Using local quote storage.");
    let store = QuotesStore::initialize(storage, Arc::new(SystemClock)).await;

    match command {
        Command::Categories => {
            for category in Category::all() {
                println!("{}", cli::render_category(&category));
            }
        }
        Command::Saved => {
            if store.saved_quotes().is_empty() {
                println!("No saved quotes yet.");
            }
            for quote in store.saved_quotes() {
                println!("{}\n", cli::render_quote(quote));
            }
        }
        Command::Count => {
            println!("Quotes generated today: {}", store.quotes_generated_today());
        }
        Command::Remove { id } => {
            let mut store = store;
            let known = store.saved_quotes().iter().any(|q| q.id == id);
            store.remove_saved_quote(&id).await;
            if known {
                println!("Removed {}.", id);
            } else {
                println!("No saved quote with id {}.", id);
            }
        }
        Command::Generate { category, save } => {
            let endpoint = Arc::new(HttpQuoteEndpoint::new(reqwest::Client::new(), &config.api_url));
            let generator = QuoteGenerator::new(endpoint, Arc::new(Mutex::new(store)));

            println!("Generating your perfect quote...");
            let quote = generator.generate(category.as_deref()).await?;
            println!("{}", cli::render_quote(&quote));

            let mut store = generator.store().lock().await;
            if save {
                store.save_current_quote().await;
                println!("Saved. You have {} saved quotes.", store.saved_quotes().len());
            } else {
                store.reject_current_quote();
            }
            println!("Quotes generated today: {}", store.quotes_generated_today());
        }
    }

    Ok(())
}
