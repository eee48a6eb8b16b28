//! codelore CLI — the main entry point.
//!
//! Takes a single instruction, runs the context-augmentation loop against
//! the configured model and knowledge store, streams each intermediate
//! exchange to stderr, and prints the final answer to stdout.

use clap::Parser;
use codelore_agent::{AugmentLoop, DirectiveMode};
use codelore_config::AppConfig;
use codelore_core::codec::TokenCodec;
use codelore_core::event::{EventBus, LoopEvent};
use codelore_search::{QdrantClient, QdrantRetriever};
use codelore_tokenizer::HfCodec;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "codelore",
    about = "Context-augmented question answering over a code knowledge base",
    version,
    author
)]
struct Cli {
    /// The instruction or question to answer
    instruction: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing instruction is a usage error, exit code 1. clap would exit
    // with 2 if the argument were required, so it is optional here and
    // checked by hand.
    let Some(instruction) = cli.instruction else {
        eprintln!("Usage: codelore '<instruction>'");
        std::process::exit(1);
    };

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    debug!(?config, "Configuration loaded");

    let provider = codelore_providers::build_from_config(&config);

    let retriever = Arc::new(QdrantRetriever::new(
        QdrantClient::new(&config.search.url, config.search.api_key.clone()),
        provider.clone(),
        &config.provider.embed_model,
        &config.search.collection,
    ));

    let codec: Arc<dyn TokenCodec> = match &config.tokenizer.file {
        Some(path) => Arc::new(
            HfCodec::from_file(Path::new(path))
                .map_err(|e| format!("Failed to load tokenizer from '{path}': {e}"))?,
        ),
        None => Arc::new(
            HfCodec::from_pretrained(&config.tokenizer.repo)
                .map_err(|e| format!("Failed to fetch tokenizer '{}': {e}", config.tokenizer.repo))?,
        ),
    };

    let mode: DirectiveMode = config
        .run
        .directive_mode
        .parse()
        .map_err(|e| format!("Bad configuration: {e}"))?;

    let event_bus = Arc::new(EventBus::default());
    let printer = tokio::spawn(print_events(event_bus.subscribe()));

    let agent = AugmentLoop::new(
        provider,
        retriever,
        codec,
        event_bus,
        &config.provider.chat_model,
    )
    .with_temperature(config.provider.temperature)
    .with_max_iterations(config.run.max_iterations)
    .with_context_budget(config.run.context_budget())
    .with_search_limit(config.search.limit)
    .with_directive_mode(mode)
    .with_forbidden_paths(config.run.forbidden_paths.clone());

    let answer = agent.run(&instruction).await?;

    // The loop holds the last sender; dropping it closes the channel so the
    // printer drains every buffered event before exiting.
    drop(agent);
    printer.await?;

    println!("{answer}");

    Ok(())
}

/// Narrate the loop on stderr while it runs. Returns once every sender is
/// gone and the channel has been drained.
async fn print_events(mut rx: tokio::sync::broadcast::Receiver<Arc<LoopEvent>>) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return,
        };

        match event.as_ref() {
            LoopEvent::ResponseReceived {
                iteration, content, ..
            } => {
                eprintln!("--- iteration {iteration} ---");
                eprintln!("{content}");
            }
            LoopEvent::KnowledgeRetrieved {
                query, snippets, ..
            } => {
                eprintln!("[search '{query}': {snippets} snippet(s)]");
            }
            LoopEvent::FileFetched { path, found, .. } => {
                if *found {
                    eprintln!("[read file '{path}']");
                } else {
                    eprintln!("[file '{path}' unavailable]");
                }
            }
            LoopEvent::ContextTruncated {
                before_tokens,
                after_tokens,
                ..
            } => {
                eprintln!("[context trimmed: {before_tokens} -> {after_tokens} tokens]");
            }
            LoopEvent::CeilingReached { iterations, .. } => {
                eprintln!("[no final answer after {iterations} iterations, forcing one]");
            }
        }
    }
}
