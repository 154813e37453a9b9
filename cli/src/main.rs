//! CLI entrypoint for cowrite
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use cowrite_application::{CollaborationCoordinator, CollaborationProgress, DocumentStore};
use cowrite_domain::InstructionRef;
use cowrite_infrastructure::{
    ConfigLoader, FileConfig, FileDocumentStore, HttpLlmGateway, InMemoryChatStore,
    InMemoryDocumentStore, JsonlConversationLogger,
};
use cowrite_presentation::{
    ChatRepl, Cli, ConsoleFormatter, ConsoleReviewer, ProgressReporter, SimpleProgress,
    send_message,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE_PREFIX: &str = "cowrite.log";

/// Console logging by verbosity, plus a file layer when a log directory is set.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(EnvFilter::new(level))
            .with(console_layer)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow!("Failed to create log directory {}: {e}", dir.display()))?;
    let (non_blocking, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(Some(guard))
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("Failed to load configuration: {e}"))
}

/// Where the conversation log goes: the log directory, or the data dir.
fn conversation_log_dir(log_dir: Option<&Path>) -> Option<PathBuf> {
    log_dir
        .map(Path::to_path_buf)
        .or_else(|| dirs::data_dir().map(|d| d.join("cowrite").join("logs")))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = load_config(&cli)?;

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| config.logging.dir.as_ref().map(PathBuf::from));
    let _log_guard = init_logging(cli.verbose, log_dir.as_deref())?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting cowrite");

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config: {issue}");
        }
        bail!("Invalid configuration ({} issue(s))", issues.len());
    }

    // === Roster ===
    let library = config.instruction_library();
    let mut roster = config.roster()?;
    for spec in &cli.agent {
        let instruction = InstructionRef::new(spec.instruction.as_str());
        if !library.contains(&instruction) {
            bail!(
                "--agent {}: unknown instruction '{}'",
                spec.label,
                spec.instruction
            );
        }
        roster.add_agent(spec.label.as_str(), instruction)?;
    }
    if let Some(turns) = cli.turns {
        roster.set_turns(turns);
    }

    // === Dependency Injection ===
    let endpoint = cli
        .endpoint
        .clone()
        .unwrap_or_else(|| config.service.endpoint.clone());
    let gateway = Arc::new(
        HttpLlmGateway::new(endpoint)?
            .with_model(config.service.model.as_str())
            .with_max_tokens(config.service.max_tokens),
    );

    let document_store: Arc<dyn DocumentStore> = match &cli.document {
        Some(path) => Arc::new(FileDocumentStore::new(path)),
        None => Arc::new(InMemoryDocumentStore::new(None)),
    };

    let mut reviewer = ConsoleReviewer::new();
    if let Some(path) = &config.output.review_file {
        reviewer = reviewer.with_output_file(path);
    }

    let mut coordinator = CollaborationCoordinator::new(
        gateway,
        Arc::clone(&document_store),
        Arc::new(InMemoryChatStore::new()),
        Arc::new(reviewer),
        config.behavior_config(),
    )
    .with_roster(roster, library);

    if config.logging.conversation_log {
        match conversation_log_dir(log_dir.as_deref()).and_then(JsonlConversationLogger::in_dir) {
            Some(logger) => {
                info!(path = %logger.path().display(), "Conversation log enabled");
                coordinator = coordinator.with_logger(Arc::new(logger));
            }
            None => warn!("Conversation log requested but no log file could be opened"),
        }
    }

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(coordinator, document_store).with_progress(!cli.quiet);
        repl.run().await?;
        return Ok(());
    }

    // Single message mode - message is required
    let Some(message) = cli.message.clone() else {
        bail!("A message is required. Use --chat for interactive mode.");
    };

    if !cli.quiet {
        println!();
        println!("+============================================================+");
        println!("|                    cowrite - Collaboration                 |");
        println!("+============================================================+");
        println!();
        let roster = coordinator.roster();
        print!(
            "{}",
            ConsoleFormatter::format_roster(
                &roster.full_roster(),
                coordinator.library(),
                roster.configured_turns()
            )
        );
        println!();
    }

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let progress: Box<dyn CollaborationProgress> = if cli.quiet {
        Box::new(SimpleProgress)
    } else {
        Box::new(ProgressReporter::new())
    };
    let ok = send_message(&coordinator, &message, progress.as_ref(), &cancel).await;
    watcher.abort();

    if !ok {
        bail!("Request failed");
    }
    Ok(())
}
