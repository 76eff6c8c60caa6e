use anyhow::{Context, Result};
use arxiv_chat::config::load_config;
use arxiv_chat::llm::AnthropicClient;
use arxiv_chat::shell::run_shell;
use arxiv_chat::sources::ArxivSource;
use arxiv_chat::utils::HttpClient;
use arxiv_chat::{Chatbot, PaperStore, ToolRegistry};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// arXiv Chat - ask questions about papers; the model searches arXiv for you
#[derive(Parser, Debug)]
#[command(name = "arxiv-chat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive assistant for finding and summarizing arXiv papers", long_about = None)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path (default: ./arxiv-chat.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory where paper metadata is stored
    #[arg(long)]
    papers_dir: Option<PathBuf>,

    /// Model to use
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; the key may come from the environment directly
    dotenvy::dotenv().ok();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.papers_dir {
        config.storage.papers_dir = dir;
    }
    if let Some(model) = cli.model {
        config.anthropic.model = model;
    }

    let log_level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.logging.level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    // Logs go to stderr so they stay out of the chat transcript
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("arxiv_chat={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let http = Arc::new(HttpClient::from_config(&config.http).context("Failed to create HTTP client")?);
    let llm = AnthropicClient::new(Arc::clone(&http), &config.anthropic)?;
    let source = ArxivSource::new(Arc::clone(&http));
    let store = PaperStore::new(&config.storage.papers_dir);

    tracing::info!(
        "Using model {} with papers stored in {}",
        llm.model(),
        store.root().display()
    );

    let tools = ToolRegistry::new(Arc::new(source), store);
    let mut chatbot = Chatbot::new(Arc::new(llm), tools, config.anthropic.max_tokens);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    run_shell(&mut chatbot, stdin.lock(), &mut stdout).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_no_flags() {
        let cli = Cli::try_parse_from(["arxiv-chat"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.papers_dir.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "arxiv-chat",
            "-vv",
            "--papers-dir",
            "/tmp/papers",
            "--model",
            "claude-test",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.papers_dir, Some(PathBuf::from("/tmp/papers")));
        assert_eq!(cli.model.as_deref(), Some("claude-test"));
    }
}
