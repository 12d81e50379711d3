mod config;
mod repl;

use adwolf_client::{ChatClient, ChatController, EnvToken};
use clap::{Parser, Subcommand};
use config::AdwolfConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "adwolf", about = "AdWolf — AI marketing assistant terminal client")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "adwolf.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Open an existing thread by id
        #[arg(long)]
        thread: Option<String>,
    },
    /// Manage conversation threads
    Threads {
        #[command(subcommand)]
        action: ThreadAction,
    },
}

#[derive(Subcommand)]
enum ThreadAction {
    /// List threads
    List,
    /// Delete a thread
    Delete {
        /// Thread id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AdwolfConfig::load(&cli.config).await?;

    let credentials = Arc::new(EnvToken::new(config.api.token_env.clone()));
    let client = ChatClient::new(config.api.base_url.clone(), credentials);
    let mut controller = ChatController::new(client);

    match cli.command {
        Commands::Chat { thread } => {
            if let Err(err) = controller.refresh_threads().await {
                warn!(error = %err, "Could not load the thread list");
            }
            if let Some(id) = thread {
                controller.open_thread(&id).await?;
            }
            repl::run(controller).await
        }

        Commands::Threads { action } => match action {
            ThreadAction::List => {
                controller.refresh_threads().await?;
                if controller.threads().is_empty() {
                    println!("Henüz konuşma yok.");
                }
                for thread in controller.threads() {
                    println!(
                        "{}  {:>3} mesaj  {}",
                        thread.id, thread.message_count, thread.title
                    );
                }
                Ok(())
            }
            ThreadAction::Delete { id } => {
                controller.delete_thread(&id).await?;
                println!("Konuşma silindi: {id}");
                Ok(())
            }
        },
    }
}
