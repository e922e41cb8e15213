use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use garden_quiz::constants::DEFAULT_PORT;
use garden_quiz::llm_interaction::OllamaClient;
use garden_quiz::web_server::{self, WebConfig};
use garden_quiz::{terminal, AnswerRecord, Page, QuizForm, View};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the garden quiz and chat web UI.
    Start {
        #[arg(long, default_value_t = DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
        #[arg(long, help = "Directory holding the page templates [default: $GARDEN_TEMPLATE_DIR or templates]")]
        templates: Option<PathBuf>,
        #[arg(long, help = "Directory served under /static [default: $GARDEN_STATIC_DIR or static]")]
        static_dir: Option<PathBuf>,
    },
    /// Take the garden quiz in the terminal, then chat about the results.
    Quiz {
        #[arg(long, help = "Print the prompt and exit instead of starting a chat.")]
        no_chat: bool,
    },
    /// Print the prompt for a JSON file of quiz answers.
    Prompt {
        #[arg(long, help = "JSON file with the quiz answers (zipCode, sunTypes, ...).")]
        answers: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for OLLAMA_URL, GARDEN_CHAT_MODEL, ...)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,garden_quiz=debug); stdout is left to the quiz
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Garden quiz starting with command: {:?}", cli.command);

    match cli.command {
        Commands::Start {
            port,
            templates,
            static_dir,
        } => {
            let defaults = WebConfig::default();
            let config = WebConfig {
                template_dir: templates.unwrap_or(defaults.template_dir),
                static_dir: static_dir.unwrap_or(defaults.static_dir),
            };
            let llm = OllamaClient::from_env().context("Failed to build the chat client")?;

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, config, llm).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Quiz { no_chat } => {
            let prompt = {
                let stdin = std::io::stdin();
                let mut input = stdin.lock();
                let mut out = std::io::stdout();
                terminal::run_quiz(&mut input, &mut out).context("Quiz failed")?
            };

            let mut page = Page::new();
            page.receive_result(prompt);
            if let View::Chat { initial_prompt } = page.view() {
                println!("\n{}\n", initial_prompt);
                if !no_chat {
                    let llm = OllamaClient::from_env().context("Failed to build the chat client")?;
                    terminal::run_chat(&llm, initial_prompt)
                        .await
                        .context("Chat session failed")?;
                }
            }
        }
        Commands::Prompt { answers } => {
            let raw = std::fs::read_to_string(&answers)
                .with_context(|| format!("Failed to read answers from {}", answers.display()))?;
            let record: AnswerRecord = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse answers in {}", answers.display()))?;
            QuizForm::with_answers(record, |prompt| println!("{}", prompt)).submit();
        }
    }

    Ok(())
}
