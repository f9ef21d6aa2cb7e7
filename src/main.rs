use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;

use arag_server::ServerSettings;
use arag_workflow::{AgenticRag, QueryOutcome, Score, Settings};

#[derive(Parser)]
#[command(name = "agentic-rag")]
#[command(about = "Agentic self-reflective RAG with guardrails, graders and tool routing", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Overrides API_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Answer a single question and exit
    Query {
        question: String,

        /// Print processing details
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Serve { host, port } => {
            let mut server = ServerSettings::from_env()?;
            if let Some(port) = port {
                server.port = port;
            }
            arag_server::serve(&host, server, settings).await?;
        }
        Commands::Query { question, verbose } => {
            println!("{}", "Initializing Agentic RAG system...".cyan());
            let rag = AgenticRag::from_settings(&settings).await?;
            println!("{}", "🚀 Agentic RAG system ready!".green());

            let outcome = rag.query(&question).await?;
            if verbose {
                print_processing_details(&outcome);
            }
            println!("\n{}", "Answer:".bold());
            println!("{}", outcome.answer);
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `LOG_LEVEL` (default INFO)
fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));

    match format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

fn score(value: Option<Score>) -> ColoredString {
    match value {
        Some(Score::Yes) => "yes".green(),
        Some(Score::No) => "no".red(),
        None => "N/A".dimmed(),
    }
}

fn print_processing_details(outcome: &QueryOutcome) {
    let metadata = &outcome.metadata;
    let rule = "=".repeat(80);

    println!("\n{}", rule);
    println!("{}", "PROCESSING DETAILS".bold());
    println!("{}", rule);
    println!("{} {}", "Original Question:".blue(), metadata.original_question);
    if metadata.rewritten_question != metadata.original_question {
        println!("{} {}", "Rewritten Question:".blue(), metadata.rewritten_question);
    }
    println!("{} {}", "Input Safe:".blue(), score(metadata.input_safe));
    println!("{} {}", "Relevance Score:".blue(), score(metadata.relevance_score));
    println!("{} {}", "Hallucination Score:".blue(), score(metadata.hallucination_score));
    println!("{} {}", "Answer Score:".blue(), score(metadata.answer_score));
    println!("{} {}", "Output Safe:".blue(), score(metadata.output_safe));
    println!("{} {}", "Rewrites:".blue(), metadata.rewrite_count);
    let steps: Vec<&str> = metadata.steps.iter().map(|s| s.as_str()).collect();
    println!("{} {}", "Steps:".blue(), steps.join(" → "));
    println!("{}", rule);
}
