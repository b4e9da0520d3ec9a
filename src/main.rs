//! findex-chat: line-oriented travel assistant on stdin.

use anyhow::Context;
use clap::Parser;
use findex_rs::chat::{ArgumentExtractor, Assistant, FunctionFinder};
use findex_rs::config::ChatConfig;
use findex_rs::travel::trip::TRANSPORTATION_TYPES;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ChatConfig::parse();
    if config.declarations {
        let declarations = findex_rs::function_declarations()?;
        println!("{}", serde_json::to_string_pretty(&declarations)?);
        return Ok(());
    }

    let indexer = findex_rs::index_modules(&config.modules)
        .with_context(|| format!("failed to index modules {:?}", config.modules))?;
    tracing::info!(functions = indexer.len(), modules = ?config.modules, "function index ready");

    if config.list {
        let mut listing: Vec<(&str, &str)> = indexer.descriptions().collect();
        listing.sort_unstable();
        for (name, description) in listing {
            let summary = description.lines().next().unwrap_or_default();
            println!("{name}: {summary}");
        }
        return Ok(());
    }

    let mut assistant = Assistant::new(&indexer)
        .with_finder(FunctionFinder::new(config.max_results))
        .with_extractor(
            ArgumentExtractor::default()
                .with_choices("transportation_type", TRANSPORTATION_TYPES),
        );

    if let Some(message) = &config.once {
        let reply = assistant.respond(message)?;
        println!("{}", reply.text);
        return Ok(());
    }

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "quit" | "exit") {
            break;
        }

        match assistant.respond(message) {
            Ok(reply) => println!("{}", reply.text),
            Err(err) => {
                tracing::error!(%err, "failed to answer");
                println!("{}", findex_rs::chat::NO_HELP);
            }
        }
    }
    Ok(())
}
