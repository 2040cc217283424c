use anyhow::Result;
use console::{style, Emoji};
use inquire::{InquireError, Text};
use std::sync::Arc;

use super::index::ingest;
use super::search::print_results;
use super::{open_pipeline, retry_policy, tui};
use crate::answer::{Answer, GeminiGenerator, RagChain};
use crate::config::Config;
use crate::search::{Searcher, VectorStore};

static ROBOT: Emoji<'_, '_> = Emoji("🤖 ", "");
static WAVE: Emoji<'_, '_> = Emoji("👋 ", "");
static DEBUG: Emoji<'_, '_> = Emoji("🔧 ", "");

/// What the user typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Quit,
    ToggleDebug,
    Empty,
    Question(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => ChatInput::Empty,
            "quit" | "exit" | "q" => ChatInput::Quit,
            "debug" => ChatInput::ToggleDebug,
            _ => ChatInput::Question(trimmed),
        }
    }
}

/// Build the answer chain. With `ingest_first`, the data folder is ingested
/// before answering when `rebuild` is set or no index exists yet.
async fn build_chain(
    config: &Config,
    k: usize,
    ingest_first: bool,
    rebuild: bool,
) -> Result<RagChain> {
    let api_key = config.require_api_key()?;
    let generator = GeminiGenerator::new(&config.chat_model, api_key, config.request_timeout)?;
    let (embedder, store) = open_pipeline(config)?;

    if ingest_first && (rebuild || !store.exists()) {
        if store.exists() {
            // Appends; `docrag index --clear` starts over.
            store.load().await?;
        }
        embedder.health_check().await?;
        ingest(config, Arc::clone(&embedder), Arc::clone(&store)).await?;
    } else {
        store.load().await?;
        if ingest_first {
            tui::print_success(&format!("Loaded index with {} entries", store.count().await?));
        }
    }

    let searcher = Searcher::new(store, embedder).with_retry(retry_policy(config));
    Ok(RagChain::new(Arc::new(searcher), Arc::new(generator), k).with_retry(retry_policy(config)))
}

fn print_answer(answer: &Answer, show_sources: bool) {
    if show_sources {
        println!(
            "\n{}Retrieved {} chunk(s):\n",
            DEBUG,
            style(answer.sources.len()).cyan()
        );
        print_results(&answer.sources);
    }
    println!("\n{}{}\n", ROBOT, answer.text);
}

pub async fn run_ask(config: &Config, question: &str, k: Option<usize>) -> Result<()> {
    let chain = build_chain(config, k.unwrap_or(config.search_k), false, false).await?;
    let answer = chain.answer(question).await?;
    print_answer(&answer, true);
    Ok(())
}

pub async fn run_chat(config: &Config, rebuild: bool) -> Result<()> {
    tui::print_banner();

    let chain = match build_chain(config, config.search_k, true, rebuild).await {
        Ok(chain) => chain,
        Err(e) => {
            tui::print_troubleshooting(config);
            return Err(e);
        }
    };

    println!();
    tui::print_chat_help();

    let mut show_sources = false;

    loop {
        let line = match Text::new("Your question:")
            .with_render_config(tui::docrag_theme())
            .prompt()
        {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                println!("{}Goodbye!", WAVE);
                break;
            }
            Err(e) => return Err(e.into()),
        };

        match ChatInput::parse(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => {
                println!("{}Goodbye!", WAVE);
                break;
            }
            ChatInput::ToggleDebug => {
                show_sources = !show_sources;
                println!(
                    "{}Debug mode {}",
                    DEBUG,
                    if show_sources { "ON" } else { "OFF" }
                );
            }
            ChatInput::Question(question) => match chain.answer(question).await {
                Ok(answer) => print_answer(&answer, show_sources),
                Err(e) => tui::print_error(&e.to_string()),
            },
        }
    }

    Ok(())
}
