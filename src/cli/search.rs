use anyhow::Result;
use console::{style, Emoji};
use serde::Serialize;

use super::{open_pipeline, retry_policy};
use crate::config::Config;
use crate::search::{SearchResult, Searcher, VectorStore};

static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
static FILE: Emoji<'_, '_> = Emoji("📄 ", "");

const PREVIEW_CHARS: usize = 200;

/// A search hit without its embedding vector.
#[derive(Serialize)]
struct Hit<'a> {
    rank: usize,
    score: f32,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<usize>,
    chunk_index: usize,
    start_index: usize,
    text: &'a str,
}

impl<'a> Hit<'a> {
    fn new(rank: usize, result: &'a SearchResult) -> Self {
        Self {
            rank,
            score: result.score,
            source: &result.entry.metadata.source,
            page: result.entry.metadata.page,
            chunk_index: result.entry.metadata.chunk_index,
            start_index: result.entry.metadata.start_index,
            text: &result.entry.text,
        }
    }
}

pub async fn run_search(config: &Config, query: &str, k: Option<usize>, json: bool) -> Result<()> {
    let (embedder, store) = open_pipeline(config)?;
    store.load().await?;

    let searcher = Searcher::new(store, embedder).with_retry(retry_policy(config));
    let results = searcher
        .retrieve(query, k.unwrap_or(config.search_k))
        .await?;

    if json {
        let hits: Vec<Hit<'_>> = results
            .iter()
            .enumerate()
            .map(|(i, r)| Hit::new(i + 1, r))
            .collect();
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found for: {}", style(query).italic());
        return Ok(());
    }

    println!(
        "\n{}Found {} results for: {}\n",
        SEARCH,
        style(results.len()).cyan(),
        style(query).yellow().bold()
    );
    print_results(&results);

    Ok(())
}

pub(crate) fn print_results(results: &[SearchResult]) {
    for (i, result) in results.iter().enumerate() {
        let meta = &result.entry.metadata;
        println!(
            "{} {}. {} {}",
            FILE,
            style(i + 1).dim(),
            style(meta.label()).green(),
            style(format!("(chunk {}, char {})", meta.chunk_index, meta.start_index)).dim()
        );
        println!("   Score: {}", style(format!("{:.3}", result.score)).cyan());
        println!("   {}", style(preview(&result.entry.text)).dim());
        println!();
    }
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}
