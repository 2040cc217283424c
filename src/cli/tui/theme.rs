use console::style;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};

use crate::config::Config;

pub fn docrag_theme() -> RenderConfig<'static> {
    RenderConfig {
        prompt_prefix: Styled::new("?").with_fg(Color::LightCyan),
        answer: StyleSheet::new().with_fg(Color::LightCyan),
        help_message: StyleSheet::new()
            .with_fg(Color::DarkGrey)
            .with_attr(Attributes::ITALIC),
        ..Default::default()
    }
}

pub fn print_banner() {
    println!();
    println!("  {}  {}", style("📚").cyan(), style("docrag").cyan().bold());
    println!("  {}", style("Questions over your documents").dim());
    println!();
}

pub fn print_success(message: &str) {
    println!("  {} {}", style("✓").green(), message);
}

pub fn print_error(message: &str) {
    println!("  {} {}", style("✗").red(), message);
}

pub fn print_config(config: &Config) {
    let row = |label: &str, value: String| {
        println!("  {:<18} {}", style(label).dim(), value);
    };

    println!("  {}", style("Configuration").bold());
    row("Data folder", config.data_folder.display().to_string());
    row("Index", config.index_path().display().to_string());
    row(
        "Chunking",
        format!(
            "{} chars, {} overlap",
            config.chunking.chunk_size, config.chunking.chunk_overlap
        ),
    );
    row("Results (k)", config.search_k.to_string());
    row(
        "Embeddings",
        format!(
            "{} / {} ({} dims)",
            config.embedder.provider, config.embedder.model, config.embedder.dimensions
        ),
    );
    row("Chat model", config.chat_model.clone());
    row(
        "API key",
        if config.api_key.is_some() {
            style("set").green().to_string()
        } else {
            style("missing").yellow().to_string()
        },
    );
    println!();
}

pub fn print_chat_help() {
    println!(
        "  Type a question, {} to toggle sources, {} to leave.",
        style("debug").cyan(),
        style("quit").cyan()
    );
    println!("{}", style("─".repeat(50)).dim());
    println!();
}

pub fn print_troubleshooting(config: &Config) {
    println!();
    println!("  {}", style("Troubleshooting:").bold());
    println!(
        "    {} Put .txt, .pdf or .docx files in {}",
        style("1.").dim(),
        style(config.data_folder.display()).cyan()
    );
    println!(
        "    {} Check that GOOGLE_API_KEY is set in {}",
        style("2.").dim(),
        style(".env").cyan()
    );
    if config.embedder.provider == "ollama" {
        println!(
            "    {} Make sure Ollama is running: {}",
            style("3.").dim(),
            style(format!("ollama pull {}", config.embedder.model)).cyan()
        );
    }
    println!();
}
