use anyhow::{Context, Result};
use console::style;
use std::fs;

use super::tui;
use crate::config::Config;
use crate::loader::LoaderKind;
use crate::search::indexer::list_files;

pub fn run_init(config: &Config) -> Result<()> {
    tui::print_banner();

    for dir in [&config.data_folder, &config.persist_directory] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        tui::print_success(&format!("Directory ready: {}", dir.display()));
    }

    let files = list_files(&config.data_folder)?;
    let documents = files
        .iter()
        .filter(|path| LoaderKind::for_path(path).is_some())
        .count();
    if documents == 0 {
        tui::print_error(&format!(
            "No documents yet. Add .txt, .pdf or .docx files to {}",
            config.data_folder.display()
        ));
    } else {
        tui::print_success(&format!("{} document(s) found", documents));
    }
    println!();

    tui::print_config(config);

    println!("  {}", style("Next steps:").bold());
    println!(
        "    {} Run {} to build the index",
        style("1.").dim(),
        style("docrag index").cyan()
    );
    println!(
        "    {} Run {} to ask questions",
        style("2.").dim(),
        style("docrag chat").cyan()
    );
    println!();

    Ok(())
}
