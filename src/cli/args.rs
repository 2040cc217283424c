use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "docrag")]
#[command(author, version, about = "Ask questions about a folder of documents", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Output logs as JSON instead of human-readable
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the document and index directories and show the configuration
    Init,

    /// Ingest every supported document in the data folder into the index
    Index {
        /// Start from an empty index instead of appending to the existing one
        #[arg(long)]
        clear: bool,
    },

    /// Show index statistics
    Status,

    /// Delete the index
    Clear,

    /// Retrieve the chunks most similar to a query
    Search {
        /// Query text
        query: String,

        /// Number of results (defaults to SEARCH_K)
        #[arg(short, long)]
        k: Option<usize>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer a single question from the indexed documents
    Ask {
        /// The question to answer
        question: String,

        /// Number of chunks to use as context (defaults to SEARCH_K)
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Interactive question answering (default)
    Chat {
        /// Re-ingest the data folder before starting
        #[arg(long)]
        rebuild: bool,
    },
}
