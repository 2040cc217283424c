//! Grounded answer generation over retrieved chunks.
//!
//! Stages run in order: retrieve, [`format_context`], [`build_prompt`],
//! [`AnswerGenerator::generate`], [`parse_answer`]. Only generation talks to
//! an external service.

mod gemini;

pub use gemini::GeminiGenerator;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::error::{RagError, Result};
use crate::retry::RetryPolicy;
use crate::search::{SearchResult, Searcher};

pub const NO_CONTEXT: &str = "No relevant documents found.";
pub const NOT_ENOUGH_INFORMATION: &str =
    "I don't have enough information to answer this question based on the provided documents.";

/// Produces raw answer text for a fully built prompt.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SearchResult>,
}

/// Label each retrieved chunk with its rank and source (file and page).
pub fn format_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_CONTEXT.to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "Document {} (Source: {}):\n{}\n",
                i + 1,
                result.entry.metadata.label(),
                result.entry.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful and accurate AI assistant. Use the following context to answer the user's question.\n\
         \n\
         CONTEXT:\n\
         {context}\n\
         \n\
         QUESTION:\n\
         {question}\n\
         \n\
         INSTRUCTIONS:\n\
         - Answer the question based ONLY on the provided context\n\
         - If the context doesn't contain the answer, say \"{fallback}\"\n\
         - Do not make up information or use outside knowledge\n\
         - Keep your answer concise and relevant to the question\n\
         - If the question is unclear, ask for clarification\n\
         \n\
         ANSWER:\n",
        context = context,
        question = question.trim(),
        fallback = NOT_ENOUGH_INFORMATION,
    )
}

pub fn parse_answer(raw: &str, model: &str) -> Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(RagError::Generation {
            model: model.to_string(),
            message: "model returned an empty answer".to_string(),
        });
    }
    Ok(text.to_string())
}

pub struct RagChain {
    searcher: Arc<Searcher>,
    generator: Arc<dyn AnswerGenerator>,
    retry: RetryPolicy,
    k: usize,
}

impl RagChain {
    pub fn new(searcher: Arc<Searcher>, generator: Arc<dyn AnswerGenerator>, k: usize) -> Self {
        Self {
            searcher,
            generator,
            retry: RetryPolicy::default(),
            k,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let sources = self.searcher.retrieve(question, self.k).await?;
        let context = format_context(&sources);
        let prompt = build_prompt(&context, question);

        let raw = self
            .retry
            .run("generate", || self.generator.generate(&prompt))
            .await?;
        let text = parse_answer(&raw, self.generator.model_name())?;

        info!(
            model = self.generator.model_name(),
            sources = sources.len(),
            answer_chars = text.len(),
            "answered question"
        );

        Ok(Answer { text, sources })
    }
}
