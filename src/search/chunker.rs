use std::collections::VecDeque;
use std::ops::Range;

use crate::config::ChunkingConfig;
use crate::error::{RagError, Result};
use crate::loader::Document;

/// Paragraph, line, sentence, word, then hard character split.
pub const DEFAULT_SEPARATORS: [&str; 7] = ["\n\n", "\n", ". ", "! ", "? ", " ", ""];

/// A trimmed substring of a document, before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    /// Page of the source document, for paginated formats.
    pub page: Option<usize>,
    /// Character offset of `text` inside the document text.
    pub start_index: usize,
    pub chunk_index: usize,
}

impl Chunk {
    /// Character offset one past the end of the chunk.
    pub fn end_index(&self) -> usize {
        self.start_index + self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

/// Recursive character splitter with overlap.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for Chunker {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Replace the separator priority list. An empty string means "split
    /// between characters" and stops the search for further separators.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split a document into chunks carrying its source label.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let text = document.text.as_str();
        let spans = self.split_text(text);

        // Byte spans come out in document order, so char offsets can be
        // accumulated in a single pass.
        let mut chunks = Vec::with_capacity(spans.len());
        let mut byte_cursor = 0;
        let mut char_cursor = 0;
        for (chunk_index, span) in spans.into_iter().enumerate() {
            if span.start >= byte_cursor {
                char_cursor += text[byte_cursor..span.start].chars().count();
            } else {
                char_cursor -= text[span.start..byte_cursor].chars().count();
            }
            byte_cursor = span.start;

            chunks.push(Chunk {
                text: text[span].to_string(),
                source: document.source.clone(),
                page: document.page,
                start_index: char_cursor,
                chunk_index,
            });
        }

        chunks
    }

    /// Split raw text into trimmed, non-empty byte spans.
    pub fn split_text(&self, text: &str) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        if text.trim().is_empty() {
            return out;
        }

        if text.chars().count() <= self.chunk_size {
            push_trimmed(text, 0..text.len(), &mut out);
            return out;
        }

        self.split_span(text, 0..text.len(), &self.separators, &mut out);
        out
    }

    fn split_span(
        &self,
        text: &str,
        span: Range<usize>,
        separators: &[String],
        out: &mut Vec<Range<usize>>,
    ) {
        let segment = &text[span.clone()];

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if segment.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut good: Vec<Piece> = Vec::new();
        for piece in split_keeping_separator(text, span, separator) {
            if piece.chars < self.chunk_size {
                good.push(piece);
                continue;
            }

            if !good.is_empty() {
                self.merge(text, &good, out);
                good.clear();
            }
            if remaining.is_empty() {
                push_trimmed(text, piece.start..piece.end, out);
            } else {
                self.split_span(text, piece.start..piece.end, remaining, out);
            }
        }

        if !good.is_empty() {
            self.merge(text, &good, out);
        }
    }

    /// Greedily pack contiguous pieces into windows of at most `chunk_size`
    /// characters, carrying at most `chunk_overlap` characters into the next.
    fn merge(&self, text: &str, pieces: &[Piece], out: &mut Vec<Range<usize>>) {
        let mut window: VecDeque<Piece> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            if total + piece.chars > self.chunk_size {
                if let (Some(first), Some(last)) = (window.front(), window.back()) {
                    push_trimmed(text, first.start..last.end, out);
                }
                while total > self.chunk_overlap
                    || (total > 0 && total + piece.chars > self.chunk_size)
                {
                    match window.pop_front() {
                        Some(dropped) => total -= dropped.chars,
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += piece.chars;
        }

        if let (Some(first), Some(last)) = (window.front(), window.back()) {
            push_trimmed(text, first.start..last.end, out);
        }
    }
}

/// Split `text[span]` at `separator`, keeping each separator at the end of
/// the piece it closes so sentences keep their punctuation and pieces stay
/// contiguous. An empty separator yields one piece per character.
fn split_keeping_separator(text: &str, span: Range<usize>, separator: &str) -> Vec<Piece> {
    let segment = &text[span.clone()];
    let base = span.start;

    if separator.is_empty() {
        return segment
            .char_indices()
            .map(|(i, c)| Piece {
                start: base + i,
                end: base + i + c.len_utf8(),
                chars: 1,
            })
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (pos, matched) in segment.match_indices(separator) {
        let end = pos + matched.len();
        pieces.push(piece(text, base + start, base + end));
        start = end;
    }
    if start < segment.len() {
        pieces.push(piece(text, base + start, base + segment.len()));
    }
    pieces
}

fn piece(text: &str, start: usize, end: usize) -> Piece {
    Piece {
        start,
        end,
        chars: text[start..end].chars().count(),
    }
}

fn push_trimmed(text: &str, span: Range<usize>, out: &mut Vec<Range<usize>>) {
    let segment = &text[span.clone()];
    let leading = segment.len() - segment.trim_start().len();
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return;
    }
    let start = span.start + leading;
    out.push(start..start + trimmed.len());
}
