//! Chunked abstractive summarization.
//!
//! Long articles are cut into sentence-aligned chunks no longer than the
//! model's input window, each chunk is summarized on its own, and the
//! chunk summaries are joined in order.

use nsum_core::{Error, Result, SummarizationModel};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const DEFAULT_MAX_LENGTH: usize = 130;
pub const DEFAULT_MIN_LENGTH: usize = 30;
pub const MAX_CHUNK_CHARS: usize = 1024;

const SENTENCE_SEPARATOR: &str = ". ";

/// Splits on ". " and greedily packs whole sentences into chunks of at
/// most `max_chars` characters. The period consumed by the split is put
/// back, so joining the chunks with a space restores the sentences.
///
/// A sentence whose text plus restored period is longer than `max_chars`
/// is oversize and becomes a chunk of its own.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let pieces: Vec<&str> = text.split(SENTENCE_SEPARATOR).collect();
    let last = pieces.len().saturating_sub(1);
    let separator_len = SENTENCE_SEPARATOR.chars().count();

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;
    let mut needs_period = false;

    for (index, piece) in pieces.iter().enumerate() {
        let sentence = piece.trim();
        if sentence.is_empty() {
            continue;
        }
        let sentence_len = sentence.chars().count();
        let period = index != last;
        let cost = sentence_len + usize::from(period);

        if cost > max_chars {
            if !current.is_empty() {
                chunks.push(finish_chunk(&current, needs_period));
                current.clear();
                current_len = 0;
            }
            chunks.push(finish_chunk(&[sentence], period));
            continue;
        }

        // `current_len` leaves out the last sentence's period; the
        // separator puts it back when another sentence follows.
        if !current.is_empty() && current_len + separator_len + cost > max_chars {
            chunks.push(finish_chunk(&current, needs_period));
            current.clear();
            current_len = 0;
        }
        if !current.is_empty() {
            current_len += separator_len;
        }
        current.push(sentence);
        current_len += sentence_len;
        needs_period = period;
    }

    if !current.is_empty() {
        chunks.push(finish_chunk(&current, needs_period));
    }
    chunks
}

fn finish_chunk(sentences: &[&str], needs_period: bool) -> String {
    let mut chunk = sentences.join(SENTENCE_SEPARATOR);
    if needs_period {
        chunk.push('.');
    }
    chunk
}

/// Length bounds for one chunk. Short chunks get a target of half their
/// size so the model is never asked to write more than it was given.
pub fn chunk_lengths(word_count: usize, max_length: usize, min_length: usize) -> (usize, usize) {
    if word_count < max_length {
        let chunk_max = min_length.max(word_count / 2);
        let chunk_min = min_length.min(chunk_max.saturating_sub(10));
        (chunk_max, chunk_min)
    } else {
        (max_length, min_length)
    }
}

/// Wraps a summarization model behind the chunking policy.
#[derive(Debug, Clone)]
pub struct Summarizer {
    model: Arc<dyn SummarizationModel>,
    max_chunk_chars: usize,
}

impl Summarizer {
    pub fn new(model: Arc<dyn SummarizationModel>) -> Self {
        Self {
            model,
            max_chunk_chars: MAX_CHUNK_CHARS,
        }
    }

    pub fn with_chunk_size(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars.max(1);
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        self.summarize_with(text, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH).await
    }

    #[instrument(level = "info", skip(self, text), fields(chars = text.len()))]
    pub async fn summarize_with(&self, text: &str, max_length: usize, min_length: usize) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("Input text must be a non-empty string".to_string()));
        }

        let mut chunks = split_into_chunks(text, self.max_chunk_chars);
        if chunks.is_empty() {
            chunks.push(text.to_string());
        }

        let mut summaries = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let word_count = chunk.split_whitespace().count();
            if word_count <= min_length {
                debug!(index, word_count, "Chunk too short to summarize; passing through");
                summaries.push(chunk.clone());
                continue;
            }

            let (chunk_max, chunk_min) = chunk_lengths(word_count, max_length, min_length);
            debug!(index, word_count, chunk_max, chunk_min, "Summarizing chunk");
            let summary = self.model.summarize(chunk, chunk_max, chunk_min).await?;
            summaries.push(summary.trim().to_string());
        }

        Ok(summaries.join(" "))
    }
}
