use crate::services::CompletionClient;
use std::sync::Arc;
use tracing::{debug, warn};

/// Hard caps on the chunk set, shared by both paths.
const MAX_CHUNKS: usize = 50;
const MIN_CHUNK_CHARS: usize = 50;

const CHUNKING_SYSTEM_PROMPT: &str = "You are a document processing assistant. Your task is to extract meaningful chunks from HR policy documents for efficient retrieval.

Instructions:
1. Break the document into logical sections
2. Each chunk should be self-contained and meaningful
3. Keep chunks between 100-500 words
4. Preserve important context in each chunk
5. Return the chunks as a JSON array

Return format: {\"chunks\": [\"chunk1\", \"chunk2\", ...]}";

/// Splits uploaded document text into chunks. The chunk contents are thrown
/// away after counting; only `vector_count` on the document survives, so this
/// whole operation is best-effort and never fails the upload.
pub struct ChunkingService {
    llm: Arc<dyn CompletionClient>,
    max_tokens: u32,
}

impl ChunkingService {
    pub fn new(llm: Arc<dyn CompletionClient>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }

    /// Chunk a document's text, at most `MAX_CHUNKS` fragments. Falls back to
    /// paragraph splitting on any upstream failure, including an unconfigured
    /// completion service.
    pub async fn chunk(&self, content: &str, document_name: &str) -> Vec<String> {
        let user_message = format!("Document: {}\n\n{}", document_name, content);

        match self
            .llm
            .json_completion(CHUNKING_SYSTEM_PROMPT, &user_message, self.max_tokens)
            .await
        {
            Ok(value) => {
                let mut chunks: Vec<String> = value
                    .get("chunks")
                    .and_then(|c| c.as_array())
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default();

                chunks.truncate(MAX_CHUNKS);
                debug!(
                    "Chunked '{}' into {} chunks via LLM",
                    document_name,
                    chunks.len()
                );
                chunks
            }
            Err(e) => {
                warn!(
                    "LLM chunking failed for '{}', using paragraph fallback: {}",
                    document_name, e
                );
                fallback_chunks(content)
            }
        }
    }
}

/// Naive fallback: split on blank lines, keep fragments longer than
/// `MIN_CHUNK_CHARS`, cap at `MAX_CHUNKS`.
pub fn fallback_chunks(content: &str) -> Vec<String> {
    content
        .split("\n\n")
        .filter(|chunk| chunk.trim().chars().count() > MIN_CHUNK_CHARS)
        .map(String::from)
        .take(MAX_CHUNKS)
        .collect()
}
