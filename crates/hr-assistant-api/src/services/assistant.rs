use crate::services::CompletionClient;
use crate::utils::error::ApiError;
use std::sync::Arc;
use tracing::{error, info};

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

const APOLOGY: &str = "I apologize, but I couldn't generate a response to your question.";

const GENERIC_FAILURE: &str = "Failed to get AI response. Please try again later.";

const SYSTEM_PROMPT_HEADER: &str = "You are an AI HR Assistant for an employee self-service portal. Your role is to answer HR-related questions based on the provided company documents and policies.

Guidelines:
- Always be helpful, professional, and accurate
- Reference specific policy documents when applicable
- If you don't have enough information, say so clearly
- Provide actionable advice when possible
- Keep responses concise but comprehensive
- Format your response clearly with bullet points or sections when appropriate

Available Documents:
";

/// Per-question view of one active document, assembled fresh on every ask.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub name: String,
    pub category: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct AssistantAnswer {
    pub answer: String,
    pub documents_used: Vec<String>,
}

pub struct AssistantService {
    llm: Arc<dyn CompletionClient>,
    answer_max_tokens: u32,
    /// Character budget applied to each document's content before it is
    /// packed into the prompt. The active set is unbounded, the prompt is not.
    max_context_chars: usize,
}

impl AssistantService {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        answer_max_tokens: u32,
        max_context_chars: usize,
    ) -> Self {
        Self {
            llm,
            answer_max_tokens,
            max_context_chars,
        }
    }

    /// Answer a question against the given document contexts.
    ///
    /// A missing credential is surfaced as `LlmNotConfigured` before any
    /// network call. Every other failure is flattened to a generic message;
    /// the original error is logged, not exposed.
    pub async fn answer(
        &self,
        question: &str,
        documents: &[DocumentContext],
    ) -> Result<AssistantAnswer, ApiError> {
        if !self.llm.is_configured() {
            return Err(ApiError::LlmNotConfigured(
                "OpenAI API key is not configured. Please add your OPENAI_API_KEY to use the AI Assistant.".to_string(),
            ));
        }

        let system_prompt = format!(
            "{}{}",
            SYSTEM_PROMPT_HEADER,
            self.build_context(documents)
        );

        info!(
            "Asking assistant: question_len={}, documents={}",
            question.len(),
            documents.len()
        );

        let answer = match self
            .llm
            .chat_completion(&system_prompt, question, self.answer_max_tokens)
            .await
        {
            Ok(Some(text)) => text,
            // Empty completion is a degraded success, not an error.
            Ok(None) => APOLOGY.to_string(),
            Err(e @ ApiError::LlmNotConfigured(_)) => return Err(e),
            Err(e) => {
                error!("Assistant completion failed: {}", e);
                return Err(ApiError::LlmError(GENERIC_FAILURE.to_string()));
            }
        };

        let documents_used = attribute_documents(&answer, documents);

        Ok(AssistantAnswer {
            answer,
            documents_used,
        })
    }

    /// Concatenate document contexts into the prompt context block, each
    /// truncated to the configured character budget.
    pub fn build_context(&self, documents: &[DocumentContext]) -> String {
        documents
            .iter()
            .map(|doc| {
                format!(
                    "Document: {} ({})\nContent: {}",
                    doc.name,
                    doc.category,
                    truncate_chars(&doc.content, self.max_context_chars)
                )
            })
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }
}

/// Guess which documents informed the answer: case-insensitive substring match
/// on name or category. Zero matches default to the first document so a
/// non-empty set always yields a non-empty attribution. This is a heuristic,
/// not a citation mechanism; category matches can over-attribute.
pub fn attribute_documents(answer: &str, documents: &[DocumentContext]) -> Vec<String> {
    let answer_lower = answer.to_lowercase();

    let mut used: Vec<String> = documents
        .iter()
        .filter(|doc| {
            answer_lower.contains(&doc.name.to_lowercase())
                || answer_lower.contains(&doc.category.to_lowercase())
        })
        .map(|doc| doc.name.clone())
        .collect();

    if used.is_empty() {
        if let Some(first) = documents.first() {
            used.push(first.name.clone());
        }
    }

    used
}

/// Truncate to at most `max_chars` characters, on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::openai::MockCompletionClient;

    fn doc(name: &str, category: &str) -> DocumentContext {
        DocumentContext {
            name: name.to_string(),
            category: category.to_string(),
            content: format!("Contents of {}", name),
        }
    }

    fn service(llm: MockCompletionClient) -> AssistantService {
        AssistantService::new(Arc::new(llm), 1000, 4000)
    }

    #[test]
    fn attribution_is_case_insensitive_on_name() {
        let docs = vec![doc("Leave Policy", "policy"), doc("Benefits Guide", "benefits")];
        let used = attribute_documents("Per the LEAVE POLICY, encashment is allowed.", &docs);
        assert_eq!(used, vec!["Leave Policy"]);
    }

    #[test]
    fn attribution_matches_on_category() {
        let docs = vec![doc("Handbook 2024", "handbook")];
        let used = attribute_documents("See the employee handbook for details.", &docs);
        assert_eq!(used, vec!["Handbook 2024"]);
    }

    #[test]
    fn attribution_defaults_to_first_document() {
        let docs = vec![doc("Leave Policy", "policy"), doc("Benefits Guide", "benefits")];
        let used = attribute_documents("No direct references here.", &docs);
        assert_eq!(used, vec!["Leave Policy"]);
    }

    #[test]
    fn attribution_is_empty_without_documents() {
        let used = attribute_documents("Anything at all.", &[]);
        assert!(used.is_empty());
    }

    #[test]
    fn context_block_format_and_separator() {
        let llm = MockCompletionClient::new();
        let svc = service(llm);

        let docs = vec![doc("Leave Policy", "policy"), doc("Benefits Guide", "benefits")];
        let context = svc.build_context(&docs);

        assert_eq!(
            context,
            "Document: Leave Policy (policy)\nContent: Contents of Leave Policy\n\n---\n\nDocument: Benefits Guide (benefits)\nContent: Contents of Benefits Guide"
        );
    }

    #[test]
    fn context_truncation_is_deterministic() {
        let llm = MockCompletionClient::new();
        let svc = AssistantService::new(Arc::new(llm), 1000, 10);

        let docs = vec![DocumentContext {
            name: "Long".to_string(),
            category: "policy".to_string(),
            content: "abcdefghijklmnop".to_string(),
        }];

        let first = svc.build_context(&docs);
        let second = svc.build_context(&docs);
        assert_eq!(first, second);
        assert_eq!(first, "Document: Long (policy)\nContent: abcdefghij");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[tokio::test]
    async fn missing_credential_fails_without_network_call() {
        let mut llm = MockCompletionClient::new();
        llm.expect_is_configured().return_const(false);
        // No expectation on chat_completion: any call would panic the mock.

        let svc = service(llm);
        let err = svc.answer("What is the leave policy?", &[]).await.unwrap_err();

        assert!(matches!(err, ApiError::LlmNotConfigured(_)));
    }

    #[tokio::test]
    async fn empty_completion_becomes_apology() {
        let mut llm = MockCompletionClient::new();
        llm.expect_is_configured().return_const(true);
        llm.expect_chat_completion()
            .returning(|_, _, _| Ok(None));

        let svc = service(llm);
        let docs = vec![doc("Leave Policy", "policy")];
        let result = svc.answer("What are the rules?", &docs).await.unwrap();

        assert_eq!(result.answer, APOLOGY);
        // Apology matches nothing, so attribution defaults to the first doc.
        assert_eq!(result.documents_used, vec!["Leave Policy"]);
    }

    #[tokio::test]
    async fn upstream_errors_are_flattened() {
        let mut llm = MockCompletionClient::new();
        llm.expect_is_configured().return_const(true);
        llm.expect_chat_completion()
            .returning(|_, _, _| Err(ApiError::LlmError("connection reset".to_string())));

        let svc = service(llm);
        let err = svc.answer("Question?", &[doc("A", "b")]).await.unwrap_err();

        match err {
            ApiError::LlmError(msg) => {
                assert_eq!(msg, GENERIC_FAILURE);
                assert!(!msg.contains("connection reset"));
            }
            other => panic!("Expected LlmError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn successful_answer_attributes_documents() {
        let mut llm = MockCompletionClient::new();
        llm.expect_is_configured().return_const(true);
        llm.expect_chat_completion().returning(|_, _, _| {
            Ok(Some(
                "According to the Leave Policy, unused leave can be encashed.".to_string(),
            ))
        });

        let svc = service(llm);
        let docs = vec![doc("Leave Policy", "policy"), doc("Benefits Guide", "benefits")];
        let result = svc
            .answer("What are the leave encashment rules?", &docs)
            .await
            .unwrap();

        assert!(result.answer.contains("Leave Policy"));
        assert_eq!(result.documents_used, vec!["Leave Policy"]);
    }
}
