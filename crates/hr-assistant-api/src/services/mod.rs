pub mod assistant;
pub mod chunking;
pub mod document_service;
pub mod openai;

pub use assistant::AssistantService;
pub use chunking::ChunkingService;
pub use document_service::DocumentService;
pub use openai::{CompletionClient, OpenAiService};
