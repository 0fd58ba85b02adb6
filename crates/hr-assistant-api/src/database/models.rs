use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// An uploaded HR document. Soft-deleted by clearing `is_active`; rows are
/// never removed. `vector_count` is the number of chunks produced at upload
/// time, stored for display only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HrDocument {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub file_path: String,
    pub file_size: Option<i32>,
    pub mime_type: Option<String>,
    pub uploaded_by: String,
    pub is_active: bool,
    pub vector_count: i32,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHrDocument {
    pub name: String,
    pub category: String,
    pub file_path: String,
    pub file_size: Option<i32>,
    pub mime_type: Option<String>,
    pub uploaded_by: String,
    pub vector_count: i32,
    pub processed_at: DateTime<Utc>,
}

/// One question/answer exchange with the assistant. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AiConversation {
    pub id: Uuid,
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub documents_used: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAiConversation {
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub documents_used: Vec<String>,
}
