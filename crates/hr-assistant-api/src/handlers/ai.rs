use crate::auth::AuthUser;
use crate::database::{HrDocument, NewAiConversation, Repository};
use crate::services::assistant::DocumentContext;
use crate::services::AssistantService;
use crate::utils::error::ApiError;
use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const CONVERSATION_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub answer: String,
    pub documents_used: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub documents_used: Vec<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn ask_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(assistant): Extension<Arc<AssistantService>>,
    user: AuthUser,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = ensure_question(&request.question)?;

    info!("AI question from user {}", user.user_id);

    let documents = repository
        .list_active_documents()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let contexts: Vec<DocumentContext> = documents.iter().map(document_context).collect();

    let result = assistant.answer(question, &contexts).await?;

    repository
        .create_conversation(NewAiConversation {
            user_id: user.user_id,
            question: question.to_string(),
            answer: result.answer.clone(),
            documents_used: result.documents_used.clone(),
        })
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(AskResponse {
        answer: result.answer,
        documents_used: result.documents_used,
    }))
}

pub async fn conversations_handler(
    Extension(repository): Extension<Arc<Repository>>,
    user: AuthUser,
) -> Result<Json<Vec<ConversationResponse>>, ApiError> {
    let conversations = repository
        .recent_conversations(&user.user_id, CONVERSATION_LIMIT)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let response = conversations
        .into_iter()
        .map(|c| ConversationResponse {
            id: c.id,
            user_id: c.user_id,
            question: c.question,
            answer: c.answer,
            documents_used: c.documents_used,
            created_at: c.created_at,
        })
        .collect();

    Ok(Json(response))
}

/// Reject empty/whitespace questions before any document load or LLM call.
fn ensure_question(question: &str) -> Result<&str, ApiError> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest("Question is required".to_string()));
    }
    Ok(trimmed)
}

/// The prompt context carries a short descriptor per document, not the raw
/// file contents.
fn document_context(doc: &HrDocument) -> DocumentContext {
    DocumentContext {
        name: doc.name.clone(),
        category: doc.category.clone(),
        content: format!(
            "HR Policy document: {}. Category: {}. This document contains company policies and procedures.",
            doc.name, doc.category
        ),
    }
}
