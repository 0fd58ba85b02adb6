use super::{AiConversation, DbPool, HrDocument, NewAiConversation, NewHrDocument};
use anyhow::Result;
use tracing::debug;
use uuid::Uuid;

pub struct Repository {
    pub pool: DbPool,
}

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Active documents, newest first. This is the full set packed into the
    /// assistant prompt on every question, so no pagination.
    pub async fn list_active_documents(&self) -> Result<Vec<HrDocument>> {
        let docs = sqlx::query_as::<_, HrDocument>(
            r#"SELECT
                id,
                name,
                category,
                file_path,
                file_size,
                mime_type,
                uploaded_by,
                is_active,
                vector_count,
                processed_at,
                created_at
               FROM hr_documents
               WHERE is_active = TRUE
               ORDER BY created_at DESC"#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        debug!("Loaded {} active HR documents", docs.len());

        Ok(docs)
    }

    pub async fn create_document(&self, doc: NewHrDocument) -> Result<HrDocument> {
        let inserted = sqlx::query_as::<_, HrDocument>(
            r#"INSERT INTO hr_documents
                (name, category, file_path, file_size, mime_type,
                 uploaded_by, vector_count, processed_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING
                id, name, category, file_path, file_size, mime_type,
                uploaded_by, is_active, vector_count, processed_at, created_at"#,
        )
        .bind(&doc.name)
        .bind(&doc.category)
        .bind(&doc.file_path)
        .bind(doc.file_size)
        .bind(&doc.mime_type)
        .bind(&doc.uploaded_by)
        .bind(doc.vector_count)
        .bind(doc.processed_at)
        .fetch_one(self.pool.get_pool())
        .await?;

        Ok(inserted)
    }

    /// Soft delete. Unknown ids are a silent no-op.
    pub async fn deactivate_document(&self, document_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE hr_documents SET is_active = FALSE WHERE id = $1")
            .bind(document_id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    pub async fn create_conversation(
        &self,
        conversation: NewAiConversation,
    ) -> Result<AiConversation> {
        let inserted = sqlx::query_as::<_, AiConversation>(
            r#"INSERT INTO ai_conversations
                (user_id, question, answer, documents_used)
               VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, question, answer, documents_used, created_at"#,
        )
        .bind(&conversation.user_id)
        .bind(&conversation.question)
        .bind(&conversation.answer)
        .bind(&conversation.documents_used)
        .fetch_one(self.pool.get_pool())
        .await?;

        Ok(inserted)
    }

    pub async fn recent_conversations(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<AiConversation>> {
        let conversations = sqlx::query_as::<_, AiConversation>(
            r#"SELECT id, user_id, question, answer, documents_used, created_at
               FROM ai_conversations
               WHERE user_id = $1
               ORDER BY created_at DESC
               LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool.get_pool())
        .await?;

        debug!(
            "Loaded {} conversations for user {}",
            conversations.len(),
            user_id
        );

        Ok(conversations)
    }
}
