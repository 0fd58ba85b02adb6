use crate::database::{HrDocument, NewHrDocument, Repository};
use crate::services::ChunkingService;
use crate::utils::error::ApiError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Upload pipeline: store blob -> read text -> chunk (best effort) -> insert
/// document row. Chunking runs synchronously inside the upload request, so
/// upload latency includes one completion round trip.
pub struct DocumentService {
    repository: Arc<Repository>,
    chunking: Arc<ChunkingService>,
    storage_path: PathBuf,
}

impl DocumentService {
    pub fn new(
        repository: Arc<Repository>,
        chunking: Arc<ChunkingService>,
        storage_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            chunking,
            storage_path: storage_path.into(),
        }
    }

    pub async fn process_upload(
        &self,
        user_id: &str,
        filename: &str,
        category: &str,
        file_data: Vec<u8>,
    ) -> Result<HrDocument, ApiError> {
        info!(
            "Processing HR document upload from {}: {} ({} bytes)",
            user_id,
            filename,
            file_data.len()
        );

        let file_size = file_data.len() as i32;
        let mime_type = mime_guess::from_path(filename)
            .first()
            .map(|m| m.to_string());

        let stored_path = self.store_file(filename, &file_data).await?;

        // Documents are plain text; binary uploads just degrade to lossy text
        // and end up with zero chunks.
        let content = String::from_utf8_lossy(&file_data).into_owned();

        let chunks = self.chunking.chunk(&content, filename).await;
        debug!("Counted {} chunks for {}", chunks.len(), filename);

        let document = self
            .repository
            .create_document(NewHrDocument {
                name: filename.to_string(),
                category: category.to_string(),
                file_path: stored_path,
                file_size: Some(file_size),
                mime_type,
                uploaded_by: user_id.to_string(),
                vector_count: chunks.len() as i32,
                processed_at: chrono::Utc::now(),
            })
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        info!(
            "Document {} stored: id={}, vector_count={}",
            filename, document.id, document.vector_count
        );

        Ok(document)
    }

    async fn store_file(&self, filename: &str, data: &[u8]) -> Result<String, ApiError> {
        tokio::fs::create_dir_all(&self.storage_path)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to create storage dir: {}", e)))?;

        let stored = self
            .storage_path
            .join(format!("{}_{}", Uuid::new_v4(), filename));

        tokio::fs::write(&stored, data)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to store file: {}", e)))?;

        Ok(stored.to_string_lossy().into_owned())
    }
}
