use crate::auth::AuthUser;
use crate::database::{HrDocument, Repository};
use crate::services::DocumentService;
use crate::utils::error::ApiError;
use axum::{
    extract::{Extension, Multipart, Path},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub file_path: String,
    pub file_size: Option<i32>,
    pub mime_type: Option<String>,
    pub uploaded_by: String,
    pub is_active: bool,
    pub vector_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<HrDocument> for DocumentResponse {
    fn from(doc: HrDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            category: doc.category,
            file_path: doc.file_path,
            file_size: doc.file_size,
            mime_type: doc.mime_type,
            uploaded_by: doc.uploaded_by,
            is_active: doc.is_active,
            vector_count: doc.vector_count,
            created_at: doc.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub async fn list_documents_handler(
    Extension(repository): Extension<Arc<Repository>>,
    _user: AuthUser,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let documents = repository
        .list_active_documents()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(documents.into_iter().map(Into::into).collect()))
}

pub async fn upload_document_handler(
    Extension(document_service): Extension<Arc<DocumentService>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<DocumentResponse>, ApiError> {
    let mut category = "general".to_string();
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "category" => {
                category = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid category: {}", e)))?;
            }
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| ApiError::BadRequest("file required".to_string()))?;
    let filename = filename.ok_or_else(|| ApiError::BadRequest("filename required".to_string()))?;

    let document = document_service
        .process_upload(&user.user_id, &filename, &category, file_data)
        .await?;

    Ok(Json(document.into()))
}

pub async fn delete_document_handler(
    Extension(repository): Extension<Arc<Repository>>,
    user: AuthUser,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    info!("User {} deleting document {}", user.user_id, document_id);

    repository
        .deactivate_document(document_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(DeleteResponse {
        message: "Document deleted successfully".to_string(),
    }))
}
