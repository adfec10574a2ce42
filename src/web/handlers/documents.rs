//! Document upload. The file body goes to the blob store; only the
//! returned URL is persisted. Uploads are record-manager territory.

use std::str::FromStr;

use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::audit::AuditEvent;
use crate::auth::Identity;
use crate::authorization::{authorize_mutation, Mutation, RecordKind};
use crate::constants::{audit, DocumentType};
use crate::models::{Document, NewDocument};
use crate::web::errors::ApiError;
use crate::web::state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub async fn upload_document(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    mut multipart: Multipart,
) -> Result<(axum::http::StatusCode, Json<Document>), ApiError> {
    authorize_mutation(&identity, &Mutation::CreateRecord(RecordKind::Document))?;

    let mut project_id: Option<Uuid> = None;
    let mut document_type = DocumentType::Contract;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("project_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                project_id = Some(
                    Uuid::parse_str(&text)
                        .map_err(|_| ApiError::bad_request("invalid project id"))?,
                );
            }
            Some("type") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                document_type = DocumentType::from_str(&text)
                    .map_err(|_| ApiError::bad_request("invalid document type"))?;
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(ApiError::bad_request("file too large (10MB max)"));
                }
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let project_id = project_id.ok_or_else(|| ApiError::bad_request("project id is required"))?;
    let (file_name, bytes) = file.ok_or_else(|| ApiError::bad_request("file is required"))?;

    let url = state.blobs.save(&file_name, &bytes).await?;

    let document = Document::create(
        &state.pool,
        NewDocument {
            project_id,
            document_type,
            file_name: file_name.clone(),
            url,
            uploaded_by: identity.user_id,
        },
    )
    .await?;

    state
        .audit
        .record(
            AuditEvent::new(identity.user_id, audit::DOCUMENT_UPLOAD, "document", document.id)
                .with_metadata(serde_json::json!({
                    "project_id": project_id,
                    "file_name": file_name,
                    "size": bytes.len(),
                })),
        )
        .await;

    Ok((axum::http::StatusCode::CREATED, Json(document)))
}
