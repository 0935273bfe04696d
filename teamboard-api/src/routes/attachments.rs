/// Attachment metadata endpoints
///
/// Only metadata moves through these endpoints; the bytes are handled by an
/// external blob store and referenced through `file_path`.
///
/// # Endpoints
///
/// - `POST /workitems/:work_item_id/attachments` - Record uploaded-file metadata
/// - `DELETE /workitems/:work_item_id/attachments/:attachment_id` - Soft-delete
///
/// Access follows the owning work item: recording requires reaching the
/// item, deleting requires being the uploader or an active team lead.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teamboard_shared::{
    auth::middleware::AuthContext,
    models::{
        attachment::{Attachment, CreateAttachment},
        work_item::WorkItem,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Record attachment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttachmentRequest {
    /// Original filename as uploaded
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    pub file_name: String,

    /// Storage handle in the external blob store
    #[validate(length(min = 1, max = 500, message = "File path must be 1-500 characters"))]
    pub file_path: String,

    /// MIME content type
    #[validate(length(min = 1, max = 100, message = "Content type must be 1-100 characters"))]
    pub content_type: String,

    /// Size in bytes
    #[validate(range(min = 0, message = "Size must not be negative"))]
    pub size_bytes: i64,
}

/// Recorded attachment response
#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub work_item_id: Uuid,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

/// Records uploaded-file metadata against a work item
///
/// # Errors
///
/// - `404` when the work item is absent, inactive, or the caller holds no
///   active membership in the owning team
pub async fn create_attachment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(work_item_id): Path<Uuid>,
    Json(req): Json<CreateAttachmentRequest>,
) -> ApiResult<Json<AttachmentResponse>> {
    req.validate()?;

    // Reaching the work item is the access rule for its attachments.
    WorkItem::find_detail_for_member(&state.db, work_item_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Work item not found or access denied".to_string()))?;

    let attachment = Attachment::create(
        &state.db,
        CreateAttachment {
            file_name: req.file_name,
            file_path: req.file_path,
            content_type: req.content_type,
            size_bytes: req.size_bytes,
            work_item_id,
        },
        auth.user_id,
    )
    .await?;

    Ok(Json(AttachmentResponse {
        id: attachment.id,
        file_name: attachment.file_name,
        content_type: attachment.content_type,
        size_bytes: attachment.size_bytes,
        work_item_id: attachment.work_item_id,
        uploaded_by: attachment.uploaded_by,
        uploaded_at: attachment.uploaded_at,
    }))
}

/// Soft-deletes an attachment
///
/// # Errors
///
/// - `404` when the attachment is absent, inactive, does not belong to the
///   work item, or the caller is neither the uploader nor an active team
///   lead of the owning team
pub async fn delete_attachment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((work_item_id, attachment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Attachment::soft_delete_for_uploader_or_lead(
        &state.db,
        attachment_id,
        work_item_id,
        auth.user_id,
    )
    .await?;

    if !deleted {
        return Err(ApiError::NotFound(
            "Attachment not found or insufficient permissions".to_string(),
        ));
    }

    Ok(Json(MessageResponse::new("Attachment deleted successfully")))
}
