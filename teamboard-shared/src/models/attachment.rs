/// Attachment metadata model
///
/// Only metadata is recorded here; the bytes live in an external blob store
/// addressed by `file_path`. Access resolves through the owning work item's
/// team.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE attachments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     file_name VARCHAR(255) NOT NULL,
///     file_path VARCHAR(500) NOT NULL,
///     content_type VARCHAR(100) NOT NULL,
///     size_bytes BIGINT NOT NULL,
///     work_item_id UUID NOT NULL REFERENCES work_items(id),
///     uploaded_by UUID NOT NULL REFERENCES users(id),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Attachment metadata row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attachment {
    /// Unique attachment ID (UUID v4)
    pub id: Uuid,

    /// Original filename as uploaded
    pub file_name: String,

    /// Storage handle in the external blob store
    pub file_path: String,

    /// MIME content type
    pub content_type: String,

    /// Size in bytes
    pub size_bytes: i64,

    /// Owning work item
    pub work_item_id: Uuid,

    /// User who uploaded the file
    pub uploaded_by: Uuid,

    /// Soft-delete flag
    pub is_active: bool,

    /// When the file was uploaded
    pub uploaded_at: DateTime<Utc>,
}

/// Input for recording a new attachment
#[derive(Debug, Clone)]
pub struct CreateAttachment {
    pub file_name: String,
    pub file_path: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub work_item_id: Uuid,
}

impl Attachment {
    /// Records attachment metadata against a work item
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateAttachment,
        uploader_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (file_name, file_path, content_type, size_bytes,
                                     work_item_id, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, file_name, file_path, content_type, size_bytes,
                      work_item_id, uploaded_by, is_active, uploaded_at
            "#,
        )
        .bind(data.file_name)
        .bind(data.file_path)
        .bind(data.content_type)
        .bind(data.size_bytes)
        .bind(data.work_item_id)
        .bind(uploader_id)
        .fetch_one(executor)
        .await?;

        Ok(attachment)
    }

    /// Lists the active attachments of a work item, oldest first
    pub async fn list_active_for_work_item(
        executor: impl PgExecutor<'_>,
        work_item_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let attachments = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT id, file_name, file_path, content_type, size_bytes,
                   work_item_id, uploaded_by, is_active, uploaded_at
            FROM attachments
            WHERE work_item_id = $1 AND is_active
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(work_item_id)
        .fetch_all(executor)
        .await?;

        Ok(attachments)
    }

    /// Soft-deletes an attachment when the caller uploaded it or leads the team
    ///
    /// Returns false when the attachment is absent, inactive, does not
    /// belong to the given work item, or the caller is neither the uploader
    /// nor an active lead of the owning team.
    pub async fn soft_delete_for_uploader_or_lead(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        work_item_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE attachments f
            SET is_active = FALSE
            WHERE f.id = $1 AND f.work_item_id = $2 AND f.is_active
              AND (
                  f.uploaded_by = $3
                  OR EXISTS(
                      SELECT 1 FROM memberships m
                      JOIN projects p ON p.team_id = m.team_id
                      JOIN work_items w ON w.project_id = p.id
                      WHERE w.id = f.work_item_id AND m.user_id = $3
                        AND m.role = 'team_lead' AND m.is_active
                  )
              )
            "#,
        )
        .bind(id)
        .bind(work_item_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_attachment_struct() {
        let create = CreateAttachment {
            file_name: "design.pdf".to_string(),
            file_path: "blobs/2026/design.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 482_133,
            work_item_id: Uuid::new_v4(),
        };

        assert_eq!(create.file_name, "design.pdf");
        assert_eq!(create.size_bytes, 482_133);
    }
}
