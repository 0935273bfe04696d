/// Work item lifecycle endpoints
///
/// # Endpoints
///
/// - `GET /workitems/project/:project_id` - Board listing for a project
/// - `GET /workitems/:work_item_id` - Full detail with attachments
/// - `POST /workitems` - Create a work item (project members only)
/// - `PUT /workitems/:work_item_id` - Wholesale overwrite
/// - `DELETE /workitems/:work_item_id` - Soft-delete (lead or creator)
///
/// The completion timestamp is derived on every update: entering `done`
/// stamps it once, leaving `done` clears it. Assignees must hold an active
/// membership in the owning project's team, checked inside the same
/// transaction as the write.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use teamboard_shared::{
    auth::{authorization::require_project_access, middleware::AuthContext},
    models::{
        attachment::Attachment,
        membership::Membership,
        project::{Priority, Project},
        user::User,
        work_item::{
            resolve_completed_at, CreateWorkItem, UpdateWorkItem, WorkItem, WorkItemStatus,
        },
    },
};
use uuid::Uuid;
use validator::Validate;

fn default_status() -> WorkItemStatus {
    WorkItemStatus::Todo
}

fn default_priority() -> Priority {
    Priority::Medium
}

/// Create work item request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkItemRequest {
    /// Short title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Free-form description
    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,

    /// Owning project
    pub project_id: Uuid,

    /// Optional assignee; must be an active member of the project's team
    pub assignee_id: Option<Uuid>,

    /// Board column (defaults to todo)
    #[serde(default = "default_status")]
    pub status: WorkItemStatus,

    /// Priority (defaults to medium)
    #[serde(default = "default_priority")]
    pub priority: Priority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,
}

/// Update work item request
///
/// Updates replace the work item wholesale: omitted fields fall back to the
/// request defaults, and an omitted assignee unassigns.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWorkItemRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,

    #[serde(default = "default_status")]
    pub status: WorkItemStatus,

    #[serde(default = "default_priority")]
    pub priority: Priority,

    pub assignee_id: Option<Uuid>,

    pub due_date: Option<NaiveDate>,
}

/// Assignee projection
#[derive(Debug, Serialize)]
pub struct WorkItemAssigneeDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Creator projection for listings
#[derive(Debug, Serialize)]
pub struct WorkItemCreatorDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

/// Creator projection for the detail response
#[derive(Debug, Serialize)]
pub struct WorkItemCreatorDetailDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Owning team projection embedded in the detail response
#[derive(Debug, Serialize)]
pub struct WorkItemTeamDto {
    pub id: Uuid,
    pub name: String,
}

/// Owning project projection embedded in the detail response
#[derive(Debug, Serialize)]
pub struct WorkItemProjectDto {
    pub id: Uuid,
    pub name: String,
    pub team: WorkItemTeamDto,
}

/// Owning project projection for the create response
#[derive(Debug, Serialize)]
pub struct WorkItemProjectSimpleDto {
    pub id: Uuid,
    pub name: String,
}

/// Assignee projection for the create response
#[derive(Debug, Serialize)]
pub struct WorkItemAssigneeSimpleDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

/// Attachment metadata projection
#[derive(Debug, Serialize)]
pub struct WorkItemFileDto {
    pub id: Uuid,
    pub file_name: String,
    pub size_bytes: i64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Attachment> for WorkItemFileDto {
    fn from(f: Attachment) -> Self {
        Self {
            id: f.id,
            file_name: f.file_name,
            size_bytes: f.size_bytes,
            content_type: f.content_type,
            uploaded_at: f.uploaded_at,
        }
    }
}

/// Board listing entry
#[derive(Debug, Serialize)]
pub struct WorkItemListResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: WorkItemStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub assignee: Option<WorkItemAssigneeDto>,
    pub creator: WorkItemCreatorDto,
    pub file_count: i64,
}

/// Work item detail response
#[derive(Debug, Serialize)]
pub struct WorkItemDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: WorkItemStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub project: WorkItemProjectDto,
    pub assignee: Option<WorkItemAssigneeDto>,
    pub creator: WorkItemCreatorDetailDto,
    pub files: Vec<WorkItemFileDto>,
}

/// Created work item response
#[derive(Debug, Serialize)]
pub struct CreateWorkItemResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: WorkItemStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub project: WorkItemProjectSimpleDto,
    pub assignee: Option<WorkItemAssigneeSimpleDto>,
    pub creator: WorkItemCreatorDto,
}

/// Lists the active work items of a project in board order
///
/// # Errors
///
/// - `403` when the project is absent, inactive, or the caller is not an
///   active member of its team
pub async fn list_project_work_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<WorkItemListResponse>>> {
    require_project_access(&state.db, project_id, auth.user_id).await?;

    let items = WorkItem::list_for_project(&state.db, project_id).await?;

    let responses = items
        .into_iter()
        .map(|wi| WorkItemListResponse {
            id: wi.id,
            title: wi.title,
            description: wi.description,
            status: wi.status,
            priority: wi.priority,
            due_date: wi.due_date,
            created_at: wi.created_at,
            completed_at: wi.completed_at,
            assignee: wi.assignee_id.map(|id| WorkItemAssigneeDto {
                id,
                first_name: wi.assignee_first_name.unwrap_or_default(),
                last_name: wi.assignee_last_name.unwrap_or_default(),
                email: wi.assignee_email.unwrap_or_default(),
            }),
            creator: WorkItemCreatorDto {
                id: wi.creator_id,
                first_name: wi.creator_first_name,
                last_name: wi.creator_last_name,
            },
            file_count: wi.attachment_count,
        })
        .collect();

    Ok(Json(responses))
}

/// Returns a work item with its project context and attachments
///
/// # Errors
///
/// - `404` when the item is absent, inactive, or the caller holds no active
///   membership in the owning team; the cases are indistinguishable
pub async fn get_work_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(work_item_id): Path<Uuid>,
) -> ApiResult<Json<WorkItemDetailResponse>> {
    let wi = WorkItem::find_detail_for_member(&state.db, work_item_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Work item not found or access denied".to_string()))?;

    let files = Attachment::list_active_for_work_item(&state.db, wi.id).await?;

    Ok(Json(WorkItemDetailResponse {
        id: wi.id,
        title: wi.title,
        description: wi.description,
        status: wi.status,
        priority: wi.priority,
        due_date: wi.due_date,
        created_at: wi.created_at,
        completed_at: wi.completed_at,
        project: WorkItemProjectDto {
            id: wi.project_id,
            name: wi.project_name,
            team: WorkItemTeamDto {
                id: wi.team_id,
                name: wi.team_name,
            },
        },
        assignee: wi.assignee_id.map(|id| WorkItemAssigneeDto {
            id,
            first_name: wi.assignee_first_name.unwrap_or_default(),
            last_name: wi.assignee_last_name.unwrap_or_default(),
            email: wi.assignee_email.unwrap_or_default(),
        }),
        creator: WorkItemCreatorDetailDto {
            id: wi.creator_id,
            first_name: wi.creator_first_name,
            last_name: wi.creator_last_name,
            email: wi.creator_email,
        },
        files: files.into_iter().map(WorkItemFileDto::from).collect(),
    }))
}

/// Creates a work item in a project
///
/// # Errors
///
/// - `403` when the caller cannot reach the project
/// - `400` when the assignee is not an active member of the project's team
pub async fn create_work_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateWorkItemRequest>,
) -> ApiResult<Json<CreateWorkItemResponse>> {
    req.validate()?;

    require_project_access(&state.db, req.project_id, auth.user_id).await?;

    let project = Project::find_by_id(&state.db, req.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if let Some(assignee_id) = req.assignee_id {
        if !Membership::is_active_member(&state.db, project.team_id, assignee_id).await? {
            return Err(ApiError::Conflict(
                "Assignee must be a team member".to_string(),
            ));
        }
    }

    let work_item = WorkItem::create(
        &state.db,
        CreateWorkItem {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            project_id: req.project_id,
            assignee_id: req.assignee_id,
        },
        auth.user_id,
    )
    .await?;

    let assignee = match work_item.assignee_id {
        Some(id) => User::find_by_id(&state.db, id)
            .await?
            .map(|u| WorkItemAssigneeSimpleDto {
                id: u.id,
                first_name: u.first_name,
                last_name: u.last_name,
            }),
        None => None,
    };

    let creator = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Authenticated user not found".to_string()))?;

    Ok(Json(CreateWorkItemResponse {
        id: work_item.id,
        title: work_item.title,
        description: work_item.description,
        status: work_item.status,
        priority: work_item.priority,
        due_date: work_item.due_date,
        created_at: work_item.created_at,
        completed_at: work_item.completed_at,
        project: WorkItemProjectSimpleDto {
            id: project.id,
            name: project.name,
        },
        assignee,
        creator: WorkItemCreatorDto {
            id: creator.id,
            first_name: creator.first_name,
            last_name: creator.last_name,
        },
    }))
}

/// Overwrites a work item's fields, maintaining the completion timestamp
///
/// The item is locked inside a transaction before the assignee check and
/// the completion rule run, so concurrent membership changes cannot race
/// the write.
///
/// # Errors
///
/// - `404` when the item is absent, inactive, or the caller holds no
///   active membership in the owning team
/// - `400` when the assignee is not an active member of the owning team
pub async fn update_work_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(work_item_id): Path<Uuid>,
    Json(req): Json<UpdateWorkItemRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    let locked = WorkItem::lock_for_member_update(&mut *tx, work_item_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Work item not found or access denied".to_string()))?;

    if let Some(assignee_id) = req.assignee_id {
        if !Membership::is_active_member(&mut *tx, locked.team_id, assignee_id).await? {
            return Err(ApiError::Conflict(
                "Assignee must be a team member".to_string(),
            ));
        }
    }

    // The rule fires on every update, whether or not the status changed.
    let completed_at = resolve_completed_at(req.status, locked.completed_at, Utc::now());

    WorkItem::apply_update(
        &mut *tx,
        work_item_id,
        UpdateWorkItem {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            assignee_id: req.assignee_id,
        },
        completed_at,
    )
    .await?;

    tx.commit().await?;

    Ok(Json(MessageResponse::new("Work item updated successfully")))
}

/// Soft-deletes a work item
///
/// # Errors
///
/// - `404` when the item is absent, inactive, or the caller is neither an
///   active team lead of the owning team nor the item's creator
pub async fn delete_work_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(work_item_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted =
        WorkItem::soft_delete_for_lead_or_creator(&state.db, work_item_id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound(
            "Work item not found or insufficient permissions".to_string(),
        ));
    }

    Ok(Json(MessageResponse::new("Work item deleted successfully")))
}
