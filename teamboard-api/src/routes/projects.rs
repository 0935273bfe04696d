/// Project lifecycle endpoints
///
/// # Endpoints
///
/// - `GET /projects` - Active projects of the caller's teams, with task counts
/// - `GET /projects/:project_id` - Full detail: team roster + board
/// - `POST /projects` - Create a project in a team (members only)
/// - `PUT /projects/:project_id` - Wholesale overwrite
/// - `DELETE /projects/:project_id` - Soft-delete (lead or creator)
///
/// Reads answer 404 for anything the caller cannot reach, whether or not it
/// exists: membership is checked inside the query, so non-members cannot
/// probe for project IDs.

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
    auth::{authorization::require_membership, middleware::AuthContext},
    models::{
        membership::{Membership, TeamRole},
        project::{CreateProject, Priority, Project, ProjectStatus, UpdateProject},
        team::Team,
        user::User,
        work_item::{WorkItem, WorkItemStatus},
    },
};
use uuid::Uuid;
use validator::Validate;

fn default_status() -> ProjectStatus {
    ProjectStatus::Planning
}

fn default_priority() -> Priority {
    Priority::Medium
}

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    /// Free-form description
    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,

    /// Owning team
    pub team_id: Uuid,

    /// Lifecycle status (defaults to planning)
    #[serde(default = "default_status")]
    pub status: ProjectStatus,

    /// Priority (defaults to medium)
    #[serde(default = "default_priority")]
    pub priority: Priority,

    /// Optional planned start
    pub start_date: Option<NaiveDate>,

    /// Optional planned end
    pub end_date: Option<NaiveDate>,
}

/// Update project request
///
/// Updates replace the project wholesale: omitted fields fall back to the
/// request defaults rather than keeping their stored values.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,

    #[serde(default = "default_status")]
    pub status: ProjectStatus,

    #[serde(default = "default_priority")]
    pub priority: Priority,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,
}

/// Owning team projection for listings
#[derive(Debug, Serialize)]
pub struct ProjectTeamDto {
    pub id: Uuid,
    pub name: String,
}

/// Creator projection for listings
#[derive(Debug, Serialize)]
pub struct ProjectCreatorDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

/// Task counts by status, over active work items only
#[derive(Debug, Serialize)]
pub struct TaskCountsDto {
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub review: i64,
    pub done: i64,
}

/// Project listing entry
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub team: ProjectTeamDto,
    pub creator: ProjectCreatorDto,
    pub task_counts: TaskCountsDto,
}

/// Team projection with roster, embedded in the project detail
#[derive(Debug, Serialize)]
pub struct ProjectTeamDetailDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub members: Vec<ProjectTeamMemberDto>,
}

/// Roster entry embedded in the project detail
#[derive(Debug, Serialize)]
pub struct ProjectTeamMemberDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: TeamRole,
}

/// Creator projection embedded in the project detail
#[derive(Debug, Serialize)]
pub struct ProjectCreatorDetailDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Assignee projection embedded in board entries
#[derive(Debug, Serialize)]
pub struct ProjectTaskAssigneeDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

/// Board entry embedded in the project detail
#[derive(Debug, Serialize)]
pub struct ProjectTaskDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: WorkItemStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub assignee: Option<ProjectTaskAssigneeDto>,
}

/// Project detail response
#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub team: ProjectTeamDetailDto,
    pub creator: ProjectCreatorDetailDto,
    pub tasks: Vec<ProjectTaskDto>,
}

/// Created project response
#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub team: ProjectTeamDto,
    pub creator: ProjectCreatorDto,
}

/// Lists the caller's active projects with task counts by status
pub async fn list_my_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectListResponse>>> {
    let projects = Project::list_for_user_with_counts(&state.db, auth.user_id).await?;

    let responses = projects
        .into_iter()
        .map(|p| ProjectListResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            status: p.status,
            priority: p.priority,
            start_date: p.start_date,
            end_date: p.end_date,
            created_at: p.created_at,
            team: ProjectTeamDto {
                id: p.team_id,
                name: p.team_name,
            },
            creator: ProjectCreatorDto {
                id: p.creator_id,
                first_name: p.creator_first_name,
                last_name: p.creator_last_name,
            },
            task_counts: TaskCountsDto {
                total: p.total_tasks,
                todo: p.todo_tasks,
                in_progress: p.in_progress_tasks,
                review: p.review_tasks,
                done: p.done_tasks,
            },
        })
        .collect();

    Ok(Json(responses))
}

/// Returns a project with its team roster and board
///
/// # Errors
///
/// - `404` when the project is absent, inactive, or the caller is not an
///   active member of its team; the cases are indistinguishable
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetailResponse>> {
    let project = Project::find_active_for_member(&state.db, project_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found or access denied".to_string()))?;

    let team = Team::find_active_by_id(&state.db, project.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found or access denied".to_string()))?;

    let roster = Membership::list_active_with_users(&state.db, team.id).await?;

    let creator = User::find_by_id(&state.db, project.created_by)
        .await?
        .ok_or_else(|| ApiError::InternalError("Project creator not found".to_string()))?;

    let tasks = WorkItem::list_for_project(&state.db, project.id).await?;

    Ok(Json(ProjectDetailResponse {
        id: project.id,
        name: project.name,
        description: project.description,
        status: project.status,
        priority: project.priority,
        start_date: project.start_date,
        end_date: project.end_date,
        created_at: project.created_at,
        team: ProjectTeamDetailDto {
            id: team.id,
            name: team.name,
            description: team.description,
            members: roster
                .into_iter()
                .map(|m| ProjectTeamMemberDto {
                    id: m.user_id,
                    first_name: m.first_name,
                    last_name: m.last_name,
                    email: m.email,
                    role: m.role,
                })
                .collect(),
        },
        creator: ProjectCreatorDetailDto {
            id: creator.id,
            first_name: creator.first_name,
            last_name: creator.last_name,
            email: creator.email,
        },
        tasks: tasks
            .into_iter()
            .map(|t| ProjectTaskDto {
                id: t.id,
                title: t.title,
                description: t.description,
                status: t.status,
                priority: t.priority,
                due_date: t.due_date,
                created_at: t.created_at,
                assignee: t.assignee_id.map(|id| ProjectTaskAssigneeDto {
                    id,
                    first_name: t.assignee_first_name.unwrap_or_default(),
                    last_name: t.assignee_last_name.unwrap_or_default(),
                }),
            })
            .collect(),
    }))
}

/// Creates a project in a team
///
/// # Errors
///
/// - `403` when the caller is not an active member of the target team
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<CreateProjectResponse>> {
    req.validate()?;

    require_membership(&state.db, req.team_id, auth.user_id).await?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            status: req.status,
            priority: req.priority,
            start_date: req.start_date,
            end_date: req.end_date,
            team_id: req.team_id,
        },
        auth.user_id,
    )
    .await?;

    let team = Team::find_active_by_id(&state.db, project.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    let creator = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Authenticated user not found".to_string()))?;

    Ok(Json(CreateProjectResponse {
        id: project.id,
        name: project.name,
        description: project.description,
        status: project.status,
        priority: project.priority,
        start_date: project.start_date,
        end_date: project.end_date,
        created_at: project.created_at,
        team: ProjectTeamDto {
            id: team.id,
            name: team.name,
        },
        creator: ProjectCreatorDto {
            id: creator.id,
            first_name: creator.first_name,
            last_name: creator.last_name,
        },
    }))
}

/// Overwrites a project's fields
///
/// # Errors
///
/// - `404` when the project is absent, inactive, or the caller holds no
///   active membership in its team
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let updated = Project::update_for_member(
        &state.db,
        project_id,
        UpdateProject {
            name: req.name,
            description: req.description,
            status: req.status,
            priority: req.priority,
            start_date: req.start_date,
            end_date: req.end_date,
        },
        auth.user_id,
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound(
            "Project not found or access denied".to_string(),
        ));
    }

    Ok(Json(MessageResponse::new("Project updated successfully")))
}

/// Soft-deletes a project
///
/// # Errors
///
/// - `404` when the project is absent, inactive, or the caller is neither
///   an active team lead of the owning team nor the project's creator
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted =
        Project::soft_delete_for_lead_or_creator(&state.db, project_id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound(
            "Project not found or insufficient permissions".to_string(),
        ));
    }

    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
