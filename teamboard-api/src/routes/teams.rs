/// Team lifecycle and membership endpoints
///
/// # Endpoints
///
/// - `GET /teams` - Teams the caller belongs to, with roster preview
/// - `POST /teams` - Create a team; the caller becomes its team lead
/// - `GET /teams/:team_id/members` - Full active roster (members only)
/// - `POST /teams/:team_id/members` - Add or reactivate a member (leads only)
/// - `DELETE /teams/:team_id/members/:member_id` - Remove a member (leads only)
/// - `DELETE /teams/:team_id` - Soft-delete the team and everything beneath it
///
/// Lead-gated mutations run their permission check inside the same
/// transaction as the write, so a lead demoted mid-request cannot slip a
/// mutation through.

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
    auth::{
        authorization::{require_membership, require_team_lead},
        middleware::AuthContext,
    },
    models::{
        membership::{MemberWithUser, Membership, TeamRole},
        team::{CreateTeam, Team},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// How many members each team embeds in the listing as a preview
const MEMBER_PREVIEW_LIMIT: usize = 5;

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    /// Free-form description
    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,
}

/// Add member request
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Email of the user to add
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Creator projection embedded in team responses
#[derive(Debug, Serialize)]
pub struct TeamCreatorDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Member projection embedded in rosters
#[derive(Debug, Serialize)]
pub struct TeamMemberDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: TeamRole,
}

impl From<MemberWithUser> for TeamMemberDto {
    fn from(m: MemberWithUser) -> Self {
        Self {
            id: m.user_id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            role: m.role,
        }
    }
}

/// Team listing entry
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub creator: TeamCreatorDto,
    pub my_role: TeamRole,
    pub member_count: i64,
    /// First few active members, for preview purposes only
    pub members: Vec<TeamMemberDto>,
}

/// Created team response
#[derive(Debug, Serialize)]
pub struct CreateTeamResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub creator: TeamCreatorDto,
    pub member_count: i64,
}

/// Added (or reactivated) member response
#[derive(Debug, Serialize)]
pub struct AddMemberResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
}

/// Lists every team where the caller holds an active membership
///
/// Each entry embeds the creator, the caller's role, the active member
/// count, and up to five members as a roster preview.
pub async fn list_my_teams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TeamResponse>>> {
    let teams = Team::list_for_user(&state.db, auth.user_id).await?;

    let mut responses = Vec::with_capacity(teams.len());

    for team in teams {
        let roster = Membership::list_active_with_users(&state.db, team.id).await?;

        responses.push(TeamResponse {
            id: team.id,
            name: team.name,
            description: team.description,
            created_at: team.created_at,
            creator: TeamCreatorDto {
                id: team.creator_id,
                first_name: team.creator_first_name,
                last_name: team.creator_last_name,
                email: team.creator_email,
            },
            my_role: team.my_role,
            member_count: roster.len() as i64,
            members: roster
                .into_iter()
                .take(MEMBER_PREVIEW_LIMIT)
                .map(TeamMemberDto::from)
                .collect(),
        });
    }

    Ok(Json(responses))
}

/// Creates a team with the caller as its team lead
///
/// The team row and the lead membership are written as one transaction; a
/// team can never exist without a lead.
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<Json<CreateTeamResponse>> {
    req.validate()?;

    let team = Team::create_with_lead(
        &state.db,
        CreateTeam {
            name: req.name,
            description: req.description,
        },
        auth.user_id,
    )
    .await?;

    let creator = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Authenticated user not found".to_string()))?;

    Ok(Json(CreateTeamResponse {
        id: team.id,
        name: team.name,
        description: team.description,
        created_at: team.created_at,
        creator: TeamCreatorDto {
            id: creator.id,
            first_name: creator.first_name,
            last_name: creator.last_name,
            email: creator.email,
        },
        member_count: 1,
    }))
}

/// Lists the full active roster of a team
///
/// # Errors
///
/// - `403` when the caller is not an active member of the team
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TeamMemberDto>>> {
    require_membership(&state.db, team_id, auth.user_id).await?;

    let roster = Membership::list_active_with_users(&state.db, team_id).await?;

    Ok(Json(roster.into_iter().map(TeamMemberDto::from).collect()))
}

/// Adds a user to a team by email, or reactivates their old membership
///
/// A previously removed member gets their original row back with the role
/// reset to plain member and the join time refreshed.
///
/// # Errors
///
/// - `403` when the caller is not an active team lead
/// - `400` when no active user holds the email, or the user is already an
///   active member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<AddMemberResponse>> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    require_team_lead(&mut *tx, team_id, auth.user_id).await?;

    let user_to_add = User::find_active_by_email(&mut *tx, &req.email)
        .await?
        .ok_or_else(|| ApiError::BadRequest("User not found".to_string()))?;

    let membership = match Membership::find(&mut *tx, team_id, user_to_add.id).await? {
        Some(existing) if existing.is_active => {
            return Err(ApiError::Conflict(
                "User is already a team member".to_string(),
            ));
        }
        Some(_) => Membership::reactivate(&mut *tx, team_id, user_to_add.id).await?,
        None => Membership::create(&mut *tx, team_id, user_to_add.id, TeamRole::Member).await?,
    };

    tx.commit().await?;

    Ok(Json(AddMemberResponse {
        id: user_to_add.id,
        first_name: user_to_add.first_name,
        last_name: user_to_add.last_name,
        email: user_to_add.email,
        role: membership.role,
        joined_at: membership.joined_at,
    }))
}

/// Removes a member from a team
///
/// # Errors
///
/// - `403` when the caller is not an active team lead
/// - `400` when the caller targets themselves (blocked unconditionally,
///   even when another lead exists) or the target is a team lead
/// - `404` when the target membership is absent or already inactive
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    let mut tx = state.db.begin().await?;

    require_team_lead(&mut *tx, team_id, auth.user_id).await?;

    if member_id == auth.user_id {
        return Err(ApiError::Conflict(
            "Team leads cannot remove themselves from the team".to_string(),
        ));
    }

    let membership = Membership::find(&mut *tx, team_id, member_id)
        .await?
        .filter(|m| m.is_active)
        .ok_or_else(|| ApiError::NotFound("Team member not found".to_string()))?;

    if membership.role == TeamRole::TeamLead {
        return Err(ApiError::Conflict("Cannot remove a team lead".to_string()));
    }

    Membership::deactivate(&mut *tx, team_id, member_id).await?;

    tx.commit().await?;

    Ok(Json(MessageResponse::new("Member removed successfully")))
}

/// Soft-deletes a team and everything beneath it
///
/// Deactivates all membership rows, the team's projects and their work
/// items, then the team itself, as one transaction.
///
/// # Errors
///
/// - `403` when the caller is not an active team lead
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let mut tx = state.db.begin().await?;

    require_team_lead(&mut *tx, team_id, auth.user_id).await?;

    Team::soft_delete_cascade(&mut *tx, team_id).await?;

    tx.commit().await?;

    Ok(Json(MessageResponse::new("Team deleted successfully")))
}
