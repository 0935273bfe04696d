/// Authorization checks: the membership oracle
///
/// Every team-scoped operation consults this module before touching data.
/// The checks are plain EXISTS queries over active membership rows and are
/// generic over the executor, so mutating flows can run them on the same
/// transaction as the write and close the check-then-act window.
///
/// # Example
///
/// ```no_run
/// use teamboard_shared::auth::authorization::require_team_lead;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, team_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
/// require_team_lead(&mut *tx, team_id, user_id).await?;
/// // ... mutate team-scoped data on the same transaction ...
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{membership::Membership, project::Project};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User holds no active membership in the team
    #[error("Not a member of team {0}")]
    NotMember(Uuid),

    /// User is not an active team lead of the team
    #[error("Not a team lead of team {0}")]
    NotTeamLead(Uuid),

    /// Project is absent, inactive, or the user cannot reach it
    #[error("No access to project {0}")]
    NoProjectAccess(Uuid),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Requires an active membership in the team
///
/// # Errors
///
/// Returns `AuthzError::NotMember` when the user holds no active membership.
pub async fn require_membership(
    executor: impl PgExecutor<'_>,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    if !Membership::is_active_member(executor, team_id, user_id).await? {
        return Err(AuthzError::NotMember(team_id));
    }

    Ok(())
}

/// Requires an active team-lead membership in the team
///
/// # Errors
///
/// Returns `AuthzError::NotTeamLead` when the user is not an active lead,
/// including when they are not a member at all.
pub async fn require_team_lead(
    executor: impl PgExecutor<'_>,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    if !Membership::is_team_lead(executor, team_id, user_id).await? {
        return Err(AuthzError::NotTeamLead(team_id));
    }

    Ok(())
}

/// Requires that the project is active and the user a member of its team
///
/// # Errors
///
/// Returns `AuthzError::NoProjectAccess` when the project is absent,
/// inactive, or the user holds no active membership in its team.
pub async fn require_project_access(
    executor: impl PgExecutor<'_>,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    if !Project::has_member_access(executor, project_id, user_id).await? {
        return Err(AuthzError::NoProjectAccess(project_id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authz_error_display() {
        let team = Uuid::new_v4();

        assert!(AuthzError::NotMember(team).to_string().contains("Not a member"));
        assert!(AuthzError::NotTeamLead(team)
            .to_string()
            .contains("Not a team lead"));
        assert!(AuthzError::NoProjectAccess(team)
            .to_string()
            .contains("No access to project"));
    }
}
