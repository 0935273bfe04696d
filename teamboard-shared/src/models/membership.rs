/// Membership model and database operations
///
/// Memberships are the Team × User join rows that carry a per-team role.
/// They are the source of truth for every authorization decision in the
/// system: no team-scoped data is read or mutated without an active
/// membership check against this table.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE team_role AS ENUM ('team_lead', 'member');
///
/// CREATE TABLE memberships (
///     team_id UUID NOT NULL REFERENCES teams(id),
///     user_id UUID NOT NULL REFERENCES users(id),
///     role team_role NOT NULL DEFAULT 'member',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     PRIMARY KEY (team_id, user_id)
/// );
/// ```
///
/// The composite primary key means a user has at most one membership row per
/// team; removing and re-adding a member reactivates the same row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Role a user holds within one team
///
/// Team roles are independent of the global user role: the same user can be
/// a team lead in one team and a plain member in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Can add/remove members and delete team-scoped resources
    TeamLead,

    /// Regular member
    Member,
}

impl TeamRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::TeamLead => "team_lead",
            TeamRole::Member => "member",
        }
    }

    /// Can add and remove team members
    pub fn can_manage_members(&self) -> bool {
        matches!(self, TeamRole::TeamLead)
    }

    /// Can delete the team and any team-scoped resource
    pub fn can_delete_team_resources(&self) -> bool {
        matches!(self, TeamRole::TeamLead)
    }
}

/// Membership row linking a user to a team with a role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Team ID
    pub team_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the team
    pub role: TeamRole,

    /// When the user joined (refreshed on reactivation)
    pub joined_at: DateTime<Utc>,

    /// Soft-delete flag; an inactive row is a removed member
    pub is_active: bool,
}

/// Membership row joined with the member's user projection
///
/// Used for team rosters; never exposes the password hash.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MemberWithUser {
    /// The member's user ID
    pub user_id: Uuid,

    /// The member's email
    pub email: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Role within the team
    pub role: TeamRole,

    /// When the user joined the team
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    /// Inserts a new membership row
    ///
    /// # Errors
    ///
    /// Fails with a unique constraint violation when a row for the
    /// (team, user) pair already exists; callers are expected to look the
    /// pair up first and reactivate instead.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (team_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING team_id, user_id, role, joined_at, is_active
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(membership)
    }

    /// Finds the membership row for a (team, user) pair, in any state
    pub async fn find(
        executor: impl PgExecutor<'_>,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT team_id, user_id, role, joined_at, is_active
            FROM memberships
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(membership)
    }

    /// Checks whether a user is an active member of a team
    pub async fn is_active_member(
        executor: impl PgExecutor<'_>,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships
                WHERE team_id = $1 AND user_id = $2 AND is_active
            )
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Checks whether a user is an active team lead of a team
    pub async fn is_team_lead(
        executor: impl PgExecutor<'_>,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships
                WHERE team_id = $1 AND user_id = $2
                  AND role = 'team_lead' AND is_active
            )
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Reactivates a previously removed membership
    ///
    /// The role is reset to plain member and joined_at refreshed, matching
    /// the semantics of re-adding someone who left: they do not get their
    /// old role back.
    pub async fn reactivate(
        executor: impl PgExecutor<'_>,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships
            SET is_active = TRUE, role = 'member', joined_at = NOW()
            WHERE team_id = $1 AND user_id = $2
            RETURNING team_id, user_id, role, joined_at, is_active
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(membership)
    }

    /// Deactivates a membership (removes the member)
    pub async fn deactivate(
        executor: impl PgExecutor<'_>,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE memberships SET is_active = FALSE WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deactivates every membership row under a team, whatever its state
    ///
    /// Part of the team-deletion cascade.
    pub async fn deactivate_all_for_team(
        executor: impl PgExecutor<'_>,
        team_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE memberships SET is_active = FALSE WHERE team_id = $1")
            .bind(team_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists the active roster of a team with user projections
    ///
    /// Ordered by join time so the roster is stable across calls.
    pub async fn list_active_with_users(
        executor: impl PgExecutor<'_>,
        team_id: Uuid,
    ) -> Result<Vec<MemberWithUser>, sqlx::Error> {
        let members = sqlx::query_as::<_, MemberWithUser>(
            r#"
            SELECT m.user_id, u.email, u.first_name, u.last_name, m.role, m.joined_at
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.team_id = $1 AND m.is_active
            ORDER BY m.joined_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(executor)
        .await?;

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_role_as_str() {
        assert_eq!(TeamRole::TeamLead.as_str(), "team_lead");
        assert_eq!(TeamRole::Member.as_str(), "member");
    }

    #[test]
    fn test_team_role_permissions() {
        assert!(TeamRole::TeamLead.can_manage_members());
        assert!(TeamRole::TeamLead.can_delete_team_resources());

        assert!(!TeamRole::Member.can_manage_members());
        assert!(!TeamRole::Member.can_delete_team_resources());
    }

    #[test]
    fn test_team_role_serializes_as_string() {
        assert_eq!(
            serde_json::to_string(&TeamRole::TeamLead).unwrap(),
            "\"team_lead\""
        );
        assert_eq!(
            serde_json::to_string(&TeamRole::Member).unwrap(),
            "\"member\""
        );
    }
}
