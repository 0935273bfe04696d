/// Team model and database operations
///
/// Teams are the unit of multi-tenant isolation: they own memberships and
/// projects, and every authorization decision resolves through a team.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(200) NOT NULL,
///     description VARCHAR(1000) NOT NULL DEFAULT '',
///     created_by UUID NOT NULL REFERENCES users(id),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::membership::{Membership, TeamRole};

/// Team model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID (UUID v4)
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// User who created the team (and became its first lead)
    pub created_by: Uuid,

    /// Soft-delete flag
    pub is_active: bool,

    /// When the team was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new team
#[derive(Debug, Clone)]
pub struct CreateTeam {
    /// Team name
    pub name: String,

    /// Free-form description
    pub description: String,
}

/// A team row joined with the caller's role and the creator projection
///
/// Shape of the "my teams" listing before the roster preview is attached.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeamForUser {
    /// Team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// The caller's role in this team
    pub my_role: TeamRole,

    /// Creator's user ID
    pub creator_id: Uuid,

    /// Creator's given name
    pub creator_first_name: String,

    /// Creator's family name
    pub creator_last_name: String,

    /// Creator's email
    pub creator_email: String,
}

impl Team {
    /// Creates a team and its creator's team-lead membership as one unit
    ///
    /// The two inserts run in a single transaction so a team can never be
    /// left without a lead if the second insert fails.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails; nothing is persisted in
    /// that case.
    pub async fn create_with_lead(
        pool: &PgPool,
        data: CreateTeam,
        creator_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by, is_active, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(creator_id)
        .fetch_one(&mut *tx)
        .await?;

        Membership::create(&mut *tx, team.id, creator_id, TeamRole::TeamLead).await?;

        tx.commit().await?;

        debug!(team_id = %team.id, creator = %creator_id, "Team created");

        Ok(team)
    }

    /// Finds an active team by ID
    pub async fn find_active_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by, is_active, created_at
            FROM teams
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(team)
    }

    /// Lists every active team where the user holds an active membership
    ///
    /// Each row carries the caller's own role and the creator projection;
    /// newest teams first.
    pub async fn list_for_user(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Vec<TeamForUser>, sqlx::Error> {
        let teams = sqlx::query_as::<_, TeamForUser>(
            r#"
            SELECT t.id, t.name, t.description, t.created_at,
                   m.role AS my_role,
                   c.id AS creator_id,
                   c.first_name AS creator_first_name,
                   c.last_name AS creator_last_name,
                   c.email AS creator_email
            FROM teams t
            JOIN memberships m ON m.team_id = t.id AND m.user_id = $1 AND m.is_active
            JOIN users c ON c.id = t.created_by
            WHERE t.is_active
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(teams)
    }

    /// Soft-deletes a team and everything beneath it
    ///
    /// Deactivates every membership row (whatever its state), every project
    /// of the team, every work item of those projects, and finally the team
    /// itself. Must run inside the caller's transaction, after the team-lead
    /// check, so the permission cannot be revoked between the check and the
    /// delete.
    pub async fn soft_delete_cascade(
        conn: &mut PgConnection,
        team_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        Membership::deactivate_all_for_team(&mut *conn, team_id).await?;

        sqlx::query(
            r#"
            UPDATE work_items SET is_active = FALSE
            WHERE project_id IN (SELECT id FROM projects WHERE team_id = $1)
            "#,
        )
        .bind(team_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query("UPDATE projects SET is_active = FALSE WHERE team_id = $1")
            .bind(team_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("UPDATE teams SET is_active = FALSE WHERE id = $1")
            .bind(team_id)
            .execute(&mut *conn)
            .await?;

        debug!(team_id = %team_id, "Team soft-deleted with cascade");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team_struct() {
        let create = CreateTeam {
            name: "Engineering".to_string(),
            description: "Builds the product".to_string(),
        };

        assert_eq!(create.name, "Engineering");
        assert_eq!(create.description, "Builds the product");
    }
}
