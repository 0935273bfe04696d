/// Project model and database operations
///
/// Projects belong to exactly one team. Access always resolves through an
/// active membership in that team, and the membership predicate is embedded
/// in each mutating statement so the check and the write are one atomic
/// operation.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('planning', 'active', 'on_hold', 'completed', 'cancelled');
/// CREATE TYPE priority AS ENUM ('low', 'medium', 'high', 'critical');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(200) NOT NULL,
///     description VARCHAR(1000) NOT NULL DEFAULT '',
///     status project_status NOT NULL DEFAULT 'planning',
///     priority priority NOT NULL DEFAULT 'medium',
///     start_date DATE,
///     end_date DATE,
///     team_id UUID NOT NULL REFERENCES teams(id),
///     created_by UUID NOT NULL REFERENCES users(id),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Being scoped, no work started
    Planning,

    /// Work in progress
    Active,

    /// Paused
    OnHold,

    /// Finished
    Completed,

    /// Abandoned
    Cancelled,
}

impl ProjectStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

/// Priority scale shared by projects and work items
///
/// The Postgres enum is declared low → critical, so `ORDER BY priority DESC`
/// puts the most urgent entries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Converts priority to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// Priority
    pub priority: Priority,

    /// Optional planned start
    pub start_date: Option<NaiveDate>,

    /// Optional planned end
    pub end_date: Option<NaiveDate>,

    /// Owning team
    pub team_id: Uuid,

    /// User who created the project
    pub created_by: Uuid,

    /// Soft-delete flag
    pub is_active: bool,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub team_id: Uuid,
}

/// Input for updating a project
///
/// Updates are a wholesale overwrite, not a patch: every field is written.
#[derive(Debug, Clone)]
pub struct UpdateProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Project listing row with owning team, creator, and task counts by status
///
/// Counts cover active work items only; a project with no tasks reports
/// zeros, never an error.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectWithCounts {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub team_id: Uuid,
    pub team_name: String,
    pub creator_id: Uuid,
    pub creator_first_name: String,
    pub creator_last_name: String,
    pub total_tasks: i64,
    pub todo_tasks: i64,
    pub in_progress_tasks: i64,
    pub review_tasks: i64,
    pub done_tasks: i64,
}

impl Project {
    /// Creates a new project
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateProject,
        creator_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, status, priority, start_date, end_date,
                                  team_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, status, priority, start_date, end_date,
                      team_id, created_by, is_active, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.team_id)
        .bind(creator_id)
        .fetch_one(executor)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID, regardless of state
    ///
    /// Used where the caller only needs the owning team (e.g. assignee
    /// validation); access checks happen separately.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, status, priority, start_date, end_date,
                   team_id, created_by, is_active, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(project)
    }

    /// Finds an active project visible to the given user
    ///
    /// Returns None when the project is absent, inactive, or the user holds
    /// no active membership in its team; callers cannot distinguish the
    /// cases, which is the point.
    pub async fn find_active_for_member(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.status, p.priority, p.start_date,
                   p.end_date, p.team_id, p.created_by, p.is_active, p.created_at
            FROM projects p
            WHERE p.id = $1 AND p.is_active
              AND EXISTS(
                  SELECT 1 FROM memberships m
                  WHERE m.team_id = p.team_id AND m.user_id = $2 AND m.is_active
              )
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(project)
    }

    /// Checks whether a user can reach a project
    ///
    /// True when the project is active and the user is an active member of
    /// its team.
    pub async fn has_member_access(
        executor: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM projects p
                JOIN memberships m ON m.team_id = p.team_id
                WHERE p.id = $1 AND p.is_active
                  AND m.user_id = $2 AND m.is_active
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Lists the user's active projects with task counts by status
    ///
    /// Covers every active project whose team the user is an active member
    /// of, newest first.
    pub async fn list_for_user_with_counts(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Vec<ProjectWithCounts>, sqlx::Error> {
        let projects = sqlx::query_as::<_, ProjectWithCounts>(
            r#"
            SELECT p.id, p.name, p.description, p.status, p.priority, p.start_date,
                   p.end_date, p.created_at,
                   t.id AS team_id, t.name AS team_name,
                   c.id AS creator_id,
                   c.first_name AS creator_first_name,
                   c.last_name AS creator_last_name,
                   COUNT(w.id) FILTER (WHERE w.is_active) AS total_tasks,
                   COUNT(w.id) FILTER (WHERE w.is_active AND w.status = 'todo') AS todo_tasks,
                   COUNT(w.id) FILTER (WHERE w.is_active AND w.status = 'in_progress') AS in_progress_tasks,
                   COUNT(w.id) FILTER (WHERE w.is_active AND w.status = 'review') AS review_tasks,
                   COUNT(w.id) FILTER (WHERE w.is_active AND w.status = 'done') AS done_tasks
            FROM projects p
            JOIN teams t ON t.id = p.team_id
            JOIN users c ON c.id = p.created_by
            LEFT JOIN work_items w ON w.project_id = p.id
            WHERE p.is_active
              AND EXISTS(
                  SELECT 1 FROM memberships m
                  WHERE m.team_id = p.team_id AND m.user_id = $1 AND m.is_active
              )
            GROUP BY p.id, t.id, c.id
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(projects)
    }

    /// Overwrites a project's fields, gated on the caller's membership
    ///
    /// The membership predicate is part of the UPDATE statement, so the
    /// authorization check and the write are a single atomic operation.
    /// Returns false when the project is absent, inactive, or the caller
    /// holds no active membership.
    pub async fn update_for_member(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        data: UpdateProject,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE projects p
            SET name = $3, description = $4, status = $5, priority = $6,
                start_date = $7, end_date = $8
            WHERE p.id = $1 AND p.is_active
              AND EXISTS(
                  SELECT 1 FROM memberships m
                  WHERE m.team_id = p.team_id AND m.user_id = $2 AND m.is_active
              )
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.start_date)
        .bind(data.end_date)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-deletes a project when the caller is a team lead or its creator
    ///
    /// Returns false when the project is absent, inactive, or the caller is
    /// neither an active lead of the owning team nor the original creator.
    /// Work items beneath the project keep their own active flag; only team
    /// deletion cascades.
    pub async fn soft_delete_for_lead_or_creator(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE projects p
            SET is_active = FALSE
            WHERE p.id = $1 AND p.is_active
              AND (
                  p.created_by = $2
                  OR EXISTS(
                      SELECT 1 FROM memberships m
                      WHERE m.team_id = p.team_id AND m.user_id = $2
                        AND m.role = 'team_lead' AND m.is_active
                  )
              )
            "#,
        )
        .bind(id)
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
    fn test_project_status_as_str() {
        assert_eq!(ProjectStatus::Planning.as_str(), "planning");
        assert_eq!(ProjectStatus::Active.as_str(), "active");
        assert_eq!(ProjectStatus::OnHold.as_str(), "on_hold");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
        assert_eq!(ProjectStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_priority_as_str() {
        assert_eq!(Priority::Low.as_str(), "low");
        assert_eq!(Priority::Medium.as_str(), "medium");
        assert_eq!(Priority::High.as_str(), "high");
        assert_eq!(Priority::Critical.as_str(), "critical");
    }

    #[test]
    fn test_enums_serialize_as_snake_case_strings() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::OnHold).unwrap(),
            "\"on_hold\""
        );
        assert_eq!(
            serde_json::to_string(&Priority::Critical).unwrap(),
            "\"critical\""
        );
    }

    #[test]
    fn test_enums_deserialize_from_snake_case_strings() {
        let status: ProjectStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(status, ProjectStatus::OnHold);

        let priority: Priority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(priority, Priority::Medium);
    }
}
