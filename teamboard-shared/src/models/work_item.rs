/// Work item model and database operations
///
/// Work items are the tasks on a project's board. Status moves freely
/// between any two values; `Done` is terminal in a business sense only.
/// The completion timestamp is derived state: it is non-null exactly when
/// the status is `Done`, stamped on the transition in and cleared on the
/// transition out.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE work_item_status AS ENUM ('todo', 'in_progress', 'review', 'done');
///
/// CREATE TABLE work_items (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description VARCHAR(2000) NOT NULL DEFAULT '',
///     status work_item_status NOT NULL DEFAULT 'todo',
///     priority priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     completed_at TIMESTAMPTZ,
///     project_id UUID NOT NULL REFERENCES projects(id),
///     assignee_id UUID REFERENCES users(id),
///     created_by UUID NOT NULL REFERENCES users(id),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use super::project::Priority;

/// Board column of a work item
///
/// Declared todo → done in Postgres so `ORDER BY status ASC` walks the
/// board left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "work_item_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl WorkItemStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemStatus::Todo => "todo",
            WorkItemStatus::InProgress => "in_progress",
            WorkItemStatus::Review => "review",
            WorkItemStatus::Done => "done",
        }
    }
}

/// Resolves the completion timestamp for a work item entering `status`
///
/// The rule runs on every write, whether or not the status changed:
/// moving into `Done` stamps `now` unless a timestamp already exists
/// (never re-stamped), and any other status clears it.
pub fn resolve_completed_at(
    status: WorkItemStatus,
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if status == WorkItemStatus::Done {
        current.or(Some(now))
    } else {
        None
    }
}

/// Work item model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkItem {
    /// Unique work item ID (UUID v4)
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Board column
    pub status: WorkItemStatus,

    /// Priority
    pub priority: Priority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Non-null exactly when status is Done
    pub completed_at: Option<DateTime<Utc>>,

    /// Owning project
    pub project_id: Uuid,

    /// Optional assignee; must be an active member of the project's team
    pub assignee_id: Option<Uuid>,

    /// User who created the item
    pub created_by: Uuid,

    /// Soft-delete flag
    pub is_active: bool,

    /// When the item was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new work item
#[derive(Debug, Clone)]
pub struct CreateWorkItem {
    pub title: String,
    pub description: String,
    pub status: WorkItemStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub project_id: Uuid,
    pub assignee_id: Option<Uuid>,
}

/// Input for updating a work item
///
/// Updates are a wholesale overwrite: every field is written, including a
/// None assignee (which unassigns).
#[derive(Debug, Clone)]
pub struct UpdateWorkItem {
    pub title: String,
    pub description: String,
    pub status: WorkItemStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
}

/// Listing row with assignee/creator projections and attachment count
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WorkItemListRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: WorkItemStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub assignee_id: Option<Uuid>,
    pub assignee_first_name: Option<String>,
    pub assignee_last_name: Option<String>,
    pub assignee_email: Option<String>,
    pub creator_id: Uuid,
    pub creator_first_name: String,
    pub creator_last_name: String,
    pub attachment_count: i64,
}

/// Detail row with the owning project and team attached
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WorkItemDetailRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: WorkItemStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub project_id: Uuid,
    pub project_name: String,
    pub team_id: Uuid,
    pub team_name: String,
    pub assignee_id: Option<Uuid>,
    pub assignee_first_name: Option<String>,
    pub assignee_last_name: Option<String>,
    pub assignee_email: Option<String>,
    pub creator_id: Uuid,
    pub creator_first_name: String,
    pub creator_last_name: String,
    pub creator_email: String,
}

/// The slice of a work item needed inside the update transaction
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkItemForUpdate {
    pub id: Uuid,
    pub completed_at: Option<DateTime<Utc>>,
    pub team_id: Uuid,
}

impl WorkItem {
    /// Creates a new work item
    ///
    /// `completed_at` is stamped when the item is created directly in
    /// `Done`; access and assignee validation are the caller's job.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateWorkItem,
        creator_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let completed_at = resolve_completed_at(data.status, None, Utc::now());

        let work_item = sqlx::query_as::<_, WorkItem>(
            r#"
            INSERT INTO work_items (title, description, status, priority, due_date,
                                    completed_at, project_id, assignee_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, description, status, priority, due_date, completed_at,
                      project_id, assignee_id, created_by, is_active, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(completed_at)
        .bind(data.project_id)
        .bind(data.assignee_id)
        .bind(creator_id)
        .fetch_one(executor)
        .await?;

        Ok(work_item)
    }

    /// Lists the active work items of a project in board order
    ///
    /// Status ascending, priority descending, oldest first within a cell.
    /// Callers must have verified project access already.
    pub async fn list_for_project(
        executor: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Vec<WorkItemListRow>, sqlx::Error> {
        let items = sqlx::query_as::<_, WorkItemListRow>(
            r#"
            SELECT w.id, w.title, w.description, w.status, w.priority, w.due_date,
                   w.completed_at, w.created_at,
                   a.id AS assignee_id,
                   a.first_name AS assignee_first_name,
                   a.last_name AS assignee_last_name,
                   a.email AS assignee_email,
                   c.id AS creator_id,
                   c.first_name AS creator_first_name,
                   c.last_name AS creator_last_name,
                   (SELECT COUNT(*) FROM attachments f
                    WHERE f.work_item_id = w.id AND f.is_active) AS attachment_count
            FROM work_items w
            LEFT JOIN users a ON a.id = w.assignee_id
            JOIN users c ON c.id = w.created_by
            WHERE w.project_id = $1 AND w.is_active
            ORDER BY w.status ASC, w.priority DESC, w.created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    /// Finds an active work item visible to the given user, with context
    ///
    /// Membership resolves through the parent project's team. Returns None
    /// when the item is absent, inactive, or the user holds no active
    /// membership; the cases are indistinguishable by design.
    pub async fn find_detail_for_member(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkItemDetailRow>, sqlx::Error> {
        let row = sqlx::query_as::<_, WorkItemDetailRow>(
            r#"
            SELECT w.id, w.title, w.description, w.status, w.priority, w.due_date,
                   w.completed_at, w.created_at,
                   p.id AS project_id, p.name AS project_name,
                   t.id AS team_id, t.name AS team_name,
                   a.id AS assignee_id,
                   a.first_name AS assignee_first_name,
                   a.last_name AS assignee_last_name,
                   a.email AS assignee_email,
                   c.id AS creator_id,
                   c.first_name AS creator_first_name,
                   c.last_name AS creator_last_name,
                   c.email AS creator_email
            FROM work_items w
            JOIN projects p ON p.id = w.project_id
            JOIN teams t ON t.id = p.team_id
            LEFT JOIN users a ON a.id = w.assignee_id
            JOIN users c ON c.id = w.created_by
            WHERE w.id = $1 AND w.is_active
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

        Ok(row)
    }

    /// Locks a work item for update, gated on the caller's membership
    ///
    /// Returns the current completion timestamp and the owning team so the
    /// assignee check and the completion rule run against state that cannot
    /// change under the caller. Must run inside a transaction.
    pub async fn lock_for_member_update(
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkItemForUpdate>, sqlx::Error> {
        let row = sqlx::query_as::<_, WorkItemForUpdate>(
            r#"
            SELECT w.id, w.completed_at, p.team_id
            FROM work_items w
            JOIN projects p ON p.id = w.project_id
            WHERE w.id = $1 AND w.is_active
              AND EXISTS(
                  SELECT 1 FROM memberships m
                  WHERE m.team_id = p.team_id AND m.user_id = $2 AND m.is_active
              )
            FOR UPDATE OF w
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Overwrites a work item's fields
    ///
    /// `completed_at` carries the value computed by [`resolve_completed_at`];
    /// this runs after [`WorkItem::lock_for_member_update`] in the same
    /// transaction.
    pub async fn apply_update(
        conn: &mut PgConnection,
        id: Uuid,
        data: UpdateWorkItem,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Self, sqlx::Error> {
        let work_item = sqlx::query_as::<_, WorkItem>(
            r#"
            UPDATE work_items
            SET title = $2, description = $3, status = $4, priority = $5,
                due_date = $6, assignee_id = $7, completed_at = $8
            WHERE id = $1
            RETURNING id, title, description, status, priority, due_date, completed_at,
                      project_id, assignee_id, created_by, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.assignee_id)
        .bind(completed_at)
        .fetch_one(conn)
        .await?;

        Ok(work_item)
    }

    /// Soft-deletes a work item when the caller is a team lead or its creator
    ///
    /// Returns false when the item is absent, inactive, or the caller is
    /// neither an active lead of the owning team nor the original creator.
    pub async fn soft_delete_for_lead_or_creator(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE work_items w
            SET is_active = FALSE
            WHERE w.id = $1 AND w.is_active
              AND (
                  w.created_by = $2
                  OR EXISTS(
                      SELECT 1 FROM memberships m
                      JOIN projects p ON p.id = w.project_id
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
    use chrono::Duration;

    #[test]
    fn test_status_as_str() {
        assert_eq!(WorkItemStatus::Todo.as_str(), "todo");
        assert_eq!(WorkItemStatus::InProgress.as_str(), "in_progress");
        assert_eq!(WorkItemStatus::Review.as_str(), "review");
        assert_eq!(WorkItemStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_status_serializes_as_string() {
        assert_eq!(
            serde_json::to_string(&WorkItemStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_completed_at_stamped_on_done() {
        let now = Utc::now();
        let resolved = resolve_completed_at(WorkItemStatus::Done, None, now);
        assert_eq!(resolved, Some(now));
    }

    #[test]
    fn test_completed_at_not_restamped_when_already_done() {
        let earlier = Utc::now() - Duration::hours(3);
        let now = Utc::now();

        let resolved = resolve_completed_at(WorkItemStatus::Done, Some(earlier), now);
        assert_eq!(resolved, Some(earlier), "existing timestamp must survive");
    }

    #[test]
    fn test_completed_at_cleared_on_leaving_done() {
        let earlier = Utc::now() - Duration::hours(3);
        let now = Utc::now();

        for status in [
            WorkItemStatus::Todo,
            WorkItemStatus::InProgress,
            WorkItemStatus::Review,
        ] {
            assert_eq!(resolve_completed_at(status, Some(earlier), now), None);
        }
    }

    #[test]
    fn test_completed_at_clear_is_idempotent() {
        let now = Utc::now();
        assert_eq!(resolve_completed_at(WorkItemStatus::Todo, None, now), None);
    }
}
