/// Database models for Teamboard
///
/// This module contains all database models and their SQL operations.
/// Every entity carries an `is_active` soft-delete flag; "delete" operations
/// flip the flag and normal queries filter on it.
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `team`: Teams, the unit of multi-tenant isolation
/// - `membership`: Team × User join rows with per-team roles
/// - `project`: Projects owned by a team
/// - `work_item`: Tasks within a project (the kanban board rows)
/// - `attachment`: File metadata attached to a work item

pub mod attachment;
pub mod membership;
pub mod project;
pub mod team;
pub mod user;
pub mod work_item;
