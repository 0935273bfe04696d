/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login)
/// - `teams`: Team lifecycle and membership management
/// - `projects`: Project lifecycle
/// - `work_items`: Work item lifecycle (the kanban board)
/// - `attachments`: File metadata attached to work items

use serde::Serialize;

pub mod attachments;
pub mod auth;
pub mod health;
pub mod projects;
pub mod teams;
pub mod work_items;

/// Plain confirmation body for mutations that return no entity
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
