//! Postgres repository adapter.
//!
//! Row structs decode the raw columns; conversion into domain models
//! rejects role/status literals outside the closed enumerations as
//! internal corruption. Unique-index violations surface as `Conflict`,
//! which is the race-safety backstop behind the service layer's
//! read-check-then-write flow.

mod invitations;
mod projects;
mod users;
mod workspaces;

use crate::database::DbPool;
use crate::error::{Error, Result};

/// Sqlx-backed implementation of all repository ports.
#[derive(Clone)]
pub struct PgRepository {
    pool: DbPool,
}

impl PgRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Maps a unique-violation into `Conflict`; anything else stays a store
/// failure.
pub(crate) fn map_insert_error(err: sqlx::Error, conflict_message: &str) -> Error {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return Error::Conflict(conflict_message.to_string());
        }
    }
    Error::Sqlx(err)
}

/// A stored enum literal outside its closed enumeration is data corruption,
/// reported as an internal error rather than leaked to the caller.
pub(crate) fn corrupt_literal(column: &str, value: &str) -> Error {
    Error::Internal(format!("invalid {} value in store: {}", column, value))
}

pub(crate) fn parse_workspace_role(value: &str) -> Result<crate::models::roles::WorkspaceRole> {
    crate::models::roles::WorkspaceRole::from_str(value)
        .ok_or_else(|| corrupt_literal("workspace role", value))
}

pub(crate) fn parse_project_role(value: &str) -> Result<crate::models::roles::ProjectRole> {
    crate::models::roles::ProjectRole::from_str(value)
        .ok_or_else(|| corrupt_literal("project role", value))
}

pub(crate) fn parse_invitation_role(value: &str) -> Result<crate::models::roles::InvitationRole> {
    crate::models::roles::InvitationRole::from_str(value)
        .ok_or_else(|| corrupt_literal("invitation role", value))
}

pub(crate) fn parse_invitation_status(
    value: &str,
) -> Result<crate::models::invitations::InvitationStatus> {
    crate::models::invitations::InvitationStatus::from_str(value)
        .ok_or_else(|| corrupt_literal("invitation status", value))
}

pub(crate) fn parse_project_status(value: &str) -> Result<crate::models::projects::ProjectStatus> {
    crate::models::projects::ProjectStatus::from_str(value)
        .ok_or_else(|| corrupt_literal("project status", value))
}
