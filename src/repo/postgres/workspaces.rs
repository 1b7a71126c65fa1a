use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::workspaces::{NewWorkspace, NewWorkspaceMember, Workspace, WorkspaceMember};
use crate::repo::WorkspaceRepository;

use super::{map_insert_error, parse_workspace_role, PgRepository};

#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    created_by: Uuid,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Workspace {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            created_by: row.created_by,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WorkspaceMemberRow {
    workspace_id: Uuid,
    user_id: Uuid,
    display_name: String,
    profile_url: Option<String>,
    role: String,
    joined_at: DateTime<Utc>,
}

impl WorkspaceMemberRow {
    fn into_member(self) -> Result<WorkspaceMember> {
        Ok(WorkspaceMember {
            workspace_id: self.workspace_id,
            user_id: self.user_id,
            display_name: self.display_name,
            profile_url: self.profile_url,
            role: parse_workspace_role(&self.role)?,
            joined_at: self.joined_at,
        })
    }
}

#[async_trait]
impl WorkspaceRepository for PgRepository {
    async fn create(&self, new_workspace: NewWorkspace) -> Result<Workspace> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            INSERT INTO workspaces (id, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at, created_by
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(new_workspace.name)
        .bind(new_workspace.created_by)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, workspace_id: Uuid) -> Result<Option<Workspace>> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            SELECT id, name, created_at, created_by
            FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(workspace_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Workspace::from))
    }

    async fn find_member_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>> {
        let row = sqlx::query_as::<_, WorkspaceMemberRow>(
            r#"
            SELECT workspace_id, user_id, display_name, profile_url, role, joined_at
            FROM workspace_members
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        row.map(WorkspaceMemberRow::into_member).transpose()
    }

    async fn create_member(&self, new_member: NewWorkspaceMember) -> Result<WorkspaceMember> {
        let row = sqlx::query_as::<_, WorkspaceMemberRow>(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, display_name, profile_url, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING workspace_id, user_id, display_name, profile_url, role, joined_at
            "#,
        )
        .bind(new_member.workspace_id)
        .bind(new_member.user_id)
        .bind(new_member.display_name)
        .bind(new_member.profile_url)
        .bind(new_member.role.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_insert_error(e, "user is already a member of this workspace"))?;

        row.into_member()
    }
}
