use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::invitations::{
    Invitation, InvitationStatus, NewInvitation, INVITATION_STATUS_EXPIRED,
    INVITATION_STATUS_PENDING,
};
use crate::repo::InvitationRepository;

use super::{map_insert_error, parse_invitation_role, parse_invitation_status, PgRepository};

#[derive(sqlx::FromRow)]
struct InvitationRow {
    id: Uuid,
    workspace_id: Uuid,
    invitee_user_id: Uuid,
    role: String,
    status: String,
    expired_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
    custom_message: Option<String>,
    created_at: DateTime<Utc>,
    created_by: Uuid,
}

impl InvitationRow {
    fn into_invitation(self) -> Result<Invitation> {
        Ok(Invitation {
            id: self.id,
            workspace_id: self.workspace_id,
            invitee_user_id: self.invitee_user_id,
            role: parse_invitation_role(&self.role)?,
            status: parse_invitation_status(&self.status)?,
            expired_at: self.expired_at,
            responded_at: self.responded_at,
            custom_message: self.custom_message,
            created_at: self.created_at,
            created_by: self.created_by,
        })
    }
}

const INVITATION_COLUMNS: &str = "id, workspace_id, invitee_user_id, role, status, expired_at, \
                                  responded_at, custom_message, created_at, created_by";

#[async_trait]
impl InvitationRepository for PgRepository {
    async fn create(&self, new_invitation: NewInvitation) -> Result<Invitation> {
        let mut tx = self.pool().begin().await?;

        // Retire any stale Pending row for this invitee first. Expiry is
        // otherwise applied at read time only, and the partial unique
        // index would still see the stale row as PENDING and reject a
        // legitimate re-invite.
        let expire_sql = format!(
            "UPDATE invitations SET status = '{}' \
             WHERE workspace_id = $1 AND invitee_user_id = $2 \
               AND status = '{}' AND expired_at <= NOW()",
            INVITATION_STATUS_EXPIRED, INVITATION_STATUS_PENDING
        );
        sqlx::query(&expire_sql)
            .bind(new_invitation.workspace_id)
            .bind(new_invitation.invitee_user_id)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO invitations \
             (id, workspace_id, invitee_user_id, role, status, expired_at, custom_message, created_by) \
             VALUES ($1, $2, $3, $4, '{}', $5, $6, $7) \
             RETURNING {}",
            INVITATION_STATUS_PENDING, INVITATION_COLUMNS
        );
        let row = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(Uuid::now_v7())
            .bind(new_invitation.workspace_id)
            .bind(new_invitation.invitee_user_id)
            .bind(new_invitation.role.as_str())
            .bind(new_invitation.expired_at)
            .bind(new_invitation.custom_message)
            .bind(new_invitation.created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_insert_error(e, "a pending invitation already exists for this user")
            })?;

        tx.commit().await?;
        row.into_invitation()
    }

    async fn find_by_id(&self, invitation_id: Uuid) -> Result<Option<Invitation>> {
        let sql = format!(
            "SELECT {} FROM invitations WHERE id = $1",
            INVITATION_COLUMNS
        );
        let row = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(invitation_id)
            .fetch_optional(self.pool())
            .await?;

        row.map(InvitationRow::into_invitation).transpose()
    }

    async fn find_pending_by_workspace_and_invitee(
        &self,
        workspace_id: Uuid,
        invitee_user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>> {
        let sql = format!(
            "SELECT {} FROM invitations \
             WHERE workspace_id = $1 AND invitee_user_id = $2 \
               AND status = '{}' AND expired_at > $3",
            INVITATION_COLUMNS, INVITATION_STATUS_PENDING
        );
        let row = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(workspace_id)
            .bind(invitee_user_id)
            .bind(now)
            .fetch_optional(self.pool())
            .await?;

        row.map(InvitationRow::into_invitation).transpose()
    }

    async fn list_by_invitee(&self, invitee_user_id: Uuid) -> Result<Vec<Invitation>> {
        let sql = format!(
            "SELECT {} FROM invitations WHERE invitee_user_id = $1 ORDER BY created_at DESC",
            INVITATION_COLUMNS
        );
        sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(invitee_user_id)
            .fetch_all(self.pool())
            .await?
            .into_iter()
            .map(InvitationRow::into_invitation)
            .collect()
    }

    async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Invitation>> {
        let sql = format!(
            "SELECT {} FROM invitations WHERE workspace_id = $1 ORDER BY created_at DESC",
            INVITATION_COLUMNS
        );
        sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(workspace_id)
            .fetch_all(self.pool())
            .await?
            .into_iter()
            .map(InvitationRow::into_invitation)
            .collect()
    }

    async fn update_status_and_responded_at(
        &self,
        invitation_id: Uuid,
        status: InvitationStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<Invitation>> {
        // guarded flip: the WHERE clause only matches a Pending row, so a
        // lost race comes back as None instead of clobbering a terminal state
        let sql = format!(
            "UPDATE invitations \
             SET status = $1, responded_at = $2 \
             WHERE id = $3 AND status = '{}' \
             RETURNING {}",
            INVITATION_STATUS_PENDING, INVITATION_COLUMNS
        );
        let row = sqlx::query_as::<_, InvitationRow>(&sql)
            .bind(status.as_str())
            .bind(responded_at)
            .bind(invitation_id)
            .fetch_optional(self.pool())
            .await?;

        row.map(InvitationRow::into_invitation).transpose()
    }
}
