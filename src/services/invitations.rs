//! Invitation lifecycle: Pending -> {Accepted, Declined, Expired}.
//!
//! Terminal states are immutable. Expiry is enforced at read time: a
//! stored Pending row past its expiry is Expired for every path here, so
//! no background sweep is required for correctness.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    invitations::{Invitation, InvitationResponse, InvitationStatus, NewInvitation},
    requests::{CreateInvitationRequest, RespondInvitationRequest},
    roles::InvitationRole,
    workspaces::{NewWorkspaceMember, WorkspaceMember},
};
use crate::repo::{InvitationRepository, UserRepository, WorkspaceRepository};

/// Result of responding to an invitation. The membership is present only
/// when the response was an accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondInvitationResult {
    pub invitation: Invitation,
    pub workspace_member: Option<WorkspaceMember>,
}

pub struct InvitationService {
    users: Arc<dyn UserRepository>,
    workspaces: Arc<dyn WorkspaceRepository>,
    invitations: Arc<dyn InvitationRepository>,
    validity: Duration,
}

impl InvitationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        workspaces: Arc<dyn WorkspaceRepository>,
        invitations: Arc<dyn InvitationRepository>,
        validity_days: i64,
    ) -> Self {
        Self {
            users,
            workspaces,
            invitations,
            validity: Duration::days(validity_days),
        }
    }

    /// Creates a Pending invitation. Only a workspace Owner/Moderator may
    /// invite; the invitee must exist, must not already be a member, and
    /// must not already hold an actionable Pending invitation.
    pub async fn create_invitation(
        &self,
        request: CreateInvitationRequest,
        inviter_id: Uuid,
    ) -> Result<Invitation> {
        let role = InvitationRole::from_str(&request.role).ok_or_else(|| {
            Error::Validation(format!("invalid invitation role: {}", request.role))
        })?;

        let inviter = self
            .workspaces
            .find_member_by_workspace_and_user(request.workspace_id, inviter_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound("inviter is not a member of this workspace".to_string())
            })?;
        if !inviter.role.can_manage_workspace() {
            return Err(Error::Forbidden(
                "only a workspace owner or moderator can invite members".to_string(),
            ));
        }

        self.workspaces
            .find_by_id(request.workspace_id)
            .await?
            .ok_or_else(|| Error::NotFound("workspace not found".to_string()))?;

        self.users
            .find_by_id(request.invitee_user_id)
            .await?
            .ok_or_else(|| Error::NotFound("invitee user not found".to_string()))?;

        if self
            .workspaces
            .find_member_by_workspace_and_user(request.workspace_id, request.invitee_user_id)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(
                "user is already a member of this workspace".to_string(),
            ));
        }

        let now = Utc::now();
        if self
            .invitations
            .find_pending_by_workspace_and_invitee(
                request.workspace_id,
                request.invitee_user_id,
                now,
            )
            .await?
            .is_some()
        {
            return Err(Error::Conflict(
                "a pending invitation already exists for this user".to_string(),
            ));
        }

        let invitation = self
            .invitations
            .create(NewInvitation {
                workspace_id: request.workspace_id,
                invitee_user_id: request.invitee_user_id,
                role,
                expired_at: now + self.validity,
                custom_message: request.custom_message,
                created_by: inviter_id,
            })
            .await?;

        tracing::info!(
            invitation_id = %invitation.id,
            workspace_id = %invitation.workspace_id,
            invitee = %invitation.invitee_user_id,
            role = %invitation.role,
            "invitation created"
        );
        Ok(invitation)
    }

    /// Accepts or declines an invitation. Only the invitee may respond,
    /// and only while the invitation is still Pending and unexpired.
    ///
    /// Accept is a two-step saga: flip-status-if-pending, then
    /// ensure-membership-exists. If membership creation failed after an
    /// earlier flip, retrying accept on the Accepted invitation re-creates
    /// the membership instead of reporting a conflict.
    pub async fn respond_invitation(
        &self,
        request: RespondInvitationRequest,
        responder_id: Uuid,
    ) -> Result<RespondInvitationResult> {
        let action = InvitationResponse::from_str(&request.action).ok_or_else(|| {
            Error::Validation(format!("invalid invitation action: {}", request.action))
        })?;

        let invitation = self
            .invitations
            .find_by_id(request.invitation_id)
            .await?
            .ok_or_else(|| Error::NotFound("invitation not found".to_string()))?;

        if invitation.invitee_user_id != responder_id {
            return Err(Error::Forbidden(
                "only the invitee can respond to this invitation".to_string(),
            ));
        }

        let now = Utc::now();
        match invitation.effective_status(now) {
            InvitationStatus::Pending => {
                let flipped = self
                    .invitations
                    .update_status_and_responded_at(
                        invitation.id,
                        action.terminal_status(),
                        now,
                    )
                    .await?
                    // lost the race against a concurrent response
                    .ok_or_else(|| {
                        Error::Conflict("invitation has already been responded to".to_string())
                    })?;

                let workspace_member = match action {
                    InvitationResponse::Accept => Some(self.ensure_membership(&flipped).await?),
                    InvitationResponse::Decline => None,
                };

                tracing::info!(
                    invitation_id = %flipped.id,
                    status = %flipped.status,
                    "invitation responded"
                );
                Ok(RespondInvitationResult {
                    invitation: flipped,
                    workspace_member,
                })
            }
            InvitationStatus::Accepted => {
                // retry path: an earlier accept flipped the status but the
                // membership write failed
                if action == InvitationResponse::Accept {
                    let existing = self
                        .workspaces
                        .find_member_by_workspace_and_user(
                            invitation.workspace_id,
                            invitation.invitee_user_id,
                        )
                        .await?;
                    if existing.is_none() {
                        let member = self.ensure_membership(&invitation).await?;
                        tracing::warn!(
                            invitation_id = %invitation.id,
                            "re-created membership for accepted invitation"
                        );
                        return Ok(RespondInvitationResult {
                            invitation,
                            workspace_member: Some(member),
                        });
                    }
                }
                Err(Error::Conflict(
                    "invitation has already been accepted".to_string(),
                ))
            }
            InvitationStatus::Declined => Err(Error::Conflict(
                "invitation has already been declined".to_string(),
            )),
            InvitationStatus::Expired => {
                Err(Error::Conflict("invitation has expired".to_string()))
            }
        }
    }

    /// Invitations addressed to the caller, with read-time expiry applied.
    pub async fn list_invitations_for_invitee(
        &self,
        invitee_user_id: Uuid,
    ) -> Result<Vec<Invitation>> {
        let now = Utc::now();
        let invitations = self.invitations.list_by_invitee(invitee_user_id).await?;
        Ok(invitations
            .into_iter()
            .map(|i| i.with_effective_status(now))
            .collect())
    }

    /// All invitations for a workspace, visible to its Owner/Moderators.
    pub async fn list_invitations_for_workspace(
        &self,
        workspace_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<Invitation>> {
        let requester = self
            .workspaces
            .find_member_by_workspace_and_user(workspace_id, requester_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound("requester is not a member of this workspace".to_string())
            })?;
        if !requester.role.can_manage_workspace() {
            return Err(Error::Forbidden(
                "only a workspace owner or moderator can list invitations".to_string(),
            ));
        }

        let now = Utc::now();
        let invitations = self.invitations.list_by_workspace(workspace_id).await?;
        Ok(invitations
            .into_iter()
            .map(|i| i.with_effective_status(now))
            .collect())
    }

    /// Idempotent second half of the accept saga: creates the workspace
    /// membership with the invited role, copying display metadata from the
    /// user record. A concurrent creation of the same membership resolves
    /// to the existing record.
    async fn ensure_membership(&self, invitation: &Invitation) -> Result<WorkspaceMember> {
        if let Some(existing) = self
            .workspaces
            .find_member_by_workspace_and_user(
                invitation.workspace_id,
                invitation.invitee_user_id,
            )
            .await?
        {
            return Ok(existing);
        }

        let user = self
            .users
            .find_by_id(invitation.invitee_user_id)
            .await?
            .ok_or_else(|| Error::NotFound("invitee user not found".to_string()))?;

        let created = self
            .workspaces
            .create_member(NewWorkspaceMember {
                workspace_id: invitation.workspace_id,
                user_id: invitation.invitee_user_id,
                display_name: user.display_name,
                profile_url: user.profile_url,
                role: invitation.role.as_workspace_role(),
            })
            .await;

        match created {
            Ok(member) => Ok(member),
            // lost a benign race; the membership exists now
            Err(Error::Conflict(_)) => self
                .workspaces
                .find_member_by_workspace_and_user(
                    invitation.workspace_id,
                    invitation.invitee_user_id,
                )
                .await?
                .ok_or_else(|| {
                    Error::Internal("membership vanished after conflicting create".to_string())
                }),
            Err(e) => Err(e),
        }
    }
}
