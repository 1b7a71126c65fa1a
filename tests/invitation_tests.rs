//! Invitation lifecycle tests over the in-memory store.

mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use worktrack::error::Error;
use worktrack::models::invitations::{InvitationStatus, NewInvitation};
use worktrack::models::requests::{CreateInvitationRequest, RespondInvitationRequest};
use worktrack::models::roles::{InvitationRole, WorkspaceRole};
use worktrack::repo::InvitationRepository;

fn invite_request(workspace_id: uuid::Uuid, invitee: uuid::Uuid, role: &str) -> CreateInvitationRequest {
    CreateInvitationRequest {
        workspace_id,
        invitee_user_id: invitee,
        role: role.to_string(),
        custom_message: None,
    }
}

fn respond_request(invitation_id: uuid::Uuid, action: &str) -> RespondInvitationRequest {
    RespondInvitationRequest {
        invitation_id,
        action: action.to_string(),
    }
}

#[tokio::test]
async fn test_accept_creates_exactly_one_membership_with_invited_role() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    let invitation = app
        .invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MODERATOR"), owner.id)
        .await
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert!(invitation.responded_at.is_none());

    let result = app
        .invitations
        .respond_invitation(respond_request(invitation.id, "ACCEPT"), invitee.id)
        .await
        .unwrap();

    assert_eq!(result.invitation.status, InvitationStatus::Accepted);
    assert!(result.invitation.responded_at.is_some());
    let member = result.workspace_member.unwrap();
    assert_eq!(member.workspace_id, workspace.id);
    assert_eq!(member.user_id, invitee.id);
    assert_eq!(member.role, WorkspaceRole::Moderator);
    assert_eq!(member.display_name, "Bob");
}

#[tokio::test]
async fn test_decline_creates_no_membership() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    let invitation = app
        .invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MEMBER"), owner.id)
        .await
        .unwrap();

    let result = app
        .invitations
        .respond_invitation(respond_request(invitation.id, "DECLINE"), invitee.id)
        .await
        .unwrap();

    assert_eq!(result.invitation.status, InvitationStatus::Declined);
    assert!(result.workspace_member.is_none());
    assert!(
        app.projects
            .list_my_projects(workspace.id, invitee.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_responding_to_terminal_invitation_is_conflict() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    let invitation = app
        .invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MEMBER"), owner.id)
        .await
        .unwrap();
    app.invitations
        .respond_invitation(respond_request(invitation.id, "DECLINE"), invitee.id)
        .await
        .unwrap();

    for action in ["ACCEPT", "DECLINE"] {
        let err = app
            .invitations
            .respond_invitation(respond_request(invitation.id, action), invitee.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)), "got {err:?}");
    }
}

#[tokio::test]
async fn test_only_invitee_can_respond() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let outsider = app.seed_user("Mallory");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    let invitation = app
        .invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MEMBER"), owner.id)
        .await
        .unwrap();

    let err = app
        .invitations
        .respond_invitation(respond_request(invitation.id, "ACCEPT"), outsider.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn test_plain_member_cannot_invite() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let member = app.seed_user("Bob");
    let invitee = app.seed_user("Carol");
    let workspace = app.create_workspace(owner.id, "Acme").await;
    app.join_workspace(workspace.id, owner.id, member.id, "MEMBER")
        .await;

    let err = app
        .invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MEMBER"), member.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let outsider = app.seed_user("Dave");
    let err = app
        .invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MEMBER"), outsider.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_owner_role_is_not_grantable() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    for role in ["OWNER", "owner", "ADMIN", ""] {
        let err = app
            .invitations
            .create_invitation(invite_request(workspace.id, invitee.id, role), owner.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "role {role:?}");
    }
}

#[tokio::test]
async fn test_inviting_existing_member_or_duplicate_pending_is_conflict() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    app.invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MEMBER"), owner.id)
        .await
        .unwrap();

    // second pending invitation for the same invitee
    let err = app
        .invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MODERATOR"), owner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // inviting the owner themselves
    let err = app
        .invitations
        .create_invitation(invite_request(workspace.id, owner.id, "MEMBER"), owner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_expired_invitation_reads_as_expired_and_rejects_responses() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    // stored as Pending but already past its expiry
    let stale = app
        .store
        .create(NewInvitation {
            workspace_id: workspace.id,
            invitee_user_id: invitee.id,
            role: InvitationRole::Member,
            expired_at: Utc::now() - Duration::hours(1),
            custom_message: None,
            created_by: owner.id,
        })
        .await
        .unwrap();
    assert_eq!(stale.status, InvitationStatus::Pending);

    let err = app
        .invitations
        .respond_invitation(respond_request(stale.id, "ACCEPT"), invitee.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let listed = app
        .invitations
        .list_invitations_for_invitee(invitee.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, InvitationStatus::Expired);

    // a stale pending row does not block a fresh invitation, and the
    // create retires it in the store instead of leaving it PENDING
    let fresh = app
        .invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MEMBER"), owner.id)
        .await
        .unwrap();
    assert_eq!(fresh.status, InvitationStatus::Pending);

    let retired = app.store.find_by_id(stale.id).await.unwrap().unwrap();
    assert_eq!(retired.status, InvitationStatus::Expired);
}

#[tokio::test]
async fn test_store_rejects_second_actionable_pending_invitation() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    let new_invitation = NewInvitation {
        workspace_id: workspace.id,
        invitee_user_id: invitee.id,
        role: InvitationRole::Member,
        expired_at: Utc::now() + Duration::days(7),
        custom_message: None,
        created_by: owner.id,
    };

    // straight through the repository, bypassing the service's read check:
    // the store itself must hold the at-most-one-pending line
    app.store.create(new_invitation.clone()).await.unwrap();
    let err = app.store.create(new_invitation).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_accept_retry_recreates_missing_membership() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    // simulate a saga that flipped the status but never wrote the membership
    let invitation = app
        .store
        .create(NewInvitation {
            workspace_id: workspace.id,
            invitee_user_id: invitee.id,
            role: InvitationRole::Member,
            expired_at: Utc::now() + Duration::days(7),
            custom_message: None,
            created_by: owner.id,
        })
        .await
        .unwrap();
    app.store
        .update_status_and_responded_at(invitation.id, InvitationStatus::Accepted, Utc::now())
        .await
        .unwrap()
        .unwrap();

    let result = app
        .invitations
        .respond_invitation(respond_request(invitation.id, "ACCEPT"), invitee.id)
        .await
        .unwrap();
    let member = result.workspace_member.unwrap();
    assert_eq!(member.role, WorkspaceRole::Member);

    // once the membership exists, a further accept is a plain conflict
    let err = app
        .invitations
        .respond_invitation(respond_request(invitation.id, "ACCEPT"), invitee.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_workspace_invitation_listing_requires_manager_role() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let member = app.seed_user("Bob");
    let invitee = app.seed_user("Carol");
    let workspace = app.create_workspace(owner.id, "Acme").await;
    app.join_workspace(workspace.id, owner.id, member.id, "MEMBER")
        .await;

    app.invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MEMBER"), owner.id)
        .await
        .unwrap();

    let listed = app
        .invitations
        .list_invitations_for_workspace(workspace.id, owner.id)
        .await
        .unwrap();
    // the accepted invitation from join_workspace plus the fresh one
    assert_eq!(listed.len(), 2);

    let err = app
        .invitations
        .list_invitations_for_workspace(workspace.id, member.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn test_invalid_action_literal_is_validation_error() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let invitee = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;

    let invitation = app
        .invitations
        .create_invitation(invite_request(workspace.id, invitee.id, "MEMBER"), owner.id)
        .await
        .unwrap();

    for action in ["accept", "REJECT", ""] {
        let err = app
            .invitations
            .respond_invitation(respond_request(invitation.id, action), invitee.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "action {action:?}");
    }
}
