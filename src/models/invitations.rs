use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::roles::InvitationRole;

/// Invitation status constants
pub const INVITATION_STATUS_PENDING: &str = "PENDING";
pub const INVITATION_STATUS_ACCEPTED: &str = "ACCEPTED";
pub const INVITATION_STATUS_DECLINED: &str = "DECLINED";
pub const INVITATION_STATUS_EXPIRED: &str = "EXPIRED";

/// All valid invitation statuses
pub const VALID_INVITATION_STATUSES: &[&str] = &[
    INVITATION_STATUS_PENDING,
    INVITATION_STATUS_ACCEPTED,
    INVITATION_STATUS_DECLINED,
    INVITATION_STATUS_EXPIRED,
];

/// Invitation status enum.
///
/// `Pending` is the sole non-terminal state; a pending invitation moves to
/// exactly one of the three terminal states and no state is re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => INVITATION_STATUS_PENDING,
            InvitationStatus::Accepted => INVITATION_STATUS_ACCEPTED,
            InvitationStatus::Declined => INVITATION_STATUS_DECLINED,
            InvitationStatus::Expired => INVITATION_STATUS_EXPIRED,
        }
    }

    pub fn from_str(status: &str) -> Option<Self> {
        match status {
            INVITATION_STATUS_PENDING => Some(InvitationStatus::Pending),
            INVITATION_STATUS_ACCEPTED => Some(InvitationStatus::Accepted),
            INVITATION_STATUS_DECLINED => Some(InvitationStatus::Declined),
            INVITATION_STATUS_EXPIRED => Some(InvitationStatus::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A pending offer of workspace membership, with an expiry and a terminal
/// outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub invitee_user_id: Uuid,
    pub role: InvitationRole,
    pub status: InvitationStatus,
    pub expired_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub custom_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl Invitation {
    /// Status as observed by read paths: a stored Pending past its expiry
    /// is Expired, whether or not any sweep has rewritten the row.
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.status == InvitationStatus::Pending && self.expired_at <= now {
            InvitationStatus::Expired
        } else {
            self.status
        }
    }

    /// Whether the invitee can still accept or decline.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == InvitationStatus::Pending
    }

    /// Copy of this invitation with the read-time expiry applied, for
    /// list responses.
    pub fn with_effective_status(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.effective_status(now);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvitation {
    pub workspace_id: Uuid,
    pub invitee_user_id: Uuid,
    pub role: InvitationRole,
    pub expired_at: DateTime<Utc>,
    pub custom_message: Option<String>,
    pub created_by: Uuid,
}

/// The two possible responses an invitee can give.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationResponse {
    Accept,
    Decline,
}

impl InvitationResponse {
    pub fn from_str(action: &str) -> Option<Self> {
        match action {
            "ACCEPT" => Some(InvitationResponse::Accept),
            "DECLINE" => Some(InvitationResponse::Decline),
            _ => None,
        }
    }

    pub fn terminal_status(&self) -> InvitationStatus {
        match self {
            InvitationResponse::Accept => InvitationStatus::Accepted,
            InvitationResponse::Decline => InvitationStatus::Declined,
        }
    }
}
