use serde::{Deserialize, Serialize};

/// Workspace role constants
pub const WORKSPACE_ROLE_OWNER: &str = "OWNER";
pub const WORKSPACE_ROLE_MODERATOR: &str = "MODERATOR";
pub const WORKSPACE_ROLE_MEMBER: &str = "MEMBER";

/// Role of a user within a workspace.
///
/// Independent from [`ProjectRole`]: a workspace Moderator is not
/// automatically a project Moderator. The two enumerations share literal
/// shape but are deliberately distinct types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkspaceRole {
    Owner,
    Moderator,
    Member,
}

impl WorkspaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceRole::Owner => WORKSPACE_ROLE_OWNER,
            WorkspaceRole::Moderator => WORKSPACE_ROLE_MODERATOR,
            WorkspaceRole::Member => WORKSPACE_ROLE_MEMBER,
        }
    }

    pub fn from_str(role: &str) -> Option<Self> {
        match role {
            WORKSPACE_ROLE_OWNER => Some(WorkspaceRole::Owner),
            WORKSPACE_ROLE_MODERATOR => Some(WorkspaceRole::Moderator),
            WORKSPACE_ROLE_MEMBER => Some(WorkspaceRole::Member),
            _ => None,
        }
    }

    /// Whether this role may mutate workspace-level state: create projects,
    /// invite members, list all invitations.
    pub fn can_manage_workspace(&self) -> bool {
        matches!(self, WorkspaceRole::Owner | WorkspaceRole::Moderator)
    }
}

impl std::fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role of a user within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectRole {
    Owner,
    Moderator,
    Member,
}

impl ProjectRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Owner => "OWNER",
            ProjectRole::Moderator => "MODERATOR",
            ProjectRole::Member => "MEMBER",
        }
    }

    pub fn from_str(role: &str) -> Option<Self> {
        match role {
            "OWNER" => Some(ProjectRole::Owner),
            "MODERATOR" => Some(ProjectRole::Moderator),
            "MEMBER" => Some(ProjectRole::Member),
            _ => None,
        }
    }

    /// Whether this role may mutate project-level state: positions,
    /// members, workflow statuses.
    pub fn can_manage_project(&self) -> bool {
        matches!(self, ProjectRole::Owner | ProjectRole::Moderator)
    }
}

impl std::fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role granted by an invitation. Owner is never grantable through an
/// invitation; the only path that mints an Owner is workspace setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationRole {
    Moderator,
    Member,
}

impl InvitationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationRole::Moderator => "MODERATOR",
            InvitationRole::Member => "MEMBER",
        }
    }

    pub fn from_str(role: &str) -> Option<Self> {
        match role {
            "MODERATOR" => Some(InvitationRole::Moderator),
            "MEMBER" => Some(InvitationRole::Member),
            _ => None,
        }
    }

    /// The workspace role materialized when the invitation is accepted.
    pub fn as_workspace_role(&self) -> WorkspaceRole {
        match self {
            InvitationRole::Moderator => WorkspaceRole::Moderator,
            InvitationRole::Member => WorkspaceRole::Member,
        }
    }
}

impl std::fmt::Display for InvitationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_role_round_trip() {
        assert_eq!(WorkspaceRole::from_str("OWNER"), Some(WorkspaceRole::Owner));
        assert_eq!(
            WorkspaceRole::from_str("MODERATOR"),
            Some(WorkspaceRole::Moderator)
        );
        assert_eq!(
            WorkspaceRole::from_str("MEMBER"),
            Some(WorkspaceRole::Member)
        );
        assert_eq!(WorkspaceRole::from_str("owner"), None);
        assert_eq!(WorkspaceRole::from_str("ADMIN"), None);
    }

    #[test]
    fn test_workspace_management_predicate() {
        assert!(WorkspaceRole::Owner.can_manage_workspace());
        assert!(WorkspaceRole::Moderator.can_manage_workspace());
        assert!(!WorkspaceRole::Member.can_manage_workspace());
    }

    #[test]
    fn test_project_management_predicate() {
        assert!(ProjectRole::Owner.can_manage_project());
        assert!(ProjectRole::Moderator.can_manage_project());
        assert!(!ProjectRole::Member.can_manage_project());
    }

    #[test]
    fn test_invitation_role_never_owner() {
        assert_eq!(InvitationRole::from_str("OWNER"), None);
        assert_eq!(
            InvitationRole::from_str("MODERATOR"),
            Some(InvitationRole::Moderator)
        );
        assert_eq!(
            InvitationRole::Member.as_workspace_role(),
            WorkspaceRole::Member
        );
        assert_eq!(
            InvitationRole::Moderator.as_workspace_role(),
            WorkspaceRole::Moderator
        );
    }
}
