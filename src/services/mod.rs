pub mod invitations;
pub mod projects;
pub mod workspaces;
