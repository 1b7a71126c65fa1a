pub mod invitations;
pub mod pagination;
pub mod projects;
pub mod requests;
pub mod roles;
pub mod users;
pub mod workspaces;
