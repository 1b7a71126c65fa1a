//! Workflow graph tests: default seed, additive extension, dedupe.

mod common;

use common::TestApp;
use uuid::Uuid;
use worktrack::error::Error;
use worktrack::models::projects::Workflow;
use worktrack::models::requests::{AddWorkflowsRequest, WorkflowRequest};

fn workflow_request(status: &str, previous: &[&str]) -> WorkflowRequest {
    WorkflowRequest {
        status: status.to_string(),
        previous_statuses: previous.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_fresh_project_carries_default_seed() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let workspace = app.create_workspace(owner.id, "Acme").await;
    let project_id = app
        .create_project(workspace.id, owner.id, "Website", "WEB")
        .await;

    let workflows = app.projects.list_workflows(project_id).await.unwrap();
    assert_eq!(workflows, Workflow::default_seed());
}

#[tokio::test]
async fn test_add_workflows_extends_graph() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let workspace = app.create_workspace(owner.id, "Acme").await;
    let project_id = app
        .create_project(workspace.id, owner.id, "Website", "WEB")
        .await;

    let response = app
        .projects
        .add_workflows(
            AddWorkflowsRequest {
                project_id,
                workflows: vec![workflow_request("IN_REVIEW", &["IN_PROGRESS"])],
            },
            owner.id,
        )
        .await
        .unwrap();
    assert_eq!(response.message, "Workflow added successfully");

    let workflows = app.projects.list_workflows(project_id).await.unwrap();
    assert_eq!(workflows.len(), 4);
    let review = workflows.iter().find(|w| w.status == "IN_REVIEW").unwrap();
    assert_eq!(review.previous_statuses, vec!["IN_PROGRESS".to_string()]);
}

#[tokio::test]
async fn test_colliding_status_is_a_silent_no_op() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let workspace = app.create_workspace(owner.id, "Acme").await;
    let project_id = app
        .create_project(workspace.id, owner.id, "Website", "WEB")
        .await;

    // TODO collides with the seed; its predecessor list is not rewritten
    let response = app
        .projects
        .add_workflows(
            AddWorkflowsRequest {
                project_id,
                workflows: vec![workflow_request("TODO", &["DONE"])],
            },
            owner.id,
        )
        .await
        .unwrap();
    assert_eq!(response.message, "No new workflow added");

    let workflows = app.projects.list_workflows(project_id).await.unwrap();
    let todo = workflows.iter().find(|w| w.status == "TODO").unwrap();
    assert!(todo.previous_statuses.is_empty());
}

#[tokio::test]
async fn test_mixed_batch_adds_only_new_statuses() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let workspace = app.create_workspace(owner.id, "Acme").await;
    let project_id = app
        .create_project(workspace.id, owner.id, "Website", "WEB")
        .await;

    let response = app
        .projects
        .add_workflows(
            AddWorkflowsRequest {
                project_id,
                workflows: vec![
                    workflow_request("DONE", &[]),
                    workflow_request("BLOCKED", &["IN_PROGRESS"]),
                    workflow_request("BLOCKED", &["TODO"]),
                ],
            },
            owner.id,
        )
        .await
        .unwrap();
    assert_eq!(response.message, "Workflow added successfully");

    let workflows = app.projects.list_workflows(project_id).await.unwrap();
    assert_eq!(workflows.len(), 4);
    // first occurrence in the batch wins
    let blocked = workflows.iter().find(|w| w.status == "BLOCKED").unwrap();
    assert_eq!(blocked.previous_statuses, vec!["IN_PROGRESS".to_string()]);
}

#[tokio::test]
async fn test_unknown_predecessors_are_accepted() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let workspace = app.create_workspace(owner.id, "Acme").await;
    let project_id = app
        .create_project(workspace.id, owner.id, "Website", "WEB")
        .await;

    // predecessor names are not checked against the existing status set
    app.projects
        .add_workflows(
            AddWorkflowsRequest {
                project_id,
                workflows: vec![workflow_request("ARCHIVED", &["NO_SUCH_STATUS"])],
            },
            owner.id,
        )
        .await
        .unwrap();

    let workflows = app.projects.list_workflows(project_id).await.unwrap();
    let archived = workflows.iter().find(|w| w.status == "ARCHIVED").unwrap();
    assert_eq!(
        archived.previous_statuses,
        vec!["NO_SUCH_STATUS".to_string()]
    );
}

#[tokio::test]
async fn test_add_workflows_authorization() {
    let app = TestApp::new();
    let owner = app.seed_user("Alice");
    let member = app.seed_user("Bob");
    let workspace = app.create_workspace(owner.id, "Acme").await;
    app.join_workspace(workspace.id, owner.id, member.id, "MEMBER")
        .await;
    let project_id = app
        .create_project(workspace.id, owner.id, "Website", "WEB")
        .await;

    let request = AddWorkflowsRequest {
        project_id,
        workflows: vec![workflow_request("IN_REVIEW", &[])],
    };

    // workspace member outside the project
    let err = app
        .projects
        .add_workflows(request.clone(), member.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    // unknown project
    let err = app
        .projects
        .add_workflows(
            AddWorkflowsRequest {
                project_id: Uuid::now_v7(),
                workflows: vec![workflow_request("IN_REVIEW", &[])],
            },
            owner.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
