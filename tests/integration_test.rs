//! Handler scenarios for the clients/projects API.
//!
//! Each test drives the handlers end to end against the in-memory store:
//! credential → gate → store → paginator → projector → envelope.

use client_projects::store::{ClientInput, ProjectInput};
use client_projects::web::{Api, RequestAdapter, Response};
use client_projects::{Client, Project, ProjectStatus, Secret, Settings};
use serde_json::{json, Value};

const FULL: &str = "full-token";
const NONE: &str = "none-token";
const READ: &str = "read-token";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn api() -> Api {
    init_tracing();
    Api::new(&Settings {
        full_permission_token: Some(Secret::new(FULL.to_string())),
        no_permission_token: Some(Secret::new(NONE.to_string())),
        read_only_permission_token: Some(Secret::new(READ.to_string())),
        ..Settings::default()
    })
}

fn request(token: &str) -> RequestAdapter {
    let mut adapter = RequestAdapter::new("req-it".to_string());
    adapter.add_query_param("token".to_string(), token.to_string());
    adapter
}

fn client(api: &Api, name: &str) -> Client {
    api.store().create_client(ClientInput::named(name)).unwrap()
}

fn project(api: &Api, client: &Client, name: &str, status: ProjectStatus) -> Project {
    api.store()
        .create_project(client, ProjectInput::new(name, status.id()))
        .unwrap()
}

fn names(response: &Response, root: &str) -> Vec<String> {
    response.body[root]
        .as_array()
        .expect("root array")
        .iter()
        .map(|p| p["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn with_path(mut adapter: RequestAdapter, params: &[(&str, &str)]) -> RequestAdapter {
    for (k, v) in params {
        adapter.add_path_param(k.to_string(), v.to_string());
    }
    adapter
}

// ============================================================================
// GET /projects
// ============================================================================

#[test]
fn projects_index_returns_all_projects_regardless_of_client() {
    let api = api();
    let acme = client(&api, "Some Existing Client");
    let other = client(&api, "Whatever");
    project(&api, &acme, "Project 1", ProjectStatus::New);
    project(&api, &other, "Project 2", ProjectStatus::New);

    let response = api.projects_index(&request(FULL));

    assert_eq!(response.status, 200);
    assert_eq!(names(&response, "projects"), vec!["Project 1", "Project 2"]);
    assert_eq!(response.body["page"], "1");
    assert_eq!(response.body["per_page"], "100");
}

#[test]
fn projects_index_second_page_of_two() {
    let api = api();
    let acme = client(&api, "ACME");
    for (name, status) in [
        ("Project 1", ProjectStatus::Done),
        ("Project 2", ProjectStatus::Done),
        ("Project 3", ProjectStatus::Done),
        ("Project 4", ProjectStatus::New),
    ] {
        project(&api, &acme, name, status);
    }

    let mut req = request(FULL);
    req.add_query_param("page".to_string(), "2".to_string());
    req.add_query_param("per_page".to_string(), "2".to_string());
    let response = api.projects_index(&req);

    assert_eq!(response.status, 200);
    assert_eq!(names(&response, "projects"), vec!["Project 3", "Project 4"]);
    assert_eq!(response.body["page"], "2");
    assert_eq!(response.body["per_page"], "2");
}

#[test]
fn projects_index_clamps_per_page() {
    let api = api();
    let mut req = request(FULL);
    req.add_query_param("per_page".to_string(), "5000".to_string());

    let response = api.projects_index(&req);
    assert_eq!(response.body["per_page"], "1000");
}

#[test]
fn projects_index_denied_for_no_access_principal() {
    let api = api();
    let acme = client(&api, "ACME");
    project(&api, &acme, "Project 1", ProjectStatus::New);
    let fetches_before = api.store().slice_fetches();

    let response = api.projects_index(&request(NONE));

    assert_eq!(response.status, 403);
    assert_eq!(response.body, json!({ "error": "403 Forbidden" }));
    assert_eq!(api.store().slice_fetches(), fetches_before);
}

#[test]
fn projects_index_requires_known_token() {
    let api = api();

    let response = api.projects_index(&request("bogus"));
    assert_eq!(response.status, 401);
    assert_eq!(response.body["error"], "401 Unauthorized");

    let response = api.projects_index(&RequestAdapter::new("req-anon".to_string()));
    assert_eq!(response.status, 401);
}

#[test]
fn list_view_exposes_client_only_to_admin() {
    let api = api();
    let acme = client(&api, "ACME");
    project(&api, &acme, "Project 1", ProjectStatus::Delayed);

    let admin = api.projects_index(&request(FULL));
    assert_eq!(admin.body["projects"][0]["client"]["name"], "ACME");
    assert_eq!(admin.body["projects"][0]["project_status"], "Delayed");

    let reader = api.projects_index(&request(READ));
    assert_eq!(reader.status, 200);
    assert!(reader.body["projects"][0].get("client").is_none());
}

#[test]
fn project_view_field_order() {
    let api = api();
    let acme = client(&api, "ACME");
    project(&api, &acme, "Project 1", ProjectStatus::New);

    let response = api.projects_index(&request(FULL));
    let keys: Vec<&str> = response.body["projects"][0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();

    assert_eq!(
        keys,
        vec![
            "name",
            "id",
            "project_status_id",
            "project_status",
            "client",
            "created_at",
            "updated_at"
        ]
    );
    let created = response.body["projects"][0]["created_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
    assert!(created.ends_with('Z'));
}

// ============================================================================
// POST /projects
// ============================================================================

#[test]
fn create_project_with_new_client() {
    let api = api();
    let mut req = request(FULL);
    req.set_json_body(&json!({
        "name": "My new project",
        "project_status_id": ProjectStatus::New.id(),
        "client": { "name": "ACME" }
    }));

    let response = api.create_project_with_client(&req);

    assert_eq!(response.status, 201);
    assert_eq!(names(&response, "projects"), vec!["My new project"]);
    assert_eq!(response.body["projects"][0]["client"]["name"], "ACME");
    assert!(response.body.get("page").is_none());

    let clients = api.clients_index(&request(FULL));
    assert_eq!(names(&clients, "clients"), vec!["ACME"]);
}

#[test]
fn create_project_with_taken_client_name() {
    let api = api();
    client(&api, "ACME");

    let mut req = request(FULL);
    req.set_json_body(&json!({
        "name": "My new project",
        "project_status_id": 1,
        "client": { "name": "ACME" }
    }));
    let response = api.create_project_with_client(&req);

    assert_eq!(response.status, 422);
    assert_eq!(response.body["error"], "client: Name has already been taken");
}

#[test]
fn create_project_with_client_needs_both_create_permissions() {
    let api = api();
    let mut req = request(READ);
    req.set_json_body(&json!({ "name": "P", "project_status_id": 1, "client": { "name": "C" } }));

    let response = api.create_project_with_client(&req);
    assert_eq!(response.status, 403);
    assert_eq!(names(&api.clients_index(&request(FULL)), "clients"), Vec::<String>::new());
}

// ============================================================================
// GET /clients and /clients/:client_id/projects
// ============================================================================

#[test]
fn clients_index_is_paginated() {
    let api = api();
    for name in ["A", "B", "C"] {
        client(&api, name);
    }

    let mut req = request(READ);
    req.add_query_param("per_page".to_string(), "2".to_string());
    let response = api.clients_index(&req);

    assert_eq!(response.status, 200);
    assert_eq!(names(&response, "clients"), vec!["A", "B"]);
    assert_eq!(response.body["per_page"], "2");
}

#[test]
fn client_projects_index_filters_by_client() {
    let api = api();
    let acme = client(&api, "ACME");
    let other = client(&api, "No match client");
    project(&api, &acme, "Project 1", ProjectStatus::New);
    project(&api, &other, "No match", ProjectStatus::New);

    let id = acme.id.to_string();
    let response = api.client_projects_index(&with_path(request(FULL), &[("client_id", &id)]));

    assert_eq!(response.status, 200);
    assert_eq!(names(&response, "projects"), vec!["Project 1"]);
}

#[test]
fn client_projects_index_is_paginated() {
    let api = api();
    let acme = client(&api, "ACME");
    for name in ["Project 1", "Project 2", "Project 3", "Project 4"] {
        project(&api, &acme, name, ProjectStatus::Done);
    }

    let id = acme.id.to_string();
    let mut req = with_path(request(FULL), &[("client_id", &id)]);
    req.add_query_param("page".to_string(), "2".to_string());
    req.add_query_param("per_page".to_string(), "2".to_string());
    let response = api.client_projects_index(&req);

    assert_eq!(names(&response, "projects"), vec!["Project 3", "Project 4"]);
    assert_eq!(response.body["page"], "2");
    assert_eq!(response.body["per_page"], "2");
}

#[test]
fn client_projects_index_unknown_client() {
    let api = api();
    let response =
        api.client_projects_index(&with_path(request(FULL), &[("client_id", "not_there")]));

    assert_eq!(response.status, 404);
    assert_eq!(response.body["error"], "Couldn't find Client with 'id'=not_there");
}

// ============================================================================
// /clients/:client_id/projects/:id
// ============================================================================

#[test]
fn show_returns_single_project_wrapped_in_array() {
    let api = api();
    let acme = client(&api, "ACME");
    let p1 = project(&api, &acme, "Project 1", ProjectStatus::New);
    project(&api, &acme, "Project 2", ProjectStatus::New);

    let (cid, pid) = (acme.id.to_string(), p1.id.to_string());
    let response = api.client_project_show(&with_path(
        request(FULL),
        &[("client_id", &cid), ("id", &pid)],
    ));

    assert_eq!(response.status, 200);
    assert_eq!(names(&response, "projects"), vec!["Project 1"]);
}

#[test]
fn read_only_show_always_exposes_client() {
    let api = api();
    let acme = client(&api, "ACME");
    let p1 = project(&api, &acme, "Project 1", ProjectStatus::InProgress);

    let (cid, pid) = (acme.id.to_string(), p1.id.to_string());
    let response = api.client_project_show(&with_path(
        request(READ),
        &[("client_id", &cid), ("id", &pid)],
    ));

    assert_eq!(response.status, 200);
    let shown = &response.body["projects"][0];
    assert_eq!(shown["client"]["id"], json!(acme.id));
    assert_eq!(shown["project_status"], "In Progress");
}

#[test]
fn show_project_of_other_client_is_not_found() {
    let api = api();
    let acme = client(&api, "ACME");
    let other = client(&api, "Other");
    let p1 = project(&api, &acme, "Project 1", ProjectStatus::New);

    let (cid, pid) = (other.id.to_string(), p1.id.to_string());
    let response = api.client_project_show(&with_path(
        request(FULL),
        &[("client_id", &cid), ("id", &pid)],
    ));

    assert_eq!(response.status, 404);
    assert_eq!(
        response.body["error"],
        Value::from(format!("Couldn't find Project with 'id'={}", pid))
    );
}

#[test]
fn create_client_project_success() {
    let api = api();
    let acme = client(&api, "ACME");

    let id = acme.id.to_string();
    let mut req = with_path(request(FULL), &[("client_id", &id)]);
    req.add_body_param("name".to_string(), "My new project".to_string());
    req.add_body_param("project_status_id".to_string(), "1".to_string());
    let response = api.create_client_project(&req);

    assert_eq!(response.status, 201);
    assert_eq!(names(&response, "projects"), vec!["My new project"]);
    assert_eq!(response.body["projects"][0]["project_status"], "New");
}

#[test]
fn create_client_project_unknown_client() {
    let api = api();
    let mut req = with_path(request(FULL), &[("client_id", "not_there")]);
    req.add_body_param("name".to_string(), "My new project".to_string());
    req.add_body_param("project_status_id".to_string(), "1".to_string());

    let response = api.create_client_project(&req);
    assert_eq!(response.status, 404);
    assert_eq!(response.body["error"], "Couldn't find Client with 'id'=not_there");
}

#[test]
fn create_client_project_duplicate_name() {
    let api = api();
    let acme = client(&api, "ACME");
    project(&api, &acme, "My new project", ProjectStatus::New);

    let id = acme.id.to_string();
    let mut req = with_path(request(FULL), &[("client_id", &id)]);
    req.add_body_param("name".to_string(), "My new project".to_string());
    req.add_body_param("project_status_id".to_string(), "1".to_string());

    let response = api.create_client_project(&req);
    assert_eq!(response.status, 422);
    assert_eq!(response.body["error"], "Validation failed: Name has already been taken");
}

#[test]
fn create_client_project_denied_before_lookup() {
    let api = api();
    let acme = client(&api, "ACME");

    let id = acme.id.to_string();
    let mut req = with_path(request(READ), &[("client_id", &id)]);
    req.add_body_param("name".to_string(), "Sneaky".to_string());
    req.add_body_param("project_status_id".to_string(), "1".to_string());

    let response = api.create_client_project(&req);
    assert_eq!(response.status, 403);
    assert_eq!(api.store().lookups(), 0);
}

#[test]
fn update_client_project_changes_name_and_status() {
    let api = api();
    let acme = client(&api, "ACME");
    let p = project(&api, &acme, "Project", ProjectStatus::New);

    let (cid, pid) = (acme.id.to_string(), p.id.to_string());
    let mut req = with_path(request(FULL), &[("client_id", &cid), ("id", &pid)]);
    req.set_json_body(&json!({
        "name": "My updated project",
        "project_status_id": ProjectStatus::Done.id(),
        "client_id": 999
    }));
    let response = api.update_client_project(&req);

    assert_eq!(response.status, 200);
    let updated = &response.body["projects"][0];
    assert_eq!(updated["name"], "My updated project");
    assert_eq!(updated["project_status_id"], json!(4));
    assert_eq!(updated["project_status"], "Done");
    assert_eq!(updated["client"]["id"], json!(acme.id));
}

#[test]
fn update_client_project_rejects_unknown_status() {
    let api = api();
    let acme = client(&api, "ACME");
    let p = project(&api, &acme, "Project", ProjectStatus::New);

    let (cid, pid) = (acme.id.to_string(), p.id.to_string());
    let mut req = with_path(request(FULL), &[("client_id", &cid), ("id", &pid)]);
    req.add_body_param("project_status_id".to_string(), "12".to_string());

    let response = api.update_client_project(&req);
    assert_eq!(response.status, 422);
    assert_eq!(
        response.body["error"],
        "Validation failed: Project status is not included in the list"
    );
}

#[test]
fn delete_client_project_removes_only_target() {
    let api = api();
    let acme = client(&api, "ACME");
    let p1 = project(&api, &acme, "Project 1", ProjectStatus::New);
    let p2 = project(&api, &acme, "Project 2", ProjectStatus::New);

    let (cid, pid) = (acme.id.to_string(), p1.id.to_string());
    let response = api.delete_client_project(&with_path(
        request(FULL),
        &[("client_id", &cid), ("id", &pid)],
    ));

    assert_eq!(response.status, 200);
    assert_eq!(names(&response, "projects"), vec!["Project 1"]);

    let remaining = api.client_projects_index(&with_path(request(FULL), &[("client_id", &cid)]));
    assert_eq!(names(&remaining, "projects"), vec![p2.name]);

    let again = api.delete_client_project(&with_path(
        request(FULL),
        &[("client_id", &cid), ("id", &pid)],
    ));
    assert_eq!(again.status, 404);
}

#[test]
fn read_only_cannot_delete() {
    let api = api();
    let acme = client(&api, "ACME");
    let p1 = project(&api, &acme, "Project 1", ProjectStatus::New);

    let (cid, pid) = (acme.id.to_string(), p1.id.to_string());
    let response = api.delete_client_project(&with_path(
        request(READ),
        &[("client_id", &cid), ("id", &pid)],
    ));

    assert_eq!(response.status, 403);
    let still_there = api.client_projects_index(&with_path(request(READ), &[("client_id", &cid)]));
    assert_eq!(names(&still_there, "projects"), vec!["Project 1"]);
}
