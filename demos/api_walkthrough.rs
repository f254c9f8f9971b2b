//! Walks one dataset through the API as each reference principal.
//!
//! 1. Create a client and a few projects as the full-access caller
//! 2. Page through them
//! 3. Repeat the list and a detail read as the read-only caller
//! 4. Try the same as the no-access caller
//!
//! Run with: `cargo run --example api_walkthrough`

use client_projects::web::{Api, RequestAdapter, Response};
use client_projects::{Secret, Settings};
use serde_json::json;

fn request(id: &str, token: &str) -> RequestAdapter {
    let mut adapter = RequestAdapter::new(id.to_string());
    adapter.add_header("Authorization".to_string(), format!("Bearer {}", token));
    adapter
}

fn show(label: &str, response: &Response) {
    println!("\n=== {} ===", label);
    println!("status: {}", response.status);
    match serde_json::to_string_pretty(&response.body) {
        Ok(body) => println!("{}", body),
        Err(err) => println!("<unprintable body: {}>", err),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let api = Api::new(&Settings {
        full_permission_token: Some(Secret::new("full-demo".to_string())),
        no_permission_token: Some(Secret::new("none-demo".to_string())),
        read_only_permission_token: Some(Secret::new("ro-demo".to_string())),
        ..Settings::default()
    });

    let mut create = request("req-1", "full-demo");
    create.set_json_body(&json!({
        "name": "Website relaunch",
        "project_status_id": 2,
        "client": { "name": "ACME" }
    }));
    let created = api.create_project_with_client(&create);
    show("POST /projects (full access)", &created);

    let client_id = created.body["projects"][0]["client"]["id"].to_string();
    for (i, (name, status)) in [("Mobile app", "1"), ("Brand refresh", "3"), ("Archive", "4")]
        .into_iter()
        .enumerate()
    {
        let mut add = request(&format!("req-add-{}", i), "full-demo");
        add.add_path_param("client_id".to_string(), client_id.clone());
        add.add_body_param("name".to_string(), name.to_string());
        add.add_body_param("project_status_id".to_string(), status.to_string());
        api.create_client_project(&add);
    }

    let mut page = request("req-2", "full-demo");
    page.add_query_param("page".to_string(), "2".to_string());
    page.add_query_param("per_page".to_string(), "2".to_string());
    show("GET /projects?page=2&per_page=2 (full access)", &api.projects_index(&page));

    show("GET /projects (read-only)", &api.projects_index(&request("req-3", "ro-demo")));

    let mut detail = request("req-4", "ro-demo");
    detail.add_path_param("client_id".to_string(), client_id.clone());
    detail.add_path_param("id".to_string(), "1".to_string());
    show(
        "GET /clients/:client_id/projects/1 (read-only)",
        &api.client_project_show(&detail),
    );

    show("GET /clients (no access)", &api.clients_index(&request("req-5", "none-demo")));
    show("GET /clients (bad token)", &api.clients_index(&request("req-6", "guess")));
}
