//! Request handlers for the clients/projects API.
//!
//! Every handler follows the same pipeline:
//!
//! 1. resolve the credential ([`extract_authed`]), 401 on failure
//! 2. check every permission the operation needs ([`PolicyGate`]), 403 on the
//!    first denial; parent checks come before child checks
//! 3. look up, mutate or paginate through the [`MemoryStore`]
//! 4. project the result through the view registry
//!
//! Steps 1 and 2 finish before any data is touched.

use serde_json::Value;

use crate::capability::{Action, Resource};
use crate::config::Settings;
use crate::context::Ctx;
use crate::error::ApiError;
use crate::gate::PolicyGate;
use crate::model::Client;
use crate::pagination::{PageParams, Paginator};
use crate::policy::Authorized as Permission;
use crate::projection::{Projection, Projector, ViewFlags, EXPOSE_CLIENT};
use crate::resolver::CredentialTable;
use crate::state::{Authed, Authorized};
use crate::store::{ClientInput, MemoryStore, ProjectInput};
use crate::tainted::Tainted;

use super::{extract_authed, AuthenticatedExtraction, RequestAdapter, TaintedInputs};

/// Status and JSON body returned by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// JSON body
    pub body: Value,
}

/// The API: credential table, paginator, projector and data store.
///
/// Built once at startup and shared by all requests.
///
/// # Examples
///
/// ```
/// use client_projects::web::{Api, RequestAdapter};
/// use client_projects::{Secret, Settings};
///
/// let settings = Settings {
///     full_permission_token: Some(Secret::new("full".to_string())),
///     ..Settings::default()
/// };
/// let api = Api::new(&settings);
///
/// let mut request = RequestAdapter::new("req-1".to_string());
/// request.add_query_param("token".to_string(), "full".to_string());
///
/// let response = api.projects_index(&request);
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body["page"], "1");
/// assert_eq!(response.body["per_page"], "100");
/// ```
#[derive(Debug)]
pub struct Api {
    credentials: CredentialTable,
    paginator: Paginator,
    projector: Projector<'static>,
    store: MemoryStore,
}

impl Api {
    /// Builds the API from loaded settings, with an empty store.
    pub fn new(settings: &Settings) -> Self {
        Self::from_parts(
            settings.credential_table(),
            settings.paginator(),
            MemoryStore::new(settings.max_input_length),
        )
    }

    /// Builds the API from explicit collaborators.
    pub fn from_parts(
        credentials: CredentialTable,
        paginator: Paginator,
        store: MemoryStore,
    ) -> Self {
        Self {
            credentials,
            paginator,
            projector: Projector::standard(),
            store,
        }
    }

    /// The backing store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// `GET /projects`: every project, paginated.
    pub fn projects_index(&self, request: &RequestAdapter) -> Response {
        self.handle(request, 200, |extraction| {
            let ctx = authorize(extraction.context, &[(Resource::Projects, Action::Index)])?;

            let page = self
                .paginator
                .paginate(&self.store.all_projects(), &page_params(&extraction.inputs))?;
            ctx.log()
                .info(format_args!("listing {} projects", page.items.len()));

            self.projector
                .project_page(Resource::Projects.as_str(), &page, &list_flags(&ctx))
        })
    }

    /// `POST /projects`: creates a client and its first project.
    ///
    /// Body: `name`, `project_status_id`, `client.name`. The client is
    /// created first; if the project then fails validation the client stays.
    pub fn create_project_with_client(&self, request: &RequestAdapter) -> Response {
        self.handle(request, 201, |extraction| {
            let ctx = authorize(
                extraction.context,
                &[
                    (Resource::Clients, Action::Create),
                    (Resource::Projects, Action::Create),
                ],
            )?;
            let inputs = extraction.inputs;

            let client = self
                .store
                .create_client(ClientInput {
                    name: inputs.get_body("client.name"),
                })
                .map_err(|err| err.scoped("client"))?;
            let project = self.store.create_project(&client, project_input(&inputs))?;
            ctx.log().info(format_args!(
                "created client {} with project {}",
                client.id, project.id
            ));

            self.projector.project(
                Resource::Projects.as_str(),
                std::slice::from_ref(&project),
                &detail_flags(),
            )
        })
    }

    /// `GET /clients`: every client, paginated.
    pub fn clients_index(&self, request: &RequestAdapter) -> Response {
        self.handle(request, 200, |extraction| {
            let ctx = authorize(extraction.context, &[(Resource::Clients, Action::Index)])?;

            let page = self
                .paginator
                .paginate(&self.store.all_clients(), &page_params(&extraction.inputs))?;
            ctx.log()
                .info(format_args!("listing {} clients", page.items.len()));

            self.projector
                .project_page(Resource::Clients.as_str(), &page, &list_flags(&ctx))
        })
    }

    /// `GET /clients/:client_id/projects`: the client's projects, paginated.
    pub fn client_projects_index(&self, request: &RequestAdapter) -> Response {
        self.handle(request, 200, |extraction| {
            let ctx = authorize(
                extraction.context,
                &[
                    (Resource::Clients, Action::Show),
                    (Resource::Projects, Action::Index),
                ],
            )?;

            let client = self.client(&extraction.inputs)?;
            let page = self.paginator.paginate(
                &self.store.client_projects(&client),
                &page_params(&extraction.inputs),
            )?;
            ctx.log().info(format_args!(
                "listing {} projects of client {}",
                page.items.len(),
                client.id
            ));

            self.projector
                .project_page(Resource::Projects.as_str(), &page, &list_flags(&ctx))
        })
    }

    /// `GET /clients/:client_id/projects/:id`: one project, with its client.
    pub fn client_project_show(&self, request: &RequestAdapter) -> Response {
        self.handle(request, 200, |extraction| {
            let ctx = authorize(
                extraction.context,
                &[
                    (Resource::Clients, Action::Show),
                    (Resource::Projects, Action::Show),
                ],
            )?;

            let client = self.client(&extraction.inputs)?;
            let project = self
                .store
                .find_client_project(&client, path_id(&extraction.inputs, "id"))?;
            ctx.log().debug(format_args!("showing project {}", project.id));

            self.projector.project(
                Resource::Projects.as_str(),
                std::slice::from_ref(&project),
                &detail_flags(),
            )
        })
    }

    /// `POST /clients/:client_id/projects`: adds a project to a client.
    pub fn create_client_project(&self, request: &RequestAdapter) -> Response {
        self.handle(request, 201, |extraction| {
            let ctx = authorize(
                extraction.context,
                &[
                    (Resource::Clients, Action::Show),
                    (Resource::Projects, Action::Create),
                ],
            )?;

            let client = self.client(&extraction.inputs)?;
            let project = self
                .store
                .create_project(&client, project_input(&extraction.inputs))?;
            ctx.log()
                .info(format_args!("created project {}", project.id));

            self.projector.project(
                Resource::Projects.as_str(),
                std::slice::from_ref(&project),
                &detail_flags(),
            )
        })
    }

    /// `PUT /clients/:client_id/projects/:id`: changes `name` and/or
    /// `project_status_id`. Other body fields are ignored.
    pub fn update_client_project(&self, request: &RequestAdapter) -> Response {
        self.handle(request, 200, |extraction| {
            let ctx = authorize(
                extraction.context,
                &[
                    (Resource::Clients, Action::Show),
                    (Resource::Projects, Action::Update),
                ],
            )?;

            let client = self.client(&extraction.inputs)?;
            let project = self
                .store
                .find_client_project(&client, path_id(&extraction.inputs, "id"))?;
            let updated = self
                .store
                .update_project(&project, project_input(&extraction.inputs))?;
            ctx.log()
                .info(format_args!("updated project {}", updated.id));

            self.projector.project(
                Resource::Projects.as_str(),
                std::slice::from_ref(&updated),
                &detail_flags(),
            )
        })
    }

    /// `DELETE /clients/:client_id/projects/:id`: removes a project and
    /// returns it.
    pub fn delete_client_project(&self, request: &RequestAdapter) -> Response {
        self.handle(request, 200, |extraction| {
            let ctx = authorize(
                extraction.context,
                &[
                    (Resource::Clients, Action::Show),
                    (Resource::Projects, Action::Delete),
                ],
            )?;

            let client = self.client(&extraction.inputs)?;
            let project = self
                .store
                .find_client_project(&client, path_id(&extraction.inputs, "id"))?;
            let deleted = self.store.delete_project(&project)?;
            ctx.log()
                .info(format_args!("deleted project {}", deleted.id));

            self.projector.project(
                Resource::Projects.as_str(),
                std::slice::from_ref(&deleted),
                &detail_flags(),
            )
        })
    }

    fn client(&self, inputs: &TaintedInputs) -> Result<Client, ApiError> {
        self.store.find_client(path_id(inputs, "client_id"))
    }

    fn handle<F>(&self, request: &RequestAdapter, status: u16, operation: F) -> Response
    where
        F: FnOnce(AuthenticatedExtraction) -> Result<Projection, ApiError>,
    {
        match extract_authed(request, &self.credentials).and_then(operation) {
            Ok(projection) => Response {
                status,
                body: projection.into_json(),
            },
            Err(err) => {
                if err.is_internal() {
                    tracing::error!(
                        request_id = %request.request_id(),
                        error = %err,
                        "request failed"
                    );
                } else {
                    tracing::debug!(
                        request_id = %request.request_id(),
                        error = %err,
                        "request rejected"
                    );
                }
                Response {
                    status: err.status(),
                    body: err.to_envelope(),
                }
            }
        }
    }
}

fn authorize(
    ctx: Ctx<Authed>,
    required: &[(Resource, Action)],
) -> Result<Ctx<Authorized>, ApiError> {
    required
        .iter()
        .fold(PolicyGate::new(ctx), |gate, &(resource, action)| {
            gate.require(Permission::to(resource, action))
        })
        .build()
}

fn page_params(inputs: &TaintedInputs) -> PageParams {
    PageParams::new(inputs.get_query("page"), inputs.get_query("per_page"))
}

fn project_input(inputs: &TaintedInputs) -> ProjectInput {
    ProjectInput {
        name: inputs.get_body("name"),
        project_status_id: inputs.get_body("project_status_id"),
    }
}

/// A missing path parameter reads as an empty id, which matches nothing.
fn path_id(inputs: &TaintedInputs, key: &str) -> Tainted<String> {
    inputs
        .get_path(key)
        .unwrap_or_else(|| Tainted::new(String::new()))
}

/// List views nest the client only for admin-equivalent callers.
fn list_flags(ctx: &Ctx<Authorized>) -> ViewFlags {
    ViewFlags::new().with(EXPOSE_CLIENT, ctx.is_admin())
}

/// Detail and write responses always nest the client.
fn detail_flags() -> ViewFlags {
    ViewFlags::new().with(EXPOSE_CLIENT, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Secret;

    fn api() -> Api {
        Api::new(&Settings {
            full_permission_token: Some(Secret::new("full".to_string())),
            no_permission_token: Some(Secret::new("none".to_string())),
            read_only_permission_token: Some(Secret::new("ro".to_string())),
            ..Settings::default()
        })
    }

    fn request(token: &str) -> RequestAdapter {
        let mut adapter = RequestAdapter::new("req-test".to_string());
        adapter.add_query_param("token".to_string(), token.to_string());
        adapter
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let response = api().projects_index(&RequestAdapter::new("req-anon".to_string()));
        assert_eq!(response.status, 401);
        assert_eq!(response.body, serde_json::json!({ "error": "401 Unauthorized" }));
    }

    #[test]
    fn denied_request_never_reads_the_store() {
        let api = api();
        let response = api.projects_index(&request("none"));

        assert_eq!(response.status, 403);
        assert_eq!(response.body["error"], "403 Forbidden");
        assert_eq!(api.store().slice_fetches(), 0);
        assert_eq!(api.store().lookups(), 0);
    }

    #[test]
    fn nested_write_checks_parent_before_lookup() {
        let api = api();
        let mut req = request("ro");
        req.add_path_param("client_id".to_string(), "not_there".to_string());

        let response = api.create_client_project(&req);
        assert_eq!(response.status, 403);
        assert_eq!(api.store().lookups(), 0);
    }

    #[test]
    fn empty_store_lists_nothing() {
        let response = api().clients_index(&request("ro"));
        assert_eq!(response.status, 200);
        assert_eq!(response.body["clients"], serde_json::json!([]));
    }
}
