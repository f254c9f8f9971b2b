//! In-memory reference data layer.
//!
//! Stands in for the relational store the handlers talk to. It owns the
//! domain validation (presence, uniqueness, length, status inclusion) and
//! reports `NotFound`/`ValidationFailed` the way a database-backed layer
//! would.
//!
//! Slice semantics follow SQL `LIMIT`/`OFFSET` as SQLite reads them: a
//! negative limit means no limit, a negative offset is treated as zero.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};

use crate::error::ApiError;
use crate::model::{Client, Project};
use crate::pagination::CollectionHandle;
use crate::sanitizer::{IntegerSanitizer, NameSanitizer, SanitizationErrorKind, Sanitizer};
use crate::status::StatusSanitizer;
use crate::tainted::Tainted;

/// Fields accepted when creating a client.
#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    /// Requested name
    pub name: Option<Tainted<String>>,
}

impl ClientInput {
    /// Input with the given name.
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(Tainted::new(name.to_string())),
        }
    }
}

/// Fields accepted when creating or updating a project.
///
/// On update, absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    /// Requested name
    pub name: Option<Tainted<String>>,
    /// Requested status id, as sent
    pub project_status_id: Option<Tainted<String>>,
}

impl ProjectInput {
    /// Input with the given name and status id.
    pub fn new(name: &str, project_status_id: i64) -> Self {
        Self {
            name: Some(Tainted::new(name.to_string())),
            project_status_id: Some(Tainted::new(project_status_id.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
struct ProjectRow {
    id: i64,
    name: String,
    project_status_id: i64,
    client_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    clients: Vec<Client>,
    projects: Vec<ProjectRow>,
    next_client_id: i64,
    next_project_id: i64,
    last_tick: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps, so creation order is total.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }

    fn client(&self, id: i64) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    fn materialize(&self, row: &ProjectRow) -> Result<Project, ApiError> {
        let client = self.client(row.client_id).cloned().ok_or_else(|| {
            ApiError::ConfigurationFault(format!(
                "project {} references missing client {}",
                row.id, row.client_id
            ))
        })?;

        Ok(Project {
            id: row.id,
            name: row.name.clone(),
            project_status_id: row.project_status_id,
            client_id: row.client_id,
            client,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Thread-safe in-memory store for clients and projects.
///
/// Counts every collection traversal and entity lookup, so callers can prove
/// that a rejected request never touched the data.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    max_input_length: usize,
    slice_fetches: AtomicUsize,
    lookups: AtomicUsize,
}

impl MemoryStore {
    /// An empty store enforcing `max_input_length` on names.
    pub fn new(max_input_length: usize) -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_client_id: 1,
                next_project_id: 1,
                ..Tables::default()
            }),
            max_input_length,
            slice_fetches: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of ordered slices fetched so far.
    pub fn slice_fetches(&self) -> usize {
        self.slice_fetches.load(Ordering::Relaxed)
    }

    /// Number of single-entity lookups so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Every client, in creation order.
    pub fn all_clients(&self) -> ClientCollection<'_> {
        ClientCollection { store: self }
    }

    /// Every project regardless of client, in creation order.
    pub fn all_projects(&self) -> ProjectCollection<'_> {
        ProjectCollection {
            store: self,
            client_id: None,
        }
    }

    /// Projects belonging to `client`, in creation order.
    pub fn client_projects(&self, client: &Client) -> ProjectCollection<'_> {
        ProjectCollection {
            store: self,
            client_id: Some(client.id),
        }
    }

    /// Finds a client by its raw id.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] naming `id` as supplied, including ids that are
    /// not numbers.
    pub fn find_client(&self, id: Tainted<String>) -> Result<Client, ApiError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let id = parse_id("Client", id)?;

        self.read()
            .client(id.value)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Client", id.raw))
    }

    /// Finds one of `client`'s projects by its raw id.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] if the project does not exist or belongs to
    /// another client.
    pub fn find_client_project(
        &self,
        client: &Client,
        id: Tainted<String>,
    ) -> Result<Project, ApiError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let id = parse_id("Project", id)?;

        let tables = self.read();
        let row = tables
            .projects
            .iter()
            .find(|p| p.id == id.value && p.client_id == client.id)
            .ok_or_else(|| ApiError::not_found("Project", id.raw))?;
        tables.materialize(row)
    }

    /// Creates a client.
    ///
    /// # Errors
    ///
    /// [`ApiError::ValidationFailed`] listing every broken rule on `name`.
    pub fn create_client(&self, input: ClientInput) -> Result<Client, ApiError> {
        let mut tables = self.write();

        let mut messages = Vec::new();
        let name = self.check_name(input.name, &mut messages, |candidate| {
            tables.clients.iter().any(|c| c.name == candidate)
        });
        let Some(name) = name.filter(|_| messages.is_empty()) else {
            return Err(ApiError::invalid(messages));
        };

        let now = tables.tick();
        let client = Client {
            id: tables.next_client_id,
            name,
            created_at: now,
            updated_at: now,
        };
        tables.next_client_id += 1;
        tables.clients.push(client.clone());

        tracing::info!(client_id = client.id, "client created");
        Ok(client)
    }

    /// Creates a project owned by `client`.
    ///
    /// # Errors
    ///
    /// [`ApiError::ValidationFailed`] listing every broken rule, name rules
    /// first; [`ApiError::NotFound`] if `client` has been removed.
    pub fn create_project(
        &self,
        client: &Client,
        input: ProjectInput,
    ) -> Result<Project, ApiError> {
        let mut tables = self.write();

        if tables.client(client.id).is_none() {
            return Err(ApiError::not_found("Client", client.id.to_string()));
        }

        let mut messages = Vec::new();
        let name = self.check_name(input.name, &mut messages, |candidate| {
            tables.projects.iter().any(|p| p.name == candidate)
        });
        let status = check_status(input.project_status_id, &mut messages);

        let (Some(name), Some(project_status_id)) = (name, status) else {
            return Err(ApiError::invalid(messages));
        };
        if !messages.is_empty() {
            return Err(ApiError::invalid(messages));
        }

        let now = tables.tick();
        let row = ProjectRow {
            id: tables.next_project_id,
            name,
            project_status_id,
            client_id: client.id,
            created_at: now,
            updated_at: now,
        };
        tables.next_project_id += 1;
        tables.projects.push(row.clone());

        tracing::info!(project_id = row.id, client_id = client.id, "project created");
        tables.materialize(&row)
    }

    /// Applies `input` to an existing project. Absent fields are unchanged;
    /// `updated_at` only moves when something was supplied.
    ///
    /// # Errors
    ///
    /// [`ApiError::ValidationFailed`] for a supplied field that breaks a rule;
    /// [`ApiError::NotFound`] if the project no longer exists.
    pub fn update_project(
        &self,
        project: &Project,
        input: ProjectInput,
    ) -> Result<Project, ApiError> {
        let mut tables = self.write();

        let mut messages = Vec::new();
        let name = match input.name {
            Some(raw) => self.check_name(Some(raw), &mut messages, |candidate| {
                tables
                    .projects
                    .iter()
                    .any(|p| p.name == candidate && p.id != project.id)
            }),
            None => None,
        };
        let status = match input.project_status_id {
            Some(raw) => check_status(Some(raw), &mut messages),
            None => None,
        };
        if !messages.is_empty() {
            return Err(ApiError::invalid(messages));
        }

        let changed = name.is_some() || status.is_some();
        let now = if changed { Some(tables.tick()) } else { None };
        let row = tables
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| ApiError::not_found("Project", project.id.to_string()))?;

        if let Some(name) = name {
            row.name = name;
        }
        if let Some(status) = status {
            row.project_status_id = status;
        }
        if let Some(now) = now {
            row.updated_at = now;
        }
        let row = row.clone();

        tracing::info!(project_id = row.id, "project updated");
        tables.materialize(&row)
    }

    /// Removes a project and returns it as it was.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] if the project no longer exists.
    pub fn delete_project(&self, project: &Project) -> Result<Project, ApiError> {
        let mut tables = self.write();

        let index = tables
            .projects
            .iter()
            .position(|p| p.id == project.id)
            .ok_or_else(|| ApiError::not_found("Project", project.id.to_string()))?;
        let row = tables.projects.remove(index);

        tracing::info!(project_id = row.id, "project deleted");
        tables.materialize(&row)
    }

    /// Validates a name: presence, then uniqueness and length.
    fn check_name(
        &self,
        raw: Option<Tainted<String>>,
        messages: &mut Vec<String>,
        taken: impl Fn(&str) -> bool,
    ) -> Option<String> {
        let sanitizer = NameSanitizer::new("Name", self.max_input_length);

        let Some(raw) = raw else {
            messages.push(sanitizer.blank_message());
            return None;
        };
        let candidate = raw.clone().into_inner();

        match sanitizer.sanitize(raw) {
            Err(err) if err.kind() == SanitizationErrorKind::Empty => {
                messages.push(err.message().to_string());
                None
            }
            result => {
                if taken(&candidate) {
                    messages.push("Name has already been taken".to_string());
                }
                match result {
                    Ok(name) => Some(name.into_inner()),
                    Err(err) => {
                        messages.push(err.message().to_string());
                        None
                    }
                }
            }
        }
    }
}

fn check_status(raw: Option<Tainted<String>>, messages: &mut Vec<String>) -> Option<i64> {
    let Some(raw) = raw else {
        messages.push(StatusSanitizer.blank_message());
        return None;
    };

    match StatusSanitizer.sanitize(raw) {
        Ok(status) => Some(status.into_inner().id()),
        Err(err) => {
            messages.push(err.message().to_string());
            None
        }
    }
}

struct RecordId {
    raw: String,
    value: i64,
}

fn parse_id(model: &'static str, id: Tainted<String>) -> Result<RecordId, ApiError> {
    let raw = id.clone().into_inner();
    match IntegerSanitizer::new("id").sanitize(id) {
        Ok(value) => Ok(RecordId {
            raw,
            value: value.into_inner(),
        }),
        Err(_) => Err(ApiError::not_found(model, raw)),
    }
}

fn window<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
    let take = if limit < 0 {
        usize::MAX
    } else {
        usize::try_from(limit).unwrap_or(usize::MAX)
    };
    rows.into_iter().skip(skip).take(take).collect()
}

/// Creation-ordered view over every client.
#[derive(Debug, Clone, Copy)]
pub struct ClientCollection<'s> {
    store: &'s MemoryStore,
}

impl CollectionHandle for ClientCollection<'_> {
    type Item = Client;

    fn ordered_slice(&self, limit: i64, offset: i64) -> Result<Vec<Client>, ApiError> {
        self.store.slice_fetches.fetch_add(1, Ordering::Relaxed);

        let mut rows = self.store.read().clients.clone();
        rows.sort_by_key(|c| (c.created_at, c.id));
        Ok(window(rows, limit, offset))
    }
}

/// Creation-ordered view over projects, optionally filtered by client.
#[derive(Debug, Clone, Copy)]
pub struct ProjectCollection<'s> {
    store: &'s MemoryStore,
    client_id: Option<i64>,
}

impl CollectionHandle for ProjectCollection<'_> {
    type Item = Project;

    fn ordered_slice(&self, limit: i64, offset: i64) -> Result<Vec<Project>, ApiError> {
        self.store.slice_fetches.fetch_add(1, Ordering::Relaxed);

        let tables = self.store.read();
        let mut rows: Vec<&ProjectRow> = tables
            .projects
            .iter()
            .filter(|p| self.client_id.map_or(true, |id| p.client_id == id))
            .collect();
        rows.sort_by_key(|p| (p.created_at, p.id));

        window(rows, limit, offset)
            .into_iter()
            .map(|row| tables.materialize(row))
            .collect()
    }
}
