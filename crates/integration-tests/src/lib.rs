//! Test doubles for the zoo product form admin.
//!
//! The sync and request layers only see [`ServiceStore`] and
//! [`GraphQLExecutor`], so the tests in `tests/` swap both for in-process
//! fakes:
//!
//! - [`MemoryServiceStore`] keeps services in a `Vec` and counts reference
//!   writes.
//! - [`ScriptedRemote`] records every Admin API call and answers from a
//!   closure keyed on the operation name.
//!
//! Tests against the real HTTP client use `wiremock` directly.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p zoo-product-form-integration-tests
//! ```

use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use zoo_product_form_admin::db::{RepositoryError, ServiceStore};
use zoo_product_form_admin::models::{Service, ServiceDraft};
use zoo_product_form_admin::shopify::{AdminShopifyError, GraphQLDocument, GraphQLExecutor};
use zoo_product_form_core::ServiceId;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Service store
// =============================================================================

#[derive(Default)]
struct MemoryState {
    services: Vec<Service>,
    next_id: i32,
    tick: i64,
}

impl MemoryState {
    /// Strictly increasing timestamps so newest-first ordering is stable.
    fn now(&mut self) -> chrono::DateTime<Utc> {
        self.tick += 1;
        Utc.timestamp_opt(1_767_225_600, 0)
            .single()
            .unwrap_or_default()
            + Duration::seconds(self.tick)
    }
}

/// In-memory [`ServiceStore`].
#[derive(Default)]
pub struct MemoryServiceStore {
    state: Mutex<MemoryState>,
    ref_writes: AtomicUsize,
    fail_writes: Mutex<bool>,
}

impl MemoryServiceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with services titled `titles`, oldest first.
    #[must_use]
    pub fn with_titles(titles: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut state = lock(&store.state);
            for title in titles {
                let service = new_service(&mut state, title, None, None);
                state.services.push(service);
            }
        }
        store
    }

    /// Give an existing service a reference, bypassing the counter.
    pub fn seed_remote_ref(&self, id: ServiceId, remote_ref: &str) {
        let mut state = lock(&self.state);
        if let Some(service) = state.services.iter_mut().find(|s| s.id == id) {
            service.remote_ref = Some(remote_ref.to_string());
        }
    }

    /// Make every following create/update/delete fail with a database error.
    pub fn fail_writes(&self) {
        *lock(&self.fail_writes) = true;
    }

    /// Number of `set_remote_ref` calls so far.
    #[must_use]
    pub fn ref_writes(&self) -> usize {
        self.ref_writes.load(Ordering::SeqCst)
    }

    /// Current copy of one service.
    #[must_use]
    pub fn snapshot(&self, id: ServiceId) -> Option<Service> {
        lock(&self.state).services.iter().find(|s| s.id == id).cloned()
    }

    /// Number of stored services.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if *lock(&self.fail_writes) {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

fn new_service(
    state: &mut MemoryState,
    title: &str,
    description: Option<&str>,
    image_url: Option<&str>,
) -> Service {
    state.next_id += 1;
    let now = state.now();
    Service {
        id: ServiceId::new(state.next_id),
        title: title.to_string(),
        description: description.map(ToString::to_string),
        image_url: image_url.map(ToString::to_string),
        remote_ref: None,
        created_at: now,
        updated_at: now,
    }
}

impl ServiceStore for MemoryServiceStore {
    async fn create(&self, draft: &ServiceDraft) -> Result<Service, RepositoryError> {
        self.check_writable()?;
        let mut state = lock(&self.state);
        let service = new_service(
            &mut state,
            draft.title(),
            draft.description(),
            draft.image_url(),
        );
        state.services.push(service.clone());
        Ok(service)
    }

    async fn get(&self, id: ServiceId) -> Result<Service, RepositoryError> {
        self.snapshot(id).ok_or(RepositoryError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Service>, RepositoryError> {
        let mut services = lock(&self.state).services.clone();
        services.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
        });
        Ok(services)
    }

    async fn update(&self, id: ServiceId, draft: &ServiceDraft) -> Result<Service, RepositoryError> {
        self.check_writable()?;
        let mut state = lock(&self.state);
        let now = state.now();
        let service = state
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepositoryError::NotFound)?;
        service.title = draft.title().to_string();
        service.description = draft.description().map(ToString::to_string);
        service.image_url = draft.image_url().map(ToString::to_string);
        service.updated_at = now;
        Ok(service.clone())
    }

    async fn delete(&self, id: ServiceId) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut state = lock(&self.state);
        let before = state.services.len();
        state.services.retain(|s| s.id != id);
        if state.services.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_remote_ref(&self, id: ServiceId, remote_ref: &str) -> Result<Service, RepositoryError> {
        self.ref_writes.fetch_add(1, Ordering::SeqCst);
        let mut state = lock(&self.state);
        let service = state
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if service.remote_ref.is_none() {
            service.remote_ref = Some(remote_ref.to_string());
        }
        Ok(service.clone())
    }
}

// =============================================================================
// Admin API
// =============================================================================

/// One recorded Admin API call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation_name: String,
    pub variables: Value,
}

type Handler = dyn Fn(&str, &Value) -> Result<Value, AdminShopifyError> + Send + Sync;

/// Scripted [`GraphQLExecutor`].
pub struct ScriptedRemote {
    handler: Box<Handler>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRemote {
    /// Answer every call with `handler(operation_name, variables)`.
    pub fn new(
        handler: impl Fn(&str, &Value) -> Result<Value, AdminShopifyError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A shop where the `zoo_service` definition exists and every write
    /// succeeds. Updates echo the addressed GID; creates and upserts return
    /// `gid://shopify/Metaobject/<n>` for the n-th of them.
    #[must_use]
    pub fn accepting() -> Self {
        let writes = AtomicUsize::new(0);
        Self::new(move |operation, variables| match operation {
            "MetaobjectDefinitions" => Ok(definitions_response(&["zoo_service"])),
            "MetaobjectDelete" => Ok(delete_response(variables["id"].as_str().unwrap_or_default())),
            "MetaobjectUpdate" => Ok(write_response(
                operation,
                variables["id"].as_str().unwrap_or_default(),
                "zoo-service",
            )),
            _ => {
                let n = writes.fetch_add(1, Ordering::SeqCst) + 1;
                let handle = variables["handle"]["handle"]
                    .as_str()
                    .map_or_else(|| format!("zoo-service-{n}"), ToString::to_string);
                Ok(write_response(
                    operation,
                    &format!("gid://shopify/Metaobject/{n}"),
                    &handle,
                ))
            }
        })
    }

    /// A shop that can't be reached.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::new(|_, _| Err(AdminShopifyError::UnexpectedStatus(502)))
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls made with `operation_name`.
    #[must_use]
    pub fn calls_to(&self, operation_name: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation_name == operation_name)
            .count()
    }
}

impl GraphQLExecutor for ScriptedRemote {
    async fn execute(
        &self,
        document: GraphQLDocument,
        variables: Value,
    ) -> Result<Value, AdminShopifyError> {
        let result = (self.handler)(document.operation_name, &variables);
        lock(&self.calls).push(RecordedCall {
            operation_name: document.operation_name.to_string(),
            variables,
        });
        result
    }
}

/// Root field a mutation's payload lives under, e.g. `metaobjectUpsert`.
#[must_use]
pub fn root_field(operation_name: &str) -> String {
    let mut chars = operation_name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

/// `data` for a successful metaobject write.
#[must_use]
pub fn write_response(operation_name: &str, id: &str, handle: &str) -> Value {
    json!({
        root_field(operation_name): {
            "metaobject": { "id": id, "handle": handle },
            "userErrors": [],
        }
    })
}

/// `data` for a write rejected with one user error.
#[must_use]
pub fn rejected_response(operation_name: &str, message: &str) -> Value {
    json!({
        root_field(operation_name): {
            "metaobject": null,
            "userErrors": [{ "field": ["metaobject", "fields"], "message": message }],
        }
    })
}

/// `data` for a successful delete.
#[must_use]
pub fn delete_response(id: &str) -> Value {
    json!({ "metaobjectDelete": { "deletedId": id, "userErrors": [] } })
}

/// `data` for the definitions query listing `types`.
#[must_use]
pub fn definitions_response(types: &[&str]) -> Value {
    let nodes: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(i, t)| {
            json!({
                "id": format!("gid://shopify/MetaobjectDefinition/{}", i + 1),
                "type": t,
                "name": t,
            })
        })
        .collect();
    json!({ "metaobjectDefinitions": { "nodes": nodes } })
}

/// `data` for a successful definition create.
#[must_use]
pub fn definition_created_response(type_name: &str) -> Value {
    json!({
        "metaobjectDefinitionCreate": {
            "metaobjectDefinition": {
                "id": "gid://shopify/MetaobjectDefinition/99",
                "type": type_name,
                "name": "Zoo Service",
            },
            "userErrors": [],
        }
    })
}
