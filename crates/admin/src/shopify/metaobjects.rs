//! Metaobject and metaobject definition operations.
//!
//! Three addressing modes exist for writing an entry, see [`AddressBy`]. Each
//! maps to its own mutation so that the remote identity semantics stay
//! explicit at the call site.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::instrument;
use zoo_product_form_core::MetaobjectHandle;

use super::{AdminShopifyError, GraphQLDocument, GraphQLExecutor};

const DEFINITIONS_QUERY: GraphQLDocument = GraphQLDocument {
    operation_name: "MetaobjectDefinitions",
    query: r"query MetaobjectDefinitions($first: Int!) {
  metaobjectDefinitions(first: $first) {
    nodes { id type name }
  }
}",
};

const DEFINITION_CREATE: GraphQLDocument = GraphQLDocument {
    operation_name: "MetaobjectDefinitionCreate",
    query: r"mutation MetaobjectDefinitionCreate($definition: MetaobjectDefinitionCreateInput!) {
  metaobjectDefinitionCreate(definition: $definition) {
    metaobjectDefinition { id type name }
    userErrors { field message code }
  }
}",
};

const METAOBJECT_UPSERT: GraphQLDocument = GraphQLDocument {
    operation_name: "MetaobjectUpsert",
    query: r"mutation MetaobjectUpsert($handle: MetaobjectHandleInput!, $metaobject: MetaobjectUpsertInput!) {
  metaobjectUpsert(handle: $handle, metaobject: $metaobject) {
    metaobject { id handle }
    userErrors { field message code }
  }
}",
};

const METAOBJECT_UPDATE: GraphQLDocument = GraphQLDocument {
    operation_name: "MetaobjectUpdate",
    query: r"mutation MetaobjectUpdate($id: ID!, $metaobject: MetaobjectUpdateInput!) {
  metaobjectUpdate(id: $id, metaobject: $metaobject) {
    metaobject { id handle }
    userErrors { field message code }
  }
}",
};

const METAOBJECT_CREATE: GraphQLDocument = GraphQLDocument {
    operation_name: "MetaobjectCreate",
    query: r"mutation MetaobjectCreate($metaobject: MetaobjectCreateInput!) {
  metaobjectCreate(metaobject: $metaobject) {
    metaobject { id handle }
    userErrors { field message code }
  }
}",
};

const METAOBJECT_DELETE: GraphQLDocument = GraphQLDocument {
    operation_name: "MetaobjectDelete",
    query: r"mutation MetaobjectDelete($id: ID!) {
  metaobjectDelete(id: $id) {
    deletedId
    userErrors { field message code }
  }
}",
};

/// How a metaobject write locates its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressBy {
    /// The GID of an existing entry; updated in place.
    Reference(String),
    /// A handle within the metaobject type; created on first use.
    Handle(MetaobjectHandle),
    /// The type alone; Shopify assigns a new identity and handle.
    NewEntry,
}

/// A `{key, value}` pair written to a metaobject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaobjectFieldInput {
    pub key: String,
    pub value: String,
}

impl MetaobjectFieldInput {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A mutation-level validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Path to the offending input field, if any.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Identity of a written metaobject.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetaobjectRef {
    pub id: String,
    pub handle: String,
}

/// Payload shared by the create, update and upsert mutations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaobjectPayload {
    pub metaobject: Option<MetaobjectRef>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

/// Payload of `metaobjectDelete`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaobjectDeletePayload {
    pub deleted_id: Option<String>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

/// A metaobject definition (the schema of a metaobject type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaobjectDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
}

/// Payload of `metaobjectDefinitionCreate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaobjectDefinitionPayload {
    pub metaobject_definition: Option<MetaobjectDefinition>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

/// Input for creating a metaobject definition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionInput {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub access: DefinitionAccess,
    pub field_definitions: Vec<FieldDefinitionInput>,
}

/// Access policy of a definition.
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionAccess {
    /// Storefront access, e.g. `PUBLIC_READ`.
    pub storefront: String,
}

/// One field of a definition.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDefinitionInput {
    pub name: String,
    pub key: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub required: bool,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

/// Pull one root field out of a response `data` object.
fn take_root<T: DeserializeOwned>(
    mut data: serde_json::Value,
    root: &'static str,
) -> Result<T, AdminShopifyError> {
    let node = data
        .get_mut(root)
        .map(serde_json::Value::take)
        .filter(|v| !v.is_null())
        .ok_or(AdminShopifyError::MissingData(root))?;
    Ok(serde_json::from_value(node)?)
}

/// List metaobject definitions (first page only).
///
/// # Errors
///
/// Returns an error if the request fails or the response can't be decoded.
#[instrument(skip(executor))]
pub async fn list_definitions<G: GraphQLExecutor>(
    executor: &G,
    first: i64,
) -> Result<Vec<MetaobjectDefinition>, AdminShopifyError> {
    let data = executor
        .execute(DEFINITIONS_QUERY, json!({ "first": first }))
        .await?;
    let connection: Nodes<MetaobjectDefinition> = take_root(data, "metaobjectDefinitions")?;
    Ok(connection.nodes)
}

/// Create a metaobject definition.
///
/// # Errors
///
/// Returns an error if the request fails. User errors are in the payload.
#[instrument(skip(executor, definition), fields(metaobject_type = %definition.type_name))]
pub async fn create_definition<G: GraphQLExecutor>(
    executor: &G,
    definition: &DefinitionInput,
) -> Result<MetaobjectDefinitionPayload, AdminShopifyError> {
    let data = executor
        .execute(DEFINITION_CREATE, json!({ "definition": definition }))
        .await?;
    take_root(data, "metaobjectDefinitionCreate")
}

/// Write a metaobject of `metaobject_type` at `address`.
///
/// # Errors
///
/// Returns an error if the request fails. User errors are in the payload.
#[instrument(skip(executor, fields))]
pub async fn write_metaobject<G: GraphQLExecutor>(
    executor: &G,
    metaobject_type: &str,
    address: &AddressBy,
    fields: &[MetaobjectFieldInput],
) -> Result<MetaobjectPayload, AdminShopifyError> {
    match address {
        AddressBy::Reference(id) => {
            let data = executor
                .execute(
                    METAOBJECT_UPDATE,
                    json!({ "id": id, "metaobject": { "fields": fields } }),
                )
                .await?;
            take_root(data, "metaobjectUpdate")
        }
        AddressBy::Handle(handle) => {
            let data = executor
                .execute(
                    METAOBJECT_UPSERT,
                    json!({
                        "handle": { "type": metaobject_type, "handle": handle },
                        "metaobject": { "fields": fields },
                    }),
                )
                .await?;
            take_root(data, "metaobjectUpsert")
        }
        AddressBy::NewEntry => {
            let data = executor
                .execute(
                    METAOBJECT_CREATE,
                    json!({ "metaobject": { "type": metaobject_type, "fields": fields } }),
                )
                .await?;
            take_root(data, "metaobjectCreate")
        }
    }
}

/// Delete a metaobject by GID.
///
/// # Errors
///
/// Returns an error if the request fails. User errors are in the payload.
#[instrument(skip(executor))]
pub async fn delete_metaobject<G: GraphQLExecutor>(
    executor: &G,
    id: &str,
) -> Result<MetaobjectDeletePayload, AdminShopifyError> {
    let data = executor
        .execute(METAOBJECT_DELETE, json!({ "id": id }))
        .await?;
    take_root(data, "metaobjectDelete")
}
