//! Shopify Admin API access.
//!
//! # Architecture
//!
//! - [`GraphQLExecutor`] is the only seam between this app and Shopify: one
//!   authenticated `execute(document, variables)` call returning the `data`
//!   object of the response.
//! - [`AdminClient`] implements it over HTTPS with `reqwest`.
//! - [`metaobjects`] holds the six documents this app sends and their typed
//!   payloads. Mutation `userErrors` are returned in those payloads, never as
//!   an [`AdminShopifyError`].

mod client;
pub mod metaobjects;

use std::future::Future;

pub use client::AdminClient;

use thiserror::Error;

/// Errors that can occur when talking to the Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status other than 401/429.
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// GraphQL query returned top-level errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Expected field missing from the response data.
    #[error("Missing `{0}` in response data")]
    MissingData(&'static str),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A named GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphQLDocument {
    /// Operation name, sent as `operationName`.
    pub operation_name: &'static str,
    /// Full document text.
    pub query: &'static str,
}

/// Authenticated GraphQL execution against the Admin API.
pub trait GraphQLExecutor: Send + Sync {
    /// Run one operation and return the response's `data` object.
    ///
    /// Transport failures, non-success statuses and top-level GraphQL
    /// `errors` are all reported as `Err`.
    fn execute(
        &self,
        document: GraphQLDocument,
        variables: serde_json::Value,
    ) -> impl Future<Output = Result<serde_json::Value, AdminShopifyError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field 'metaobjectUpsert' doesn't exist".to_string(),
                locations: vec![],
                path: vec![],
            },
            GraphQLError {
                message: "Invalid ID".to_string(),
                locations: vec![],
                path: vec![],
            },
        ];
        let err = AdminShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field 'metaobjectUpsert' doesn't exist; Invalid ID"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = AdminShopifyError::RateLimited(2);
        assert_eq!(err.to_string(), "Rate limited, retry after 2 seconds");
    }

    #[test]
    fn test_missing_data_error() {
        let err = AdminShopifyError::MissingData("metaobjectDelete");
        assert_eq!(
            err.to_string(),
            "Missing `metaobjectDelete` in response data"
        );
    }
}
