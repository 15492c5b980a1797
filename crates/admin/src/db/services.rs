//! Service store.
//!
//! [`ServiceStore`] is the narrow persistence contract the sync and request
//! layers depend on. [`ServiceRepository`] implements it on `PostgreSQL`.
//! Every operation touches exactly one row.

use std::future::Future;

use sqlx::PgPool;
use zoo_product_form_core::ServiceId;

use super::RepositoryError;
use crate::models::{Service, ServiceDraft};

const SERVICE_COLUMNS: &str =
    "id, title, description, image_url, remote_ref, created_at, updated_at";

/// Persistent record store for services.
pub trait ServiceStore: Send + Sync {
    /// Insert a new service.
    fn create(
        &self,
        draft: &ServiceDraft,
    ) -> impl Future<Output = Result<Service, RepositoryError>> + Send;

    /// Fetch one service, `RepositoryError::NotFound` if absent.
    fn get(&self, id: ServiceId) -> impl Future<Output = Result<Service, RepositoryError>> + Send;

    /// All services, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Service>, RepositoryError>> + Send;

    /// Replace the editable fields and refresh `updated_at`.
    fn update(
        &self,
        id: ServiceId,
        draft: &ServiceDraft,
    ) -> impl Future<Output = Result<Service, RepositoryError>> + Send;

    /// Remove a service, `RepositoryError::NotFound` if absent.
    fn delete(&self, id: ServiceId) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Record the metaobject GID for a service.
    ///
    /// Set-once: if a reference is already stored it is kept, and the
    /// returned service carries the stored value.
    fn set_remote_ref(
        &self,
        id: ServiceId,
        remote_ref: &str,
    ) -> impl Future<Output = Result<Service, RepositoryError>> + Send;
}

/// `PostgreSQL`-backed service store.
#[derive(Clone, Copy)]
pub struct ServiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceRepository<'a> {
    /// Create a new service repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Number of stored services.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

impl ServiceStore for ServiceRepository<'_> {
    async fn create(&self, draft: &ServiceDraft) -> Result<Service, RepositoryError> {
        let service = sqlx::query_as::<_, Service>(&format!(
            r"
            INSERT INTO services (title, description, image_url)
            VALUES ($1, $2, $3)
            RETURNING {SERVICE_COLUMNS}
            "
        ))
        .bind(draft.title())
        .bind(draft.description())
        .bind(draft.image_url())
        .fetch_one(self.pool)
        .await?;

        Ok(service)
    }

    async fn get(&self, id: ServiceId) -> Result<Service, RepositoryError> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Service>, RepositoryError> {
        let services = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(services)
    }

    async fn update(&self, id: ServiceId, draft: &ServiceDraft) -> Result<Service, RepositoryError> {
        sqlx::query_as::<_, Service>(&format!(
            r"
            UPDATE services
            SET title = $2, description = $3, image_url = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {SERVICE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(draft.title())
        .bind(draft.description())
        .bind(draft.image_url())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: ServiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_remote_ref(
        &self,
        id: ServiceId,
        remote_ref: &str,
    ) -> Result<Service, RepositoryError> {
        sqlx::query_as::<_, Service>(&format!(
            r"
            UPDATE services
            SET remote_ref = COALESCE(remote_ref, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING {SERVICE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(remote_ref)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
