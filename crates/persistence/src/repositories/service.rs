//! Service catalog repository.

use async_trait::async_trait;
use domain::error::StoreError;
use domain::models::Service;
use domain::store::ServiceCatalog;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ServiceEntity;
use crate::metrics::QueryTimer;

/// Read-only repository for the services table.
#[derive(Clone)]
pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    /// Creates a new ServiceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a service by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_service_by_id");
        let result = sqlx::query_as::<_, ServiceEntity>(
            r#"
            SELECT id, name, department_id, fee
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[async_trait]
impl ServiceCatalog for ServiceRepository {
    async fn find_service(&self, id: Uuid) -> Result<Option<Service>, StoreError> {
        self.find_by_id(id)
            .await
            .map(|entity| entity.map(Into::into))
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
