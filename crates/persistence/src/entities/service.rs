//! Service catalog entity (database row mapping).

use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the services table.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceEntity {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
    pub fee: Decimal,
}

impl From<ServiceEntity> for domain::models::Service {
    fn from(entity: ServiceEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            department_id: entity.department_id,
            fee: entity.fee,
        }
    }
}
