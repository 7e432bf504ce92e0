//! Fixtures shared by the workflow service tests.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Actor, NewServiceRequest, Service, ServiceRequest};
use crate::store::{InMemoryRequestStore, InMemoryServiceCatalog, RequestStore};

pub struct Fixture {
    pub catalog: Arc<InMemoryServiceCatalog>,
    pub store: Arc<InMemoryRequestStore>,
    pub service: Service,
}

impl Fixture {
    pub async fn new() -> Self {
        let catalog = Arc::new(InMemoryServiceCatalog::new());
        let service = Service {
            id: Uuid::new_v4(),
            name: "Trade licence".to_string(),
            department_id: Uuid::new_v4(),
            fee: Decimal::new(5000, 2),
        };
        catalog.insert_service(service.clone()).await;
        let store = Arc::new(InMemoryRequestStore::new(catalog.clone()));

        Self {
            catalog,
            store,
            service,
        }
    }

    pub fn officer(&self) -> Actor {
        Actor::Officer {
            id: Uuid::new_v4(),
            department_id: self.service.department_id,
        }
    }

    pub fn head(&self) -> Actor {
        Actor::DepartmentHead {
            id: Uuid::new_v4(),
            department_id: self.service.department_id,
        }
    }

    pub fn foreign_officer(&self) -> Actor {
        Actor::Officer {
            id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
        }
    }

    pub async fn submitted(&self) -> ServiceRequest {
        self.submitted_by(Uuid::new_v4()).await
    }

    pub async fn submitted_by(&self, citizen_id: Uuid) -> ServiceRequest {
        self.store
            .insert(NewServiceRequest {
                citizen_id,
                service_id: self.service.id,
                description: "Renewal of a market stall licence".to_string(),
                payment_amount: self.service.fee,
            })
            .await
            .unwrap()
    }
}
