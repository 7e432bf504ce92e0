//! In-memory store for development and tests.
//!
//! Each compare-and-set runs under a single write lock, which gives the same
//! single-winner guarantee as the conditional `UPDATE` of the database store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AssignOutcome, RequestStore, ServiceCatalog, TransitionOutcome};
use crate::error::StoreError;
use crate::models::{
    NewServiceRequest, OfficerWorkload, PaymentStatus, RequestFilter, RequestScope, RequestStats,
    RequestStatus, Service, ServiceRequest,
};

/// Service catalog held in memory.
#[derive(Debug, Default)]
pub struct InMemoryServiceCatalog {
    services: RwLock<HashMap<Uuid, Service>>,
}

impl InMemoryServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_service(&self, service: Service) {
        self.services.write().await.insert(service.id, service);
    }

    /// Change a service's fee. Returns false if the service is unknown.
    pub async fn set_fee(&self, service_id: Uuid, fee: Decimal) -> bool {
        match self.services.write().await.get_mut(&service_id) {
            Some(service) => {
                service.fee = fee;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryServiceCatalog {
    async fn find_service(&self, id: Uuid) -> Result<Option<Service>, StoreError> {
        Ok(self.services.read().await.get(&id).cloned())
    }
}

/// Row as stored; the department is resolved through the catalog on read.
#[derive(Debug, Clone)]
struct StoredRequest {
    id: Uuid,
    description: String,
    status: RequestStatus,
    service_id: Uuid,
    citizen_id: Uuid,
    reviewed_by: Option<Uuid>,
    payment_status: PaymentStatus,
    payment_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoredRequest {
    fn resolve(&self, services: &HashMap<Uuid, Service>) -> Result<ServiceRequest, StoreError> {
        let service = services.get(&self.service_id).ok_or_else(|| {
            StoreError::MissingReference(format!("service {}", self.service_id))
        })?;

        Ok(ServiceRequest {
            id: self.id,
            description: self.description.clone(),
            status: self.status,
            service_id: self.service_id,
            department_id: service.department_id,
            citizen_id: self.citizen_id,
            reviewed_by: self.reviewed_by,
            payment_status: self.payment_status,
            payment_amount: self.payment_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Request store held in memory, sharing its catalog for department lookups.
#[derive(Debug)]
pub struct InMemoryRequestStore {
    catalog: Arc<InMemoryServiceCatalog>,
    requests: RwLock<HashMap<Uuid, StoredRequest>>,
    officers: RwLock<HashMap<Uuid, Uuid>>,
    citizens: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryRequestStore {
    pub fn new(catalog: Arc<InMemoryServiceCatalog>) -> Self {
        Self {
            catalog,
            requests: RwLock::new(HashMap::new()),
            officers: RwLock::new(HashMap::new()),
            citizens: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> Arc<InMemoryServiceCatalog> {
        self.catalog.clone()
    }

    /// Register an officer so they show up in workload views before their
    /// first review.
    pub async fn register_officer(&self, officer_id: Uuid, department_id: Uuid) {
        self.officers.write().await.insert(officer_id, department_id);
    }

    /// Forget an officer. Requests they reviewed keep their status but lose
    /// the reviewer, as the `reviewed_by` foreign key does on delete.
    pub async fn remove_officer(&self, officer_id: Uuid) {
        let mut requests = self.requests.write().await;
        self.officers.write().await.remove(&officer_id);
        for stored in requests.values_mut() {
            if stored.reviewed_by == Some(officer_id) {
                stored.reviewed_by = None;
                stored.updated_at = Utc::now();
            }
        }
    }

    /// Record a citizen's display name for name-filtered listings.
    pub async fn register_citizen(&self, citizen_id: Uuid, name: impl Into<String>) {
        self.citizens.write().await.insert(citizen_id, name.into());
    }

    async fn resolved(
        &self,
        scope: RequestScope,
        filter: &RequestFilter,
    ) -> Result<Vec<ServiceRequest>, StoreError> {
        let requests = self.requests.read().await;
        let services = self.catalog.services.read().await;
        let citizens = self.citizens.read().await;
        let name = filter.citizen_name.as_deref().map(str::to_lowercase);

        let mut matching = Vec::new();
        for stored in requests.values() {
            let request = stored.resolve(&services)?;
            let name_matches = name.as_deref().map_or(true, |needle| {
                citizens
                    .get(&request.citizen_id)
                    .is_some_and(|citizen| citizen.to_lowercase().contains(needle))
            });
            if scope.contains(&request) && filter.matches(&request) && name_matches {
                matching.push(request);
            }
        }

        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matching)
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn get(&self, id: Uuid) -> Result<Option<ServiceRequest>, StoreError> {
        let requests = self.requests.read().await;
        let services = self.catalog.services.read().await;
        requests.get(&id).map(|r| r.resolve(&services)).transpose()
    }

    async fn list(
        &self,
        scope: RequestScope,
        filter: &RequestFilter,
    ) -> Result<Vec<ServiceRequest>, StoreError> {
        let matching = self.resolved(scope, filter).await?;
        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, scope: RequestScope, filter: &RequestFilter) -> Result<i64, StoreError> {
        Ok(self.resolved(scope, filter).await?.len() as i64)
    }

    async fn insert(&self, request: NewServiceRequest) -> Result<ServiceRequest, StoreError> {
        let mut requests = self.requests.write().await;
        let services = self.catalog.services.read().await;

        if !services.contains_key(&request.service_id) {
            return Err(StoreError::MissingReference(format!(
                "service {}",
                request.service_id
            )));
        }

        let now = Utc::now();
        let stored = StoredRequest {
            id: Uuid::new_v4(),
            description: request.description,
            status: RequestStatus::Submitted,
            service_id: request.service_id,
            citizen_id: request.citizen_id,
            reviewed_by: None,
            payment_status: PaymentStatus::Pending,
            payment_amount: request.payment_amount,
            created_at: now,
            updated_at: now,
        };
        let resolved = stored.resolve(&services)?;
        requests.insert(stored.id, stored);
        Ok(resolved)
    }

    async fn conditional_assign(
        &self,
        id: Uuid,
        officer_id: Uuid,
    ) -> Result<AssignOutcome, StoreError> {
        let mut requests = self.requests.write().await;
        let services = self.catalog.services.read().await;

        match requests.get_mut(&id) {
            Some(stored)
                if stored.reviewed_by.is_none() && stored.status == RequestStatus::Submitted =>
            {
                stored.reviewed_by = Some(officer_id);
                stored.status = RequestStatus::UnderReview;
                stored.updated_at = Utc::now();
                Ok(AssignOutcome::Assigned(stored.resolve(&services)?))
            }
            _ => Ok(AssignOutcome::NotApplied),
        }
    }

    async fn conditional_transition(
        &self,
        id: Uuid,
        officer_id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<TransitionOutcome, StoreError> {
        let mut requests = self.requests.write().await;
        let services = self.catalog.services.read().await;

        match requests.get_mut(&id) {
            Some(stored) if stored.status == from && stored.reviewed_by == Some(officer_id) => {
                stored.status = to;
                stored.reviewed_by = Some(officer_id);
                stored.updated_at = Utc::now();
                Ok(TransitionOutcome::Applied(stored.resolve(&services)?))
            }
            _ => Ok(TransitionOutcome::Rejected),
        }
    }

    async fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<ServiceRequest>, StoreError> {
        let mut requests = self.requests.write().await;
        let services = self.catalog.services.read().await;

        match requests.get_mut(&id) {
            Some(stored) => {
                stored.payment_status = status;
                stored.updated_at = Utc::now();
                stored.resolve(&services).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn officer_workload(
        &self,
        department_id: Uuid,
    ) -> Result<Vec<OfficerWorkload>, StoreError> {
        let in_department = self
            .resolved(RequestScope::Department(department_id), &RequestFilter::default())
            .await?;

        let mut workload: BTreeMap<Uuid, OfficerWorkload> = self
            .officers
            .read()
            .await
            .iter()
            .filter(|(_, dept)| **dept == department_id)
            .map(|(officer_id, _)| (*officer_id, empty_workload(*officer_id)))
            .collect();

        for request in in_department {
            let Some(officer_id) = request.reviewed_by else {
                continue;
            };
            let entry = workload
                .entry(officer_id)
                .or_insert_with(|| empty_workload(officer_id));
            match request.status {
                RequestStatus::UnderReview => entry.under_review += 1,
                RequestStatus::Approved => entry.approved += 1,
                RequestStatus::Rejected => entry.rejected += 1,
                RequestStatus::Submitted => {}
            }
        }

        Ok(workload.into_values().collect())
    }

    async fn stats(&self) -> Result<RequestStats, StoreError> {
        let requests = self.requests.read().await;

        let mut stats = RequestStats::default();
        for stored in requests.values() {
            stats.total += 1;
            match stored.status {
                RequestStatus::Submitted => stats.submitted += 1,
                RequestStatus::UnderReview => stats.under_review += 1,
                RequestStatus::Approved => stats.approved += 1,
                RequestStatus::Rejected => stats.rejected += 1,
            }
            if stored.payment_status == PaymentStatus::Paid {
                stats.revenue += stored.payment_amount;
            }
        }
        Ok(stats)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn empty_workload(officer_id: Uuid) -> OfficerWorkload {
    OfficerWorkload {
        officer_id,
        under_review: 0,
        approved: 0,
        rejected: 0,
    }
}
