//! Read-side queries: scoped listings, single-request views and dashboards.

use std::sync::Arc;

use shared::pagination::{PageRequest, Pagination};
use tracing::warn;
use uuid::Uuid;

use super::authorization;
use crate::error::{ForbiddenReason, WorkflowError};
use crate::models::{
    Actor, DepartmentWorkloadResponse, ListRequestsResponse, RequestFilter, RequestStats,
    ServiceRequest,
};
use crate::store::RequestStore;

pub struct RequestQueries {
    store: Arc<dyn RequestStore>,
}

impl RequestQueries {
    pub fn new(store: Arc<dyn RequestStore>) -> Self {
        Self { store }
    }

    /// List the requests the actor may see, narrowed by `filter`.
    pub async fn list_for_actor(
        &self,
        actor: &Actor,
        requested_department: Option<Uuid>,
        filter: RequestFilter,
        page: PageRequest,
    ) -> Result<ListRequestsResponse, WorkflowError> {
        shared::validation::validate_date_range(filter.created_from, filter.created_to)
            .map_err(|_| WorkflowError::Validation("'from' must not be after 'to'".to_string()))?;

        let scope = authorization::listing_scope(actor, requested_department).map_err(|reason| {
            warn!(
                actor_id = %actor.id(),
                requested_department = ?requested_department,
                reason = %reason,
                "Listing denied"
            );
            WorkflowError::Forbidden(reason)
        })?;

        let total = self.store.count(scope, &filter).await?;
        let data = self
            .store
            .list(
                scope,
                &RequestFilter {
                    limit: Some(page.limit()),
                    offset: Some(page.offset()),
                    ..filter
                },
            )
            .await?;

        Ok(ListRequestsResponse {
            data,
            pagination: Pagination::new(page, total),
        })
    }

    /// Load a single request for display. Never changes its assignment.
    pub async fn get_for_actor(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> Result<ServiceRequest, WorkflowError> {
        let request = self
            .store
            .get(request_id)
            .await?
            .ok_or(WorkflowError::NotFound(request_id))?;

        authorization::check_read(actor, &request).map_err(|reason| {
            warn!(
                request_id = %request_id,
                actor_id = %actor.id(),
                reason = %reason,
                "Read denied"
            );
            WorkflowError::Forbidden(reason)
        })?;

        Ok(request)
    }

    /// Per-officer review counts. Heads see their own department; admins
    /// must name one.
    pub async fn department_workload(
        &self,
        actor: &Actor,
        requested_department: Option<Uuid>,
    ) -> Result<DepartmentWorkloadResponse, WorkflowError> {
        let department_id = match actor {
            Actor::DepartmentHead { department_id, .. } => match requested_department {
                Some(requested) if requested != *department_id => {
                    return Err(ForbiddenReason::CrossDepartment.into())
                }
                _ => *department_id,
            },
            Actor::Admin { .. } => requested_department.ok_or_else(|| {
                WorkflowError::Validation("department_id is required".to_string())
            })?,
            Actor::Citizen { .. } | Actor::Officer { .. } => {
                return Err(ForbiddenReason::RoleNotPermitted.into())
            }
        };

        let officers = self.store.officer_workload(department_id).await?;
        Ok(DepartmentWorkloadResponse {
            department_id,
            officers,
        })
    }

    /// Portal-wide totals and collected revenue.
    pub async fn stats(&self, actor: &Actor) -> Result<RequestStats, WorkflowError> {
        match actor {
            Actor::Admin { .. } => Ok(self.store.stats().await?),
            _ => Err(ForbiddenReason::RoleNotPermitted.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestStatus;
    use crate::services::testing::Fixture;
    use crate::services::AssignmentResolver;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_officer_listing_is_department_scoped() {
        let fx = Fixture::new().await;
        fx.submitted().await;
        fx.submitted().await;
        let queries = RequestQueries::new(fx.store.clone());

        let page = queries
            .list_for_actor(&fx.officer(), None, RequestFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 2);

        let foreign = fx.foreign_officer();
        let page = queries
            .list_for_actor(&foreign, None, RequestFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert!(page.data.is_empty());

        let result = queries
            .list_for_actor(
                &foreign,
                Some(fx.service.department_id),
                RequestFilter::default(),
                PageRequest::default(),
            )
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::Forbidden(ForbiddenReason::CrossDepartment))
        ));
    }

    #[tokio::test]
    async fn test_listing_filters_and_pages() {
        let fx = Fixture::new().await;
        let officer = fx.officer();
        let claimed = fx.submitted().await;
        for _ in 0..4 {
            fx.submitted().await;
        }
        AssignmentResolver::new(fx.store.clone())
            .open_for_review(&officer, claimed.id)
            .await
            .unwrap();
        let queries = RequestQueries::new(fx.store.clone());

        let under_review = RequestFilter {
            status: Some(RequestStatus::UnderReview),
            ..Default::default()
        };
        let page = queries
            .list_for_actor(&officer, None, under_review, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, claimed.id);

        let page = queries
            .list_for_actor(
                &officer,
                None,
                RequestFilter::default(),
                PageRequest::new(Some(2), Some(2)),
            )
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[tokio::test]
    async fn test_citizen_sees_only_own() {
        let fx = Fixture::new().await;
        let citizen_id = Uuid::new_v4();
        let own = fx.submitted_by(citizen_id).await;
        let other = fx.submitted().await;
        let citizen = Actor::Citizen { id: citizen_id };
        let queries = RequestQueries::new(fx.store.clone());

        let page = queries
            .list_for_actor(&citizen, None, RequestFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, own.id);

        assert!(queries.get_for_actor(&citizen, own.id).await.is_ok());
        let result = queries.get_for_actor(&citizen, other.id).await;
        assert!(matches!(
            result,
            Err(WorkflowError::Forbidden(ForbiddenReason::NotRequestOwner))
        ));
    }

    #[tokio::test]
    async fn test_cross_department_read_forbidden() {
        let fx = Fixture::new().await;
        let request = fx.submitted().await;
        let queries = RequestQueries::new(fx.store.clone());

        let result = queries.get_for_actor(&fx.foreign_officer(), request.id).await;
        assert!(matches!(
            result,
            Err(WorkflowError::Forbidden(ForbiddenReason::CrossDepartment))
        ));

        let admin = Actor::Admin { id: Uuid::new_v4() };
        assert!(queries.get_for_actor(&admin, request.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_date_range() {
        let fx = Fixture::new().await;
        fx.submitted().await;
        let admin = Actor::Admin { id: Uuid::new_v4() };
        let queries = RequestQueries::new(fx.store.clone());

        let window = RequestFilter {
            created_from: Some(Utc::now() - Duration::hours(1)),
            created_to: Some(Utc::now() + Duration::hours(1)),
            ..Default::default()
        };
        let page = queries
            .list_for_actor(&admin, None, window, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);

        let inverted = RequestFilter {
            created_from: Some(Utc::now()),
            created_to: Some(Utc::now() - Duration::days(1)),
            ..Default::default()
        };
        let result = queries
            .list_for_actor(&admin, None, inverted, PageRequest::default())
            .await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
    }

    #[tokio::test]
    async fn test_workload_access() {
        let fx = Fixture::new().await;
        let officer = fx.officer();
        let request = fx.submitted().await;
        AssignmentResolver::new(fx.store.clone())
            .open_for_review(&officer, request.id)
            .await
            .unwrap();
        let queries = RequestQueries::new(fx.store.clone());

        let workload = queries.department_workload(&fx.head(), None).await.unwrap();
        assert_eq!(workload.department_id, fx.service.department_id);
        assert_eq!(workload.officers.len(), 1);
        assert_eq!(workload.officers[0].officer_id, officer.id());
        assert_eq!(workload.officers[0].under_review, 1);

        let result = queries.department_workload(&officer, None).await;
        assert!(matches!(
            result,
            Err(WorkflowError::Forbidden(ForbiddenReason::RoleNotPermitted))
        ));

        let admin = Actor::Admin { id: Uuid::new_v4() };
        assert!(matches!(
            queries.department_workload(&admin, None).await,
            Err(WorkflowError::Validation(_))
        ));
        assert!(queries
            .department_workload(&admin, Some(fx.service.department_id))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_stats_admin_only() {
        let fx = Fixture::new().await;
        fx.submitted().await;
        let queries = RequestQueries::new(fx.store.clone());

        let stats = queries
            .stats(&Actor::Admin { id: Uuid::new_v4() })
            .await
            .unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.submitted, 1);

        assert!(matches!(
            queries.stats(&fx.head()).await,
            Err(WorkflowError::Forbidden(ForbiddenReason::RoleNotPermitted))
        ));
    }
}
