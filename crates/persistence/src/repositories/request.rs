//! Service request repository for database operations.
//!
//! Every state change is a single `UPDATE ... WHERE <guard> RETURNING`
//! statement, so concurrent callers across processes cannot both apply.

use async_trait::async_trait;
use domain::error::StoreError;
use domain::models::{
    NewServiceRequest, OfficerWorkload, PaymentStatus, RequestFilter, RequestScope, RequestStats,
    RequestStatus, ServiceRequest,
};
use domain::store::{AssignOutcome, RequestStore, TransitionOutcome};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    OfficerWorkloadEntity, PaymentStatusDb, RequestStatsEntity, RequestStatusDb,
    ServiceRequestEntity,
};
use crate::metrics::{record_pool_metrics, QueryTimer};

/// Columns of a request row joined with its service (`r` and `s`).
const REQUEST_COLUMNS: &str = "r.id, r.description, r.status, r.service_id, s.department_id, \
     r.citizen_id, r.reviewed_by, r.payment_status, r.payment_amount, r.created_at, r.updated_at";

/// Binds the values referenced by `build_where`, in the same order.
macro_rules! bind_scope_and_filter {
    ($query:expr, $scope:expr, $filter:expr) => {{
        let mut query = $query;
        match $scope {
            RequestScope::Department(department_id) => query = query.bind(department_id),
            RequestScope::Citizen(citizen_id) => query = query.bind(citizen_id),
            RequestScope::All => {}
        }
        if let Some(status) = $filter.status {
            query = query.bind(RequestStatusDb::from(status));
        }
        if let Some(service_id) = $filter.service_id {
            query = query.bind(service_id);
        }
        if let Some(department_id) = $filter.department_id {
            query = query.bind(department_id);
        }
        if let Some(from) = $filter.created_from {
            query = query.bind(from);
        }
        if let Some(to) = $filter.created_to {
            query = query.bind(to);
        }
        if let Some(name) = $filter.citizen_name.as_deref() {
            query = query.bind(name_pattern(name));
        }
        query
    }};
}

/// Repository for service request database operations.
#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    /// Creates a new RequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_request_by_id");
        let sql = format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM requests r
            JOIN services s ON s.id = r.service_id
            WHERE r.id = $1
            "#
        );
        let result = sqlx::query_as::<_, ServiceRequestEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// List requests in a scope, newest first.
    pub async fn list_scoped(
        &self,
        scope: RequestScope,
        filter: &RequestFilter,
    ) -> Result<Vec<ServiceRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_requests");
        let (where_clause, param_count) = build_where(scope, filter);

        let mut sql = format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM requests r
            JOIN services s ON s.id = r.service_id
            WHERE {where_clause}
            ORDER BY r.created_at DESC, r.id
            "#
        );
        if filter.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${}", param_count + 1));
        }
        if filter.offset.is_some() {
            let position = param_count + 1 + usize::from(filter.limit.is_some());
            sql.push_str(&format!(" OFFSET ${}", position));
        }

        let mut query = sqlx::query_as::<_, ServiceRequestEntity>(&sql);
        query = bind_scope_and_filter!(query, scope, filter);
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.bind(offset);
        }

        let result = query.fetch_all(&self.pool).await;
        timer.record();
        result
    }

    /// Count requests in a scope.
    pub async fn count_scoped(
        &self,
        scope: RequestScope,
        filter: &RequestFilter,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_requests");
        let (where_clause, _) = build_where(scope, filter);
        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM requests r
            JOIN services s ON s.id = r.service_id
            WHERE {where_clause}
            "#
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        query = bind_scope_and_filter!(query, scope, filter);

        let result = query.fetch_one(&self.pool).await;
        timer.record();
        result
    }

    /// Create a request in `submitted` / `pending` state.
    pub async fn create(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_request");
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO requests (citizen_id, service_id, description, payment_amount)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {REQUEST_COLUMNS}
            FROM inserted r
            JOIN services s ON s.id = r.service_id
            "#
        );
        let result = sqlx::query_as::<_, ServiceRequestEntity>(&sql)
            .bind(request.citizen_id)
            .bind(request.service_id)
            .bind(request.description.as_str())
            .bind(request.payment_amount)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Claim an unassigned, submitted request for an officer.
    ///
    /// Returns `None` when another officer got there first or the request has
    /// already left `submitted`.
    pub async fn claim(
        &self,
        id: Uuid,
        officer_id: Uuid,
    ) -> Result<Option<ServiceRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("claim_request");
        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE requests
                SET reviewed_by = $2, status = 'under_review', updated_at = NOW()
                WHERE id = $1 AND reviewed_by IS NULL AND status = 'submitted'
                RETURNING *
            )
            SELECT {REQUEST_COLUMNS}
            FROM updated r
            JOIN services s ON s.id = r.service_id
            "#
        );
        let result = sqlx::query_as::<_, ServiceRequestEntity>(&sql)
            .bind(id)
            .bind(officer_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Move a request from `from` to `to` if it is still held by `officer_id`.
    pub async fn transition(
        &self,
        id: Uuid,
        officer_id: Uuid,
        from: RequestStatusDb,
        to: RequestStatusDb,
    ) -> Result<Option<ServiceRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("transition_request");
        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE requests
                SET status = $4, reviewed_by = $2, updated_at = NOW()
                WHERE id = $1 AND reviewed_by = $2 AND status = $3
                RETURNING *
            )
            SELECT {REQUEST_COLUMNS}
            FROM updated r
            JOIN services s ON s.id = r.service_id
            "#
        );
        let result = sqlx::query_as::<_, ServiceRequestEntity>(&sql)
            .bind(id)
            .bind(officer_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Update the payment status of a request.
    pub async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatusDb,
    ) -> Result<Option<ServiceRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_request_payment_status");
        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE requests
                SET payment_status = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {REQUEST_COLUMNS}
            FROM updated r
            JOIN services s ON s.id = r.service_id
            "#
        );
        let result = sqlx::query_as::<_, ServiceRequestEntity>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Review counts per officer and department head of a department.
    pub async fn workload_for_department(
        &self,
        department_id: Uuid,
    ) -> Result<Vec<OfficerWorkloadEntity>, sqlx::Error> {
        let timer = QueryTimer::new("officer_workload");
        let result = sqlx::query_as::<_, OfficerWorkloadEntity>(
            r#"
            SELECT u.id AS officer_id,
                   COUNT(r.id) FILTER (WHERE r.status = 'under_review') AS under_review,
                   COUNT(r.id) FILTER (WHERE r.status = 'approved') AS approved,
                   COUNT(r.id) FILTER (WHERE r.status = 'rejected') AS rejected
            FROM users u
            LEFT JOIN requests r
                   ON r.reviewed_by = u.id
                  AND r.service_id IN (SELECT id FROM services WHERE department_id = $1)
            WHERE u.department_id = $1
              AND u.role IN ('officer', 'headdepartment')
            GROUP BY u.id
            ORDER BY u.id
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Portal-wide totals and revenue from paid requests.
    pub async fn get_stats(&self) -> Result<RequestStatsEntity, sqlx::Error> {
        let timer = QueryTimer::new("request_stats");
        let result = sqlx::query_as::<_, RequestStatsEntity>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'submitted') AS submitted,
                   COUNT(*) FILTER (WHERE status = 'under_review') AS under_review,
                   COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                   COUNT(*) FILTER (WHERE status = 'rejected') AS rejected,
                   COALESCE(SUM(payment_amount) FILTER (WHERE payment_status = 'paid'), 0) AS revenue
            FROM requests
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Build the WHERE clause for a scoped, filtered listing.
///
/// Returns the clause and the number of positional parameters it uses.
fn build_where(scope: RequestScope, filter: &RequestFilter) -> (String, usize) {
    let mut conditions = vec!["TRUE".to_string()];
    let mut param_count = 0;

    match scope {
        RequestScope::Department(_) => {
            param_count += 1;
            conditions.push(format!("s.department_id = ${}", param_count));
        }
        RequestScope::Citizen(_) => {
            param_count += 1;
            conditions.push(format!("r.citizen_id = ${}", param_count));
        }
        RequestScope::All => {}
    }

    if filter.status.is_some() {
        param_count += 1;
        conditions.push(format!("r.status = ${}", param_count));
    }

    if filter.service_id.is_some() {
        param_count += 1;
        conditions.push(format!("r.service_id = ${}", param_count));
    }

    if filter.department_id.is_some() {
        param_count += 1;
        conditions.push(format!("s.department_id = ${}", param_count));
    }

    if filter.created_from.is_some() {
        param_count += 1;
        conditions.push(format!("r.created_at >= ${}", param_count));
    }

    if filter.created_to.is_some() {
        param_count += 1;
        conditions.push(format!("r.created_at <= ${}", param_count));
    }

    if filter.citizen_name.is_some() {
        param_count += 1;
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM users u WHERE u.id = r.citizen_id AND u.display_name ILIKE ${})",
            param_count
        ));
    }

    (conditions.join(" AND "), param_count)
}

/// `ILIKE` pattern matching `name` anywhere, with wildcards in it escaped.
fn name_pattern(name: &str) -> String {
    let mut pattern = String::with_capacity(name.len() + 2);
    pattern.push('%');
    for c in name.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Foreign key violations mean the request referenced a missing service or user.
fn store_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.code().as_deref() == Some("23503") {
            return StoreError::MissingReference(db_err.message().to_string());
        }
    }
    tracing::error!(error = %err, "Request store query failed");
    StoreError::Database(err.to_string())
}

#[async_trait]
impl RequestStore for RequestRepository {
    async fn get(&self, id: Uuid) -> Result<Option<ServiceRequest>, StoreError> {
        Ok(self.find_by_id(id).await.map_err(store_error)?.map(Into::into))
    }

    async fn list(
        &self,
        scope: RequestScope,
        filter: &RequestFilter,
    ) -> Result<Vec<ServiceRequest>, StoreError> {
        let entities = self.list_scoped(scope, filter).await.map_err(store_error)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn count(&self, scope: RequestScope, filter: &RequestFilter) -> Result<i64, StoreError> {
        self.count_scoped(scope, filter).await.map_err(store_error)
    }

    async fn insert(&self, request: NewServiceRequest) -> Result<ServiceRequest, StoreError> {
        Ok(self.create(&request).await.map_err(store_error)?.into())
    }

    async fn conditional_assign(
        &self,
        id: Uuid,
        officer_id: Uuid,
    ) -> Result<AssignOutcome, StoreError> {
        Ok(match self.claim(id, officer_id).await.map_err(store_error)? {
            Some(entity) => AssignOutcome::Assigned(entity.into()),
            None => AssignOutcome::NotApplied,
        })
    }

    async fn conditional_transition(
        &self,
        id: Uuid,
        officer_id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<TransitionOutcome, StoreError> {
        let updated = self
            .transition(id, officer_id, from.into(), to.into())
            .await
            .map_err(store_error)?;
        Ok(match updated {
            Some(entity) => TransitionOutcome::Applied(entity.into()),
            None => TransitionOutcome::Rejected,
        })
    }

    async fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<ServiceRequest>, StoreError> {
        Ok(self
            .update_payment_status(id, status.into())
            .await
            .map_err(store_error)?
            .map(Into::into))
    }

    async fn officer_workload(
        &self,
        department_id: Uuid,
    ) -> Result<Vec<OfficerWorkload>, StoreError> {
        let rows = self
            .workload_for_department(department_id)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn stats(&self) -> Result<RequestStats, StoreError> {
        Ok(self.get_stats().await.map_err(store_error)?.into())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let timer = QueryTimer::new("ping");
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        timer.record();
        record_pool_metrics(&self.pool);
        result.map(|_| ()).map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_build_where_department_scope() {
        let (clause, count) = build_where(
            RequestScope::Department(Uuid::new_v4()),
            &RequestFilter {
                status: Some(RequestStatus::UnderReview),
                ..Default::default()
            },
        );
        assert_eq!(clause, "TRUE AND s.department_id = $1 AND r.status = $2");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_build_where_admin_filters() {
        let (clause, count) = build_where(
            RequestScope::All,
            &RequestFilter {
                service_id: Some(Uuid::new_v4()),
                department_id: Some(Uuid::new_v4()),
                created_from: Some(Utc::now()),
                created_to: Some(Utc::now()),
                ..Default::default()
            },
        );
        assert_eq!(
            clause,
            "TRUE AND r.service_id = $1 AND s.department_id = $2 \
             AND r.created_at >= $3 AND r.created_at <= $4"
        );
        assert_eq!(count, 4);
    }

    #[test]
    fn test_build_where_citizen_name() {
        let (clause, count) = build_where(
            RequestScope::Department(Uuid::new_v4()),
            &RequestFilter {
                status: Some(RequestStatus::Submitted),
                citizen_name: Some("novak".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(
            clause,
            "TRUE AND s.department_id = $1 AND r.status = $2 AND EXISTS \
             (SELECT 1 FROM users u WHERE u.id = r.citizen_id AND u.display_name ILIKE $3)"
        );
        assert_eq!(count, 3);
    }

    #[test]
    fn test_name_pattern_escapes_wildcards() {
        assert_eq!(name_pattern("Novak"), "%Novak%");
        assert_eq!(name_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }

    #[test]
    fn test_build_where_citizen_scope_unfiltered() {
        let (clause, count) =
            build_where(RequestScope::Citizen(Uuid::new_v4()), &RequestFilter::default());
        assert_eq!(clause, "TRUE AND r.citizen_id = $1");
        assert_eq!(count, 1);
    }
}
