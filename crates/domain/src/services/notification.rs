//! Notification service for review decisions.
//!
//! Delivery itself is an external collaborator; the workflow only hands over a
//! payload once a decision is committed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::RequestStatus;

/// Notification type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    RequestDecided,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::RequestDecided => write!(f, "request_decided"),
        }
    }
}

/// Payload sent to the citizen when a reviewer approves or rejects a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDecidedPayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub request_id: Uuid,
    pub citizen_id: Uuid,
    pub status: RequestStatus,
    pub decided_by: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl RequestDecidedPayload {
    pub fn new(request_id: Uuid, citizen_id: Uuid, status: RequestStatus, decided_by: Uuid) -> Self {
        Self {
            notification_type: NotificationType::RequestDecided,
            request_id,
            citizen_id,
            status,
            decided_by,
            timestamp: Utc::now(),
        }
    }
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationResult {
    /// Notification was handed to the delivery channel.
    Sent,
    /// Notification sending failed (but was non-blocking).
    Failed(String),
    /// Notification was skipped (delivery disabled).
    Skipped,
}

/// Notification service trait for review decisions.
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_request_decided(&self, payload: RequestDecidedPayload) -> NotificationResult;
}

/// Mock notification service for development and testing.
///
/// Logs and records notifications but doesn't deliver them.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationService {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<RequestDecidedPayload>>>,
}

impl MockNotificationService {
    /// Create a new mock notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock service that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Payloads accepted so far.
    pub async fn sent(&self) -> Vec<RequestDecidedPayload> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn send_request_decided(&self, payload: RequestDecidedPayload) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(
                request_id = %payload.request_id,
                "Mock notification service simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            request_id = %payload.request_id,
            citizen_id = %payload.citizen_id,
            status = %payload.status,
            decided_by = %payload.decided_by,
            "Mock: Would send request_decided notification"
        );

        self.sent.lock().await.push(payload);
        NotificationResult::Sent
    }
}
