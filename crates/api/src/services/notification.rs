//! Decision notifications written to the structured log.
//!
//! Each event is emitted on the `civic_portal::notifications` target with the
//! payload serialized as JSON, so a log shipper can forward it to the citizen
//! messaging system.

use async_trait::async_trait;
use domain::services::{NotificationResult, NotificationService, RequestDecidedPayload};

pub const NOTIFICATION_TARGET: &str = "civic_portal::notifications";

#[derive(Debug, Clone)]
pub struct LogNotificationService {
    enabled: bool,
}

impl LogNotificationService {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl NotificationService for LogNotificationService {
    async fn send_request_decided(&self, payload: RequestDecidedPayload) -> NotificationResult {
        if !self.enabled {
            return NotificationResult::Skipped;
        }

        match serde_json::to_string(&payload) {
            Ok(body) => {
                tracing::info!(
                    target: NOTIFICATION_TARGET,
                    request_id = %payload.request_id,
                    citizen_id = %payload.citizen_id,
                    payload = %body,
                    "request_decided"
                );
                NotificationResult::Sent
            }
            Err(e) => NotificationResult::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::RequestStatus;
    use uuid::Uuid;

    fn payload() -> RequestDecidedPayload {
        RequestDecidedPayload::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            RequestStatus::Rejected,
            Uuid::new_v4(),
        )
    }

    #[tokio::test]
    async fn test_disabled_skips() {
        let service = LogNotificationService::new(false);
        assert!(matches!(
            service.send_request_decided(payload()).await,
            NotificationResult::Skipped
        ));
    }

    #[tokio::test]
    async fn test_enabled_sends() {
        let service = LogNotificationService::new(true);
        assert!(matches!(
            service.send_request_decided(payload()).await,
            NotificationResult::Sent
        ));
    }
}
