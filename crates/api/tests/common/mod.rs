//! Common test utilities for integration tests.
//!
//! Builds the full router on top of the in-memory request store, with HS256
//! tokens minted locally, so no database is required.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use civic_portal_api::{
    app::{create_app, AppState, Stores},
    config::{
        Config, DatabaseConfig, JwtAuthConfig, LoggingConfig, NotificationConfig, SecurityConfig,
        ServerConfig, StoreBackend, StoreConfig,
    },
};
use domain::models::Service;
use domain::services::MockNotificationService;
use domain::store::{InMemoryRequestStore, InMemoryServiceCatalog};
use rust_decimal::Decimal;
use serde_json::Value;
use shared::jwt::{JwtConfig, TokenSubject};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Test configuration using the memory backend and a shared JWT secret.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            hsts_enabled: false,
        },
        jwt: JwtAuthConfig {
            private_key: String::new(),
            public_key: String::new(),
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_secs: 3600,
            leeway_secs: 30,
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            services: vec![],
        },
        notifications: NotificationConfig { enabled: true },
    }
}

/// A running app plus handles on its backing state.
pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<InMemoryServiceCatalog>,
    pub store: Arc<InMemoryRequestStore>,
    pub notifier: MockNotificationService,
    pub jwt: JwtConfig,
    /// Department owning `service`.
    pub department_id: Uuid,
    /// A second department with no services of its own.
    pub other_department_id: Uuid,
    /// Fee 50.00, owned by `department_id`.
    pub service: Service,
}

impl TestApp {
    pub async fn new() -> Self {
        let department_id = Uuid::new_v4();
        let service = Service {
            id: Uuid::new_v4(),
            name: "Building permit".to_string(),
            department_id,
            fee: Decimal::new(5000, 2),
        };

        let catalog = Arc::new(InMemoryServiceCatalog::new());
        catalog.insert_service(service.clone()).await;
        let store = Arc::new(InMemoryRequestStore::new(catalog.clone()));
        let notifier = MockNotificationService::new();

        let stores = Stores {
            requests: store.clone(),
            catalog: catalog.clone(),
        };
        let state = AppState::with_notifier(test_config(), stores, Arc::new(notifier.clone()))
            .expect("Failed to build app state");

        Self {
            router: create_app(state),
            catalog,
            store,
            notifier,
            jwt: JwtConfig::from_secret(TEST_JWT_SECRET, 3600, 30).unwrap(),
            department_id,
            other_department_id: Uuid::new_v4(),
            service,
        }
    }

    fn token(&self, user_id: Uuid, role: &str, department_id: Option<Uuid>) -> String {
        let (token, _) = self
            .jwt
            .generate_access_token(&TokenSubject {
                user_id,
                role: role.to_string(),
                department_id,
            })
            .unwrap();
        token
    }

    pub fn citizen(&self) -> TestUser {
        let id = Uuid::new_v4();
        TestUser {
            id,
            token: self.token(id, "citizen", None),
        }
    }

    pub fn officer(&self) -> TestUser {
        self.officer_in(self.department_id)
    }

    pub fn officer_in(&self, department_id: Uuid) -> TestUser {
        let id = Uuid::new_v4();
        TestUser {
            id,
            token: self.token(id, "officer", Some(department_id)),
        }
    }

    pub fn head(&self) -> TestUser {
        let id = Uuid::new_v4();
        TestUser {
            id,
            token: self.token(id, "headdepartment", Some(self.department_id)),
        }
    }

    pub fn admin(&self) -> TestUser {
        let id = Uuid::new_v4();
        TestUser {
            id,
            token: self.token(id, "admin", None),
        }
    }
}

/// An identity with a valid access token.
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// Helper to create an authenticated JSON request.
pub fn json_request(method: Method, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Helper to create an authenticated request without a body.
pub fn authed_request(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
