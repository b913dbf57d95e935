#![allow(dead_code)]

use grading_service::config::{CorsConfig, GradingConfig, MongoConfig, StoreBackend, StoreConfig};
use grading_service::startup::Application;
use service_core::config::Config as CoreConfig;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub config: GradingConfig,
}

pub fn test_config(backend: StoreBackend) -> GradingConfig {
    GradingConfig {
        common: CoreConfig { port: 0 }, // Random port for testing
        store: StoreConfig { backend },
        mongodb: MongoConfig {
            uri: std::env::var("TEST_MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: format!("grading_test_{}", Uuid::new_v4().simple()),
        },
        cors: CorsConfig {
            allowed_origins: vec![],
        },
        log_level: "info".to_string(),
        otlp_endpoint: None,
    }
}

impl TestApp {
    /// Spawns the service on a random port backed by the in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(StoreBackend::Memory)).await
    }

    pub async fn spawn_with(config: GradingConfig) -> Self {
        let app = Application::build(config.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            config,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .put(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn students(&self) -> Vec<serde_json::Value> {
        self.get("/students")
            .await
            .json()
            .await
            .expect("Failed to parse students")
    }

    pub async fn subjects(&self) -> Vec<serde_json::Value> {
        self.get("/subjects")
            .await
            .json()
            .await
            .expect("Failed to parse subjects")
    }
}
