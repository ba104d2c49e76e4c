//! wiremock-based Upsource mock server for testing.
//!
//! ```ignore
//! let mock = UpsourceMockServer::start().await;
//! mock.mock_result("getReviews", review_list_json(vec![])).await;
//!
//! let client = mock.client();
//! client.list_reviews(None).await?;
//!
//! assert_eq!(mock.received_bodies("getReviews").await.len(), 1);
//! ```
//!
//! Every mock only matches requests carrying the Basic credentials of
//! [`UpsourceMockServer::config`], so a missing or wrong auth header shows up
//! as an unmatched (HTTP 404) request.

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::client::UpsourceClient;
use crate::session::Session;
use crate::shared::config::{self, UpsConfig};

pub const LOGIN: &str = "alice";
pub const PASSWORD: &str = "secret";
/// `base64("alice:secret")`
const BASIC_AUTH: &str = "Basic YWxpY2U6c2VjcmV0";

pub struct UpsourceMockServer {
    server: MockServer,
}

impl UpsourceMockServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Config pointing at this server.
    pub fn config(&self) -> UpsConfig {
        UpsConfig {
            url: self.uri(),
            login: LOGIN.to_string(),
            password: PASSWORD.to_string(),
            project_id: "demo".to_string(),
            reviewers: Vec::new(),
        }
    }

    pub fn client(&self) -> UpsourceClient {
        UpsourceClient::new(self.config()).unwrap()
    }

    /// Session whose config file points at this server. Keep the returned
    /// directory alive for as long as the session is used.
    pub fn session(&self) -> (tempfile::TempDir, Session) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(config::CONFIG_FILE_NAME);
        config::save_new_config(&path, &self.config()).unwrap();
        (dir, Session::new(path))
    }

    fn rpc(operation: &str) -> wiremock::MockBuilder {
        Mock::given(method("POST"))
            .and(path(format!("/~rpc/{operation}")))
            .and(header("authorization", BASIC_AUTH))
            .and(header("content-type", "application/json"))
    }

    /// Respond to `operation` with `200 {"result": result}`.
    pub async fn mock_result(&self, operation: &str, result: Value) {
        self.mock_response(operation, 200, json!({ "result": result }))
            .await;
    }

    /// Respond with `{"result": result}` only to `operation` calls whose body
    /// contains `params`.
    pub async fn mock_result_for(&self, operation: &str, params: Value, result: Value) {
        Self::rpc(operation)
            .and(body_partial_json(params))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
            .mount(&self.server)
            .await;
    }

    /// Respond to `operation` with an arbitrary status and JSON body.
    pub async fn mock_response(&self, operation: &str, status: u16, body: Value) {
        Self::rpc(operation)
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Respond to `operation` with a non-JSON body.
    pub async fn mock_raw(&self, operation: &str, status: u16, body: &str) {
        Self::rpc(operation)
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Drop all mounted mocks and recorded requests.
    pub async fn reset(&self) {
        self.server.reset().await;
    }

    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// JSON bodies of every request made to `operation`, in order.
    pub async fn received_bodies(&self, operation: &str) -> Vec<Value> {
        let target = format!("/~rpc/{operation}");
        self.received_requests()
            .await
            .into_iter()
            .filter(|r| r.url.path() == target)
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}
