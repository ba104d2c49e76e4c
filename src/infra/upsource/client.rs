//! Upsource RPC client.
//!
//! Every operation is a single `POST <url>/~rpc/<operation>` carrying the
//! project id and HTTP Basic credentials. Nothing is retried.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{StatusCode, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{Result, UpsourceError};
use super::models::{
    BranchList, CloseOutcome, FindUsersResponse, ParticipantRef, Review, ReviewId, ReviewList,
    ReviewState, RevisionList, RoleInReview, User, UserInfoResponse,
};
use crate::shared::config::UpsConfig;

/// Result cap sent with every listing call.
pub const RESULT_LIMIT: u32 = 99;

const TIMEOUT_SECS: u64 = 30;

/// Characters escaped in URL path segments (RFC 3986 unreserved characters are kept).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Error object carried by the RPC envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl From<RpcError> for UpsourceError {
    fn from(err: RpcError) -> Self {
        UpsourceError::Server {
            code: err.code,
            message: err.message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    result: Option<Value>,
    error: Option<Value>,
}

/// Decoded RPC response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Ok(Value),
    Err(RpcError),
}

impl Envelope {
    /// Decode a response body. The error object may sit at the top level or
    /// inside the `result` payload.
    pub fn decode(body: Value) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_value(body)
            .map_err(|e| UpsourceError::InvalidResponse(format!("not an RPC envelope: {e}")))?;

        if let Some(error) = raw.error.filter(Value::is_object) {
            return Ok(Self::Err(decode_rpc_error(error)?));
        }

        let Some(result) = raw.result else {
            return Err(UpsourceError::InvalidResponse(
                "response has neither result nor error".to_string(),
            ));
        };

        match result.get("error").filter(|e| e.is_object()) {
            Some(error) => Ok(Self::Err(decode_rpc_error(error.clone())?)),
            None => Ok(Self::Ok(result)),
        }
    }

    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Ok(payload) => Ok(payload),
            Self::Err(err) => Err(err.into()),
        }
    }
}

fn decode_rpc_error(value: Value) -> Result<RpcError> {
    serde_json::from_value(value)
        .map_err(|e| UpsourceError::InvalidResponse(format!("malformed error object: {e}")))
}

#[derive(Serialize)]
struct ReviewsRequest {
    limit: u32,
    query: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewIdRequest<'a> {
    review_id: &'a str,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct CreateReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    revisions: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CloseReviewRequest {
    review_id: ReviewId,
    is_flagged: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantRequest<'a> {
    review_id: ReviewId,
    participant: &'a ParticipantRef,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    limit: u32,
}

#[derive(Serialize)]
struct PatternRequest<'a> {
    pattern: &'a str,
    limit: u32,
}

#[derive(Serialize)]
struct LimitRequest {
    limit: u32,
}

#[derive(Serialize)]
struct UserIdsRequest<'a> {
    ids: &'a [String],
}

/// Client bound to one config. Construct a new one whenever the config is reloaded.
#[derive(Debug, Clone)]
pub struct UpsourceClient {
    http: reqwest::Client,
    config: UpsConfig,
}

impl UpsourceClient {
    pub fn new(config: UpsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(UpsourceError::Unreachable)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &UpsConfig {
        &self.config
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/~rpc/{operation}", self.config.url.trim_end_matches('/'))
    }

    fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.config.login, self.config.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    fn review_id(&self, review_id: &str) -> ReviewId {
        ReviewId {
            project_id: self.config.project_id.clone(),
            review_id: review_id.to_string(),
        }
    }

    /// Build the request body: caller params plus the configured project id.
    /// The configured project id always wins over a caller-supplied one.
    pub fn request_body(&self, params: Value) -> Result<Value> {
        let mut body = match params {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(UpsourceError::InvalidArgument(format!(
                    "RPC params must be a JSON object, got {other}"
                )));
            }
        };
        body.insert(
            "projectId".to_string(),
            Value::String(self.config.project_id.clone()),
        );
        Ok(Value::Object(body))
    }

    /// Issue one RPC call and return the unwrapped `result` payload.
    pub async fn call_raw(&self, operation: &str, params: Value) -> Result<Value> {
        let body = self.request_body(params)?;

        let response = self
            .http
            .post(self.endpoint(operation))
            .header(header::AUTHORIZATION, self.authorization())
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(UpsourceError::Unreachable)?;

        let status = response.status();
        tracing::debug!(operation, status = status.as_u16(), "Upsource RPC call");

        let text = response.text().await.map_err(UpsourceError::Unreachable)?;

        if status != StatusCode::OK && status != StatusCode::CREATED {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| Envelope::decode(v).ok())
                .and_then(|envelope| match envelope {
                    Envelope::Err(err) => Some(err.message),
                    Envelope::Ok(_) => None,
                });
            return Err(UpsourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| UpsourceError::InvalidResponse(format!("{operation}: {e}")))?;
        Envelope::decode(value)?.into_result()
    }

    /// Typed wrapper over [`call_raw`](Self::call_raw).
    pub async fn call<P, T>(&self, operation: &str, params: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params = serde_json::to_value(params)
            .map_err(|e| UpsourceError::InvalidArgument(format!("{operation}: {e}")))?;
        let payload = self.call_raw(operation, params).await?;
        serde_json::from_value(payload)
            .map_err(|e| UpsourceError::InvalidResponse(format!("{operation}: {e}")))
    }

    /// List reviews matching a search query (e.g. `state: open`).
    /// An empty or absent query lists all reviews, capped at [`RESULT_LIMIT`].
    pub async fn list_reviews(&self, query: Option<&str>) -> Result<ReviewList> {
        let params = ReviewsRequest {
            limit: RESULT_LIMIT,
            query: query.unwrap_or_default().trim().to_string(),
        };
        self.call("getReviews", &params).await
    }

    pub async fn list_reviews_with_state(&self, state: Option<ReviewState>) -> Result<ReviewList> {
        let query = state.map(|s| format!("state: {}", s.as_query()));
        self.list_reviews(query.as_deref()).await
    }

    pub async fn review_details(&self, review_id: &str) -> Result<Review> {
        self.call("getReviewDetails", &ReviewIdRequest { review_id })
            .await
    }

    /// Create a review from a branch or from explicit revisions.
    /// When both are given the revisions are used and the branch is not sent.
    pub async fn create_review(&self, branch: Option<&str>, revisions: &[String]) -> Result<Review> {
        let request = create_review_request(branch, revisions)?;
        self.call("createReview", &request).await
    }

    /// Close a review. Closing a review that is already closed is not an error.
    pub async fn close_review(&self, review_id: &str) -> Result<CloseOutcome> {
        let params = CloseReviewRequest {
            review_id: self.review_id(review_id),
            is_flagged: true,
        };

        match self.call::<_, Value>("closeReview", &params).await {
            Ok(_) => Ok(CloseOutcome::Closed),
            Err(err @ UpsourceError::Server { .. }) => match self.review_details(review_id).await {
                Ok(review) if review.state == ReviewState::Closed => {
                    tracing::debug!(review_id, "review was already closed");
                    Ok(CloseOutcome::AlreadyClosed)
                }
                _ => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    pub async fn list_branches(&self, query: Option<&str>) -> Result<BranchList> {
        let params = QueryRequest {
            query: query.unwrap_or_default(),
            limit: RESULT_LIMIT,
        };
        self.call("getBranches", &params).await
    }

    pub async fn list_revisions(&self) -> Result<RevisionList> {
        self.call("getRevisionsList", &LimitRequest { limit: RESULT_LIMIT })
            .await
    }

    pub async fn find_users(&self, pattern: Option<&str>) -> Result<Vec<User>> {
        let params = PatternRequest {
            pattern: pattern.unwrap_or_default(),
            limit: RESULT_LIMIT,
        };
        let response: FindUsersResponse = self.call("findUsers", &params).await?;
        Ok(response.infos)
    }

    /// Fetch user details by id. No request is made for an empty id list.
    pub async fn user_info(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let response: UserInfoResponse = self.call("getUserInfo", &UserIdsRequest { ids }).await?;
        Ok(response.result)
    }

    pub async fn add_participant(
        &self,
        review_id: &str,
        user_id: &str,
        role: RoleInReview,
    ) -> Result<()> {
        let participant = ParticipantRef {
            user_id: user_id.to_string(),
            role,
        };
        let params = ParticipantRequest {
            review_id: self.review_id(review_id),
            participant: &participant,
        };
        self.call::<_, Value>("addParticipantToReview", &params)
            .await?;
        Ok(())
    }

    pub async fn remove_participant(
        &self,
        review_id: &str,
        participant: &ParticipantRef,
    ) -> Result<()> {
        let params = ParticipantRequest {
            review_id: self.review_id(review_id),
            participant,
        };
        self.call::<_, Value>("removeParticipantFromReview", &params)
            .await?;
        Ok(())
    }

    /// Web URL of a review.
    pub fn review_url(&self, review_id: &str) -> String {
        review_url(&self.config.url, &self.config.project_id, review_id)
    }
}

fn create_review_request(branch: Option<&str>, revisions: &[String]) -> Result<CreateReviewRequest> {
    let branch = branch.map(str::trim).filter(|b| !b.is_empty());
    let revisions: Vec<String> = revisions
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect();

    match (branch, revisions.is_empty()) {
        (_, false) => Ok(CreateReviewRequest {
            branch: None,
            revisions,
        }),
        (Some(branch), true) => Ok(CreateReviewRequest {
            branch: Some(branch.to_string()),
            revisions,
        }),
        (None, true) => Err(UpsourceError::InvalidArgument(
            "a branch or at least one revision is required to create a review".to_string(),
        )),
    }
}

/// `<url>/<projectId>/review/<reviewId>` with encoded path segments.
pub fn review_url(base_url: &str, project_id: &str, review_id: &str) -> String {
    format!(
        "{}/{}/review/{}",
        base_url.trim_end_matches('/'),
        utf8_percent_encode(project_id, PATH_SEGMENT),
        utf8_percent_encode(review_id, PATH_SEGMENT),
    )
}
