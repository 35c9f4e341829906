use crate::core::aggregator::ProjectAggregator;
use crate::core::notifier::NotificationDispatcher;
use crate::domain::model::{NotificationOutcome, NotificationRequest};
use crate::domain::ports::{ContentSource, MailRelay, RepositorySource};
use crate::utils::error::PortfolioError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const SENT_MESSAGE: &str = "Email sent successfully";
pub const SERVICE_CONFIGURATION_MESSAGE: &str = "Email service configuration error";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send email. Please try again later.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// HTTP 層共用狀態
pub struct AppState<S, E, R>
where
    S: RepositorySource,
    E: ContentSource,
    R: MailRelay,
{
    pub aggregator: ProjectAggregator<S, E>,
    pub dispatcher: NotificationDispatcher<R>,
    pub handle: String,
    pub display_limit: usize,
    pub candidate_pool: usize,
}

#[derive(Debug, Deserialize)]
pub struct ProjectsQuery {
    pub limit: Option<usize>,
}

pub fn router<S, E, R>(state: Arc<AppState<S, E, R>>) -> Router
where
    S: RepositorySource + 'static,
    E: ContentSource + 'static,
    R: MailRelay + 'static,
{
    Router::new()
        .route("/api/contact", post(submit_contact::<S, E, R>))
        .route("/api/projects", get(list_projects::<S, E, R>))
        .route("/health", get(health))
        .with_state(state)
}

async fn submit_contact<S, E, R>(
    State(state): State<Arc<AppState<S, E, R>>>,
    payload: Result<Json<NotificationRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>)
where
    S: RepositorySource,
    E: ContentSource,
    R: MailRelay,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("⚠️ Unreadable contact payload: {}", rejection.body_text());
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_MESSAGE);
        }
    };

    match state.dispatcher.dispatch(&request).await {
        NotificationOutcome::Sent { .. } => {
            (StatusCode::OK, Json(json!({ "message": SENT_MESSAGE })))
        }
        NotificationOutcome::ValidationError { message } => {
            error_response(StatusCode::BAD_REQUEST, &message)
        }
        NotificationOutcome::ConfigurationError
        | NotificationOutcome::TransportError { retryable: false } => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, SERVICE_CONFIGURATION_MESSAGE)
        }
        NotificationOutcome::TransportError { retryable: true } => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED_MESSAGE)
        }
    }
}

async fn list_projects<S, E, R>(
    State(state): State<Arc<AppState<S, E, R>>>,
    Query(query): Query<ProjectsQuery>,
) -> (StatusCode, Json<Value>)
where
    S: RepositorySource,
    E: ContentSource,
    R: MailRelay,
{
    let limit = query.limit.unwrap_or(state.display_limit);
    if limit == 0 || limit > state.candidate_pool {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("limit must be between 1 and {}", state.candidate_pool),
        );
    }

    match state.aggregator.build_project_list(&state.handle, limit).await {
        Ok(list) => (StatusCode::OK, Json(json!({ "projects": list.projects }))),
        Err(e) => {
            let status = match &e {
                PortfolioError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            };
            error_response(status, &e.user_friendly_message())
        }
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::mail::MailConfig;
    use crate::domain::model::{EnrichmentResult, OutboundMessage, RepositoryCandidate};
    use crate::domain::ports::{MailCredentials, MailSession};
    use crate::utils::error::{Result, RATE_LIMITED_MESSAGE, UNAUTHORIZED_MESSAGE};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{DateTime, Utc};
    use tower::ServiceExt;

    #[derive(Clone, Copy)]
    enum Listing {
        Repos,
        Unauthorized,
        RateLimited,
    }

    struct StaticSource(Listing);

    #[async_trait]
    impl RepositorySource for StaticSource {
        async fn list_repositories(
            &self,
            _handle: &str,
            max_candidates: usize,
        ) -> Result<Vec<RepositoryCandidate>> {
            match self.0 {
                Listing::Unauthorized => Err(PortfolioError::Unauthorized {
                    message: "Bad credentials".to_string(),
                }),
                Listing::RateLimited => Err(PortfolioError::RateLimited {
                    retry_after_seconds: Some(10),
                }),
                Listing::Repos => Ok(["alice", "one", "two", "three"]
                    .iter()
                    .take(max_candidates)
                    .enumerate()
                    .map(|(i, name)| RepositoryCandidate {
                        id: i as u64,
                        name: name.to_string(),
                        description: String::new(),
                        html_url: format!("https://github.com/alice/{}", name),
                        homepage: String::new(),
                        language: String::new(),
                        stargazers_count: 0,
                        topics: vec![],
                        fork: false,
                        updated_at: DateTime::<Utc>::UNIX_EPOCH,
                    })
                    .collect()),
            }
        }
    }

    struct NoReadme;

    #[async_trait]
    impl ContentSource for NoReadme {
        async fn fetch_summary(&self, _handle: &str, repository_name: &str) -> EnrichmentResult {
            EnrichmentResult::not_found(repository_name)
        }
    }

    #[derive(Clone, Copy)]
    struct ScriptedRelay {
        fail_verify: bool,
        fail_send: bool,
    }

    #[async_trait]
    impl MailRelay for ScriptedRelay {
        async fn connect(&self, _credentials: &MailCredentials) -> Result<Box<dyn MailSession>> {
            Ok(Box::new(*self))
        }
    }

    #[async_trait]
    impl MailSession for ScriptedRelay {
        async fn verify(&self) -> Result<()> {
            if self.fail_verify {
                return Err(PortfolioError::MailError {
                    message: "auth failed".to_string(),
                });
            }
            Ok(())
        }

        async fn send(&self, message: &OutboundMessage) -> Result<String> {
            if self.fail_send {
                return Err(PortfolioError::MailError {
                    message: "try later".to_string(),
                });
            }
            Ok(message.message_id.clone())
        }
    }

    fn mail_config(with_credentials: bool) -> MailConfig {
        MailConfig {
            username: with_credentials.then(|| "site@example.com".to_string()),
            password: with_credentials.then(|| "secret".to_string()),
            recipient: "owner@example.com".to_string(),
            ..MailConfig::default()
        }
    }

    fn app(listing: Listing, relay: ScriptedRelay, with_credentials: bool) -> Router {
        let state = Arc::new(AppState {
            aggregator: ProjectAggregator::new(StaticSource(listing), NoReadme),
            dispatcher: NotificationDispatcher::new(relay, mail_config(with_credentials)),
            handle: "alice".to_string(),
            display_limit: 2,
            candidate_pool: 10,
        });
        router(state)
    }

    fn healthy_relay() -> ScriptedRelay {
        ScriptedRelay {
            fail_verify: false,
            fail_send: false,
        }
    }

    async fn post_contact(app: Router, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/api/contact")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 10_000)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 10_000)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    const VALID_BODY: &str =
        r#"{"name":"Bob","email":"bob@example.com","subject":"Hi","message":"Hello"}"#;

    #[tokio::test]
    async fn test_contact_success() {
        let (status, body) =
            post_contact(app(Listing::Repos, healthy_relay(), true), VALID_BODY).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], SENT_MESSAGE);
    }

    #[tokio::test]
    async fn test_contact_missing_fields() {
        let (status, body) = post_contact(
            app(Listing::Repos, healthy_relay(), true),
            r#"{"name":"Bob","email":"bob@example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "All fields are required");
    }

    #[tokio::test]
    async fn test_contact_configuration_and_verify_failures() {
        let (status, body) =
            post_contact(app(Listing::Repos, healthy_relay(), false), VALID_BODY).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], SERVICE_CONFIGURATION_MESSAGE);

        let relay = ScriptedRelay {
            fail_verify: true,
            fail_send: false,
        };
        let (status, body) = post_contact(app(Listing::Repos, relay, true), VALID_BODY).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], SERVICE_CONFIGURATION_MESSAGE);
    }

    #[tokio::test]
    async fn test_contact_send_failure() {
        let relay = ScriptedRelay {
            fail_verify: false,
            fail_send: true,
        };
        let (status, body) = post_contact(app(Listing::Repos, relay, true), VALID_BODY).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], SEND_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_contact_unparsable_body() {
        let (status, body) =
            post_contact(app(Listing::Repos, healthy_relay(), true), "{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], UNEXPECTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_contact_rejects_get() {
        let req = Request::builder()
            .uri("/api/contact")
            .body(Body::empty())
            .unwrap();
        let response = app(Listing::Repos, healthy_relay(), true)
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_projects_default_limit_excludes_profile() {
        let (status, body) =
            get_json(app(Listing::Repos, healthy_relay(), true), "/api/projects").await;
        assert_eq!(status, StatusCode::OK);
        let projects = body["projects"].as_array().unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0]["name"], "one");
        assert_eq!(projects[1]["name"], "two");
        assert_eq!(projects[0]["description"], "No description available");
    }

    #[tokio::test]
    async fn test_projects_limit_bounds() {
        let (status, _) =
            get_json(app(Listing::Repos, healthy_relay(), true), "/api/projects?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            get_json(app(Listing::Repos, healthy_relay(), true), "/api/projects?limit=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["projects"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_projects_policy_failures() {
        let (status, body) =
            get_json(app(Listing::Unauthorized, healthy_relay(), true), "/api/projects").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], UNAUTHORIZED_MESSAGE);

        let (status, body) =
            get_json(app(Listing::RateLimited, healthy_relay(), true), "/api/projects").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], RATE_LIMITED_MESSAGE);
    }
}
