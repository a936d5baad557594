//! Serverless intake service for the VR exhibition visitor survey.
//!
//! The survey form on the exhibition site POSTs its answers here; we map
//! them onto a fixed spreadsheet schema and append one row per submission
//! to a Google Sheet. A small diagnostic endpoint reports whether the
//! deployment has the credentials it needs.
//!
//! This common codebase is compiled into two executables: `vr-survey-lambda`
//! runs behind an HTTP gateway for the actual cloud deployment, while
//! `vr-survey-oneshot` pushes a single submission through the handler
//! locally, without any Google credentials.

use lambda_http::http::StatusCode;
use lambda_http::{tracing, Body, Error, Request, Response};
use serde_json::json;

pub mod config;
mod debug;
mod error;
pub mod record;
mod respond;
mod sheets;
pub mod storage;
mod submit;

use config::Config;
use sheets::SheetsStorage;
use storage::Storage;

pub struct Services {
    config: Config,
    storage: Option<Box<dyn Storage>>,
}

impl Services {
    /// Create the service state for the survey Lambda: logging, the
    /// configuration snapshot, and the Sheets backend if the deployment has
    /// credentials for it.
    pub async fn init() -> Result<Self, Error> {
        init_logging();
        Ok(Self::with_config(Config::from_env()))
    }

    /// Assemble services from an explicit configuration. The storage backend
    /// is only constructed when the Google credentials are complete; without
    /// it, submissions get the configuration-error response.
    pub fn with_config(config: Config) -> Self {
        let storage = config
            .sheets_config()
            .map(|sheets| Box::new(SheetsStorage::new(sheets)) as Box<dyn Storage>);

        if storage.is_none() {
            tracing::warn!("Google Sheets credentials incomplete; submissions will be rejected");
        }

        Services { config, storage }
    }

    /// Swap in a specific backend; used by the oneshot binary and tests.
    pub fn with_storage(config: Config, storage: Box<dyn Storage>) -> Self {
        Services {
            config,
            storage: Some(storage),
        }
    }

    /// Route one HTTP request to the endpoint that owns its path.
    pub async fn dispatch(&self, req: Request) -> Result<Response<Body>, Error> {
        match req.uri().path().trim_end_matches('/') {
            "/api/submit-survey" => {
                submit::handler(req, &self.config, self.storage.as_deref()).await
            }
            "/api/debug" => debug::handler(req, &self.config).await,
            _ => respond::json(StatusCode::NOT_FOUND, &json!({ "error": "Not found" })),
        }
    }
}

pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false) // don't print the module name
        .without_time() // don't print time (CloudWatch has it)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn request(method: &str, uri: &str) -> Request {
        lambda_http::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::Empty)
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_paths_get_a_404_with_cors() {
        let svcs = Services::with_storage(Config::default(), Box::new(MemoryStorage::default()));

        let resp = svcs.dispatch(request("GET", "/api/nope")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        match resp.body() {
            Body::Text(text) => assert_eq!(text, r#"{"error":"Not found"}"#),
            other => panic!("expected a text body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn routes_by_path_with_trailing_slashes_tolerated() {
        let svcs = Services::with_storage(Config::default(), Box::new(MemoryStorage::default()));

        let resp = svcs.dispatch(request("GET", "/api/debug/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = svcs
            .dispatch(request("OPTIONS", "/api/submit-survey"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(matches!(resp.body(), Body::Empty));
    }

    #[tokio::test]
    async fn missing_credentials_surface_as_a_configuration_error() {
        // No credentials at all, so no storage backend gets built.
        let svcs = Services::with_config(Config::default());

        let req = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/api/submit-survey")
            .body(Body::Text(r#"{"ime": "Ana", "starost": "34"}"#.to_owned()))
            .unwrap();
        let resp = svcs.dispatch(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
