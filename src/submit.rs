//! The survey submission endpoint.
//!
//! POST-only (plus the CORS preflight). The body is the raw field mapping
//! the form produces; validation is limited to the two fields the study
//! cannot analyze without. Everything else is defaulted and mapped onto the
//! fixed schema in [`crate::record`], then handed to the storage backend.
//! User-facing messages are in Slovene, matching the form.

use anyhow::anyhow;
use lambda_http::http::{HeaderMap, Method, StatusCode};
use lambda_http::{tracing, Body, Error, Request, Response};
use serde_json::{json, Map, Value};

use crate::config::{Config, Environment};
use crate::error::ApiError;
use crate::record::{self, SurveyResponse};
use crate::respond;
use crate::storage::Storage;

pub const MSG_REQUIRED_FIELDS: &str = "Ime in starost sta obvezna polja";
pub const MSG_SUCCESS: &str = "Anketa je bila uspešno oddana in shranjena!";
pub const MSG_PROCESSING_ERROR: &str = "Prišlo je do napake pri obdelavi ankete";

pub async fn handler(
    req: Request,
    config: &Config,
    storage: Option<&dyn Storage>,
) -> Result<Response<Body>, Error> {
    if req.method() == Method::OPTIONS {
        return respond::submit_empty(StatusCode::OK);
    }

    if req.method() != Method::POST {
        return error_response(ApiError::Method, config);
    }

    match submit(&req, storage).await {
        Ok(record) => respond::submit_json(
            StatusCode::OK,
            &json!({
                "success": true,
                "message": MSG_SUCCESS,
                "id": record.id,
            }),
        ),
        Err(err) => error_response(err, config),
    }
}

async fn submit(req: &Request, storage: Option<&dyn Storage>) -> Result<SurveyResponse, ApiError> {
    let data = parse_body(req.body())?;

    if record::missing_required(&data) {
        return Err(ApiError::Validation(MSG_REQUIRED_FIELDS));
    }

    let record = SurveyResponse::new(
        &data,
        &client_ip(req.headers()),
        &header_or_unknown(req.headers(), "user-agent"),
    );

    // Validation comes first: a misconfigured deployment still tells the
    // visitor when their submission is incomplete.
    let storage = storage.ok_or(ApiError::Configuration)?;

    let id = storage.append(&record).await.map_err(ApiError::Internal)?;
    tracing::info!(%id, "survey response accepted");

    Ok(record)
}

fn parse_body(body: &Body) -> Result<Map<String, Value>, ApiError> {
    let text = std::str::from_utf8(body)
        .map_err(|_| ApiError::Internal(anyhow!("request body is not UTF-8")))?;
    let parsed: Value = serde_json::from_str(text)
        .map_err(|e| ApiError::Internal(anyhow!("request body is not valid JSON: {e}")))?;

    match parsed {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::Internal(anyhow!(
            "request body is not a JSON object"
        ))),
    }
}

/// Best-effort client address from the usual proxy headers.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned()
}

fn header_or_unknown(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned()
}

fn error_response(err: ApiError, config: &Config) -> Result<Response<Body>, Error> {
    tracing::error!(error = %err, "survey submission failed");

    let body = match &err {
        ApiError::Internal(inner) => {
            let details = match config.environment() {
                Environment::Development => format!("{inner:#}"),
                Environment::Production => "Internal server error".to_owned(),
            };
            json!({ "error": MSG_PROCESSING_ERROR, "details": details })
        }
        other => json!({ "error": other.to_string() }),
    };

    respond::submit_json(err.status(), &body)
}
