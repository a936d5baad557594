//! Run one survey submission locally, without touching Google Sheets.
//!
//! The single argument is the JSON payload the form would POST. The response
//! status and body are printed to stdout; the row lands in the in-memory
//! backend and nowhere else.

use lambda_http::{Body, Request};
use lambda_runtime::Error;
use std::env;

use vr_survey_lambda::config::Config;
use vr_survey_lambda::storage::MemoryStorage;
use vr_survey_lambda::{init_logging, Services};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut args = env::args();
    args.next(); // skip argv[0]

    let json_text = args
        .next()
        .ok_or_else(|| -> Error { "first argument should be the JSON form payload".into() })?;

    init_logging();

    let mut config = Config::from_env();
    // Local runs always get full error detail.
    config.app_env = Some("development".to_owned());

    let svcs = Services::with_storage(config, Box::new(MemoryStorage::default()));

    let req: Request = lambda_http::http::Request::builder()
        .method("POST")
        .uri("/api/submit-survey")
        .header("Content-Type", "application/json")
        .body(Body::Text(json_text))?;

    let response = svcs.dispatch(req).await?;

    println!("{}", response.status());
    if let Body::Text(text) = response.body() {
        println!("{text}");
    }

    Ok(())
}
