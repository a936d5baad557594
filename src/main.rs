//! Cloud entry point for the survey intake service.
//!
//! This executable expects to sit behind an HTTP gateway speaking the Lambda
//! "proxy event" protocol; `lambda_http` translates that into plain HTTP
//! requests and responses, so the handlers never see gateway details.

use lambda_http::{run, service_fn, Error, Request};

use vr_survey_lambda::Services;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let svcs = Services::init().await?;
    let ref_svcs = &svcs;

    run(service_fn(|req: Request| async move {
        ref_svcs.dispatch(req).await
    }))
    .await?;
    Ok(())
}
