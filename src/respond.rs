//! Response builders.
//!
//! The form is served from a different origin than the API, so every
//! response, success or failure, carries `Access-Control-Allow-Origin: *`.
//! Only the submit endpoint advertises its allowed methods and headers,
//! since it is the one the form preflights.

use lambda_http::http::{response::Builder, StatusCode};
use lambda_http::{Body, Error, Response};
use serde_json::Value;

pub fn json(status: StatusCode, body: &Value) -> Result<Response<Body>, Error> {
    finish_json(base(status), body)
}

pub fn empty(status: StatusCode) -> Result<Response<Body>, Error> {
    Ok(base(status).body(Body::Empty)?)
}

pub fn submit_json(status: StatusCode, body: &Value) -> Result<Response<Body>, Error> {
    finish_json(submit_base(status), body)
}

pub fn submit_empty(status: StatusCode) -> Result<Response<Body>, Error> {
    Ok(submit_base(status).body(Body::Empty)?)
}

fn finish_json(builder: Builder, body: &Value) -> Result<Response<Body>, Error> {
    Ok(builder
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body)?))?)
}

fn base(status: StatusCode) -> Builder {
    Response::builder()
        .status(status)
        .header("Access-Control-Allow-Origin", "*")
}

fn submit_base(status: StatusCode) -> Builder {
    base(status)
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_response_carries_the_origin_header() {
        let resp = json(StatusCode::OK, &json!({"ok": true})).unwrap();
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        assert_eq!(resp.headers().get("Content-Type").unwrap(), "application/json");

        let resp = empty(StatusCode::OK).unwrap();
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        assert!(matches!(resp.body(), Body::Empty));
    }

    #[test]
    fn only_submit_responses_advertise_methods_and_headers() {
        let resp = json(StatusCode::OK, &json!({"ok": true})).unwrap();
        assert!(resp.headers().get("Access-Control-Allow-Methods").is_none());
        assert!(resp.headers().get("Access-Control-Allow-Headers").is_none());

        let resp = submit_json(StatusCode::OK, &json!({"ok": true})).unwrap();
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Methods").unwrap(),
            "POST, OPTIONS"
        );
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Headers").unwrap(),
            "Content-Type"
        );

        let resp = submit_empty(StatusCode::OK).unwrap();
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Methods").unwrap(),
            "POST, OPTIONS"
        );
    }
}
