//! AWS Lambda handler for calculator requests
//!
//! Accepts one `CalculationRequest` (or an array of them) as JSON and
//! returns the outcome. Supports Lambda Function URLs for direct HTTP access.
//! Calculator defaults come from FINCALC_* environment variables.

use fincalc::batch::{parse_requests, BatchItem, BatchRunner};
use fincalc::{Breakdown, CalculationOutcome, CalculatorDefaults};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Serialize;

/// Output for a single request
#[derive(Debug, Serialize)]
pub struct CalculationResponse {
    #[serde(flatten)]
    pub outcome: CalculationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
    pub execution_time_us: u64,
}

/// Output for an array of requests
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub items: Vec<BatchItem>,
    pub failed: usize,
    pub execution_time_us: u64,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn with_cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::to_string(&ErrorBody { error: message })?;
    Ok(with_cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(body))?)
}

fn json_response<T: Serialize>(body: &T) -> Result<Response<Body>, Error> {
    Ok(with_cors(Response::builder())
        .status(200)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// What a request body turns into, before it becomes an HTTP response
#[derive(Debug)]
enum Reply {
    Single(CalculationResponse),
    Batch(BatchResponse),
    Failure { status: u16, message: String },
}

impl Reply {
    fn failure(status: u16, message: impl Into<String>) -> Self {
        Reply::Failure { status, message: message.into() }
    }
}

/// Parse and evaluate a request body
///
/// Bad JSON and validation errors map to 400, everything else that fails to 500.
fn dispatch(runner: &BatchRunner, body: &str) -> Reply {
    let start = std::time::Instant::now();

    let is_array = body.trim_start().starts_with('[');
    let requests = match parse_requests(body) {
        Ok(r) => r,
        Err(e) => return Reply::failure(400, format!("Invalid JSON: {}", e)),
    };

    if is_array {
        let items = runner.run_batch(&requests);
        let failed = items.iter().filter(|i| !i.is_ok()).count();
        return Reply::Batch(BatchResponse {
            items,
            failed,
            execution_time_us: start.elapsed().as_micros() as u64,
        });
    }

    let Some(request) = requests.first() else {
        return Reply::failure(400, "No request given");
    };

    match runner.run(request) {
        Ok(outcome) => {
            let breakdown = outcome.breakdown();
            Reply::Single(CalculationResponse {
                outcome,
                breakdown,
                execution_time_us: start.elapsed().as_micros() as u64,
            })
        }
        Err(e) if e.is_validation() => Reply::failure(400, e.to_string()),
        Err(e) => {
            log::error!("{} request failed: {}", request.name(), e);
            Reply::failure(500, e.to_string())
        }
    }
}

/// Lambda handler function
async fn handler(runner: &BatchRunner, event: Request) -> Result<Response<Body>, Error> {
    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(with_cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => return error_response(400, "Request body is empty"),
    };

    match dispatch(runner, &body_str) {
        Reply::Single(response) => json_response(&response),
        Reply::Batch(response) => json_response(&response),
        Reply::Failure { status, message } => error_response(status, &message),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let runner = BatchRunner::with_defaults(CalculatorDefaults::default().with_env_overrides());
    run(service_fn(move |event: Request| {
        let runner = runner.clone();
        async move { handler(&runner, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> BatchRunner {
        BatchRunner::with_defaults(CalculatorDefaults::default())
    }

    #[test]
    fn test_single_request() {
        let body = r#"{"calculator": "emi", "principal": 500000, "annual_rate": 10, "months": 60}"#;
        match dispatch(&runner(), body) {
            Reply::Single(response) => {
                assert!(response.breakdown.is_some());
                let json = serde_json::to_value(&response).unwrap();
                assert_eq!(json["calculator"], "emi");
                assert!(json["result"]["emi"].as_f64().unwrap() > 10_623.0);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_array_becomes_batch() {
        let body = r#"[
            {"calculator": "gst", "amount": 100, "rate": 18},
            {"calculator": "tenure", "principal": 500000, "annual_rate": 12, "emi": 100}
        ]"#;
        match dispatch(&runner(), body) {
            Reply::Batch(response) => {
                assert_eq!(response.items.len(), 2);
                assert_eq!(response.failed, 1);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_bad_json_and_validation_are_client_errors() {
        assert!(matches!(dispatch(&runner(), "{ nope"), Reply::Failure { status: 400, .. }));

        let body = r#"{"calculator": "sip", "monthly_investment": 0, "annual_return": 12, "years": 10}"#;
        assert!(matches!(dispatch(&runner(), body), Reply::Failure { status: 400, .. }));

        assert!(matches!(dispatch(&runner(), "[]"), Reply::Batch(BatchResponse { failed: 0, .. })));
    }

    #[test]
    fn test_solver_failure_is_server_error() {
        let capped = CalculatorDefaults { max_iterations: 1, ..CalculatorDefaults::default() };
        let body = r#"{"calculator": "emi", "principal": 500000, "annual_rate": 10, "months": 60, "timing": "advance"}"#;
        match dispatch(&BatchRunner::with_defaults(capped), body) {
            Reply::Failure { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("did not converge"));
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }
}
