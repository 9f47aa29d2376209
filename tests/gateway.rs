use std::collections::HashMap;
use std::time::Duration;

use eyespot::{
    GatewayConfig, ParameterError, Parameters, SolveError, SolveGateway, SolveRequest, Square,
};
use pretty_assertions::assert_eq;

mod common;

fn request(grid_size: usize, squares: Vec<Square>) -> SolveRequest {
    SolveRequest::new(
        Parameters {
            grid_size,
            ..Parameters::default()
        },
        squares,
    )
}

fn gateway(url: String) -> SolveGateway {
    SolveGateway::new(GatewayConfig::default().with_base_url(url)).unwrap()
}

#[test]
fn test_default_config() {
    let config = GatewayConfig::default();

    assert_eq!(config.base_url, "http://localhost:5000");
    assert_eq!(config.timeout, Duration::from_secs(300));
    assert_eq!(config.solve_url(), "http://localhost:5000/solve");
}

#[test]
fn test_config_from_lookup() {
    let env = HashMap::from([
        ("EYESPOT_SOLVER_URL", "http://solver.lan:8080/"),
        ("EYESPOT_SOLVER_TIMEOUT_SECS", "42"),
    ]);
    let config = GatewayConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.solve_url(), "http://solver.lan:8080/solve");
    assert_eq!(config.timeout, Duration::from_secs(42));
}

#[test]
fn test_config_ignores_bad_overrides() {
    let env = HashMap::from([
        ("EYESPOT_SOLVER_URL", ""),
        ("EYESPOT_SOLVER_TIMEOUT_SECS", "soon"),
    ]);
    let config = GatewayConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config, GatewayConfig::default());
}

#[test]
fn test_request_wire_format() {
    let squares = vec![Square::new(2, 3), Square::new(4, 4)];
    let json = serde_json::to_value(request(5, squares)).unwrap();

    assert_eq!(json["parameters"]["grid_size"], 5);
    assert_eq!(json["precursor_squares"], serde_json::json!([[2, 3], [4, 4]]));
}

#[test]
fn test_request_validation_rejects_outside_squares() {
    let outside = request(4, vec![Square::new(1, 1), Square::new(4, 0)]);

    assert_eq!(
        outside.validate(),
        Err(ParameterError::SquareOutsideGrid {
            row: 4,
            col: 0,
            grid_size: 4
        })
    );
}

#[test]
fn test_retryable_errors() {
    assert!(SolveError::Timeout.is_retryable());
    assert!(SolveError::Status {
        status: 503,
        body: String::new()
    }
    .is_retryable());
    assert!(!SolveError::Status {
        status: 422,
        body: String::new()
    }
    .is_retryable());
    assert!(!SolveError::MalformedSolution(String::new()).is_retryable());
}

#[tokio::test]
async fn test_solve_posts_json_and_parses_solution() {
    let expected = common::ramp_solution(3, 4);
    let body = serde_json::to_string(&expected).unwrap();
    let (url, server) = common::serve_once(200, body, Duration::ZERO).await;

    let sent = request(3, vec![Square::new(0, 2)]);
    let solution = gateway(url).solve(&sent).await.unwrap();
    let captured = server.await.unwrap();

    assert_eq!(solution, expected);
    assert!(captured.head.starts_with("post /solve http/1.1"));
    assert!(captured.head.contains("content-type: application/json"));
    let received: SolveRequest = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(received, sent);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (url, server) =
        common::serve_once(500, r#"{"error":"solver crashed"}"#.into(), Duration::ZERO).await;

    let result = gateway(url).solve(&request(3, vec![])).await;
    server.await.unwrap();

    match result {
        Err(SolveError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("solver crashed"));
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_survives_an_unreadable_body() {
    let (url, server) = common::serve_truncated(500, 4096, r#"{"err"#.into()).await;

    let result = gateway(url).solve(&request(3, vec![])).await;
    server.await.unwrap();

    match result {
        Err(SolveError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.is_empty());
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let body = serde_json::to_string(&common::ramp_solution(3, 1)).unwrap();
    let (url, server) = common::serve_once(200, body, Duration::from_secs(5)).await;
    let config = GatewayConfig::default()
        .with_base_url(url)
        .with_timeout(Duration::from_millis(200));

    let result = SolveGateway::new(config)
        .unwrap()
        .solve(&request(3, vec![]))
        .await;
    server.abort();

    assert!(matches!(result, Err(SolveError::Timeout)));
}

#[tokio::test]
async fn test_unreachable_solver_is_a_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = gateway(url).solve(&request(3, vec![])).await;

    assert!(matches!(result, Err(SolveError::Transport(_))));
}

#[tokio::test]
async fn test_garbage_response_is_a_decode_error() {
    let (url, server) = common::serve_once(200, "not json".into(), Duration::ZERO).await;

    let result = gateway(url).solve(&request(3, vec![])).await;
    server.await.unwrap();

    assert!(matches!(result, Err(SolveError::Decode(_))));
}

#[tokio::test]
async fn test_mismatched_shape_is_rejected() {
    let mut broken = common::ramp_solution(3, 2);
    broken.frames[1].p2.pop();
    let body = serde_json::to_string(&broken).unwrap();
    let (url, server) = common::serve_once(200, body, Duration::ZERO).await;

    let result = gateway(url).solve(&request(3, vec![])).await;
    server.await.unwrap();

    match result {
        Err(SolveError::MalformedSolution(reason)) => assert!(reason.contains("P2")),
        other => panic!("expected a malformed solution, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_grid_size_is_rejected() {
    let body = serde_json::to_string(&common::ramp_solution(4, 2)).unwrap();
    let (url, server) = common::serve_once(200, body, Duration::ZERO).await;

    let result = gateway(url).solve(&request(3, vec![])).await;
    server.await.unwrap();

    assert!(matches!(result, Err(SolveError::MalformedSolution(_))));
}

#[tokio::test]
async fn test_invalid_parameters_never_reach_the_solver() {
    let invalid = SolveRequest::new(
        Parameters {
            time_step: -0.1,
            ..Parameters::default()
        },
        vec![],
    );

    // Nothing listens here; validation must fail before any connection.
    let result = gateway("http://127.0.0.1:9".into()).solve(&invalid).await;

    assert!(matches!(
        result,
        Err(SolveError::InvalidParameters(ParameterError::NonPositiveTimeStep(_)))
    ));
}
