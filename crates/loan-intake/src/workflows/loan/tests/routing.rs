use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::loan::router::{intake_router, prediction_handler};
use crate::workflows::loan::service::LoanIntakeService;

const SESSIONS: &str = "/api/v1/loan/sessions";

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn start_session(router: &axum::Router) -> String {
    let response = router
        .clone()
        .oneshot(empty_request("POST", SESSIONS))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    body["session_id"].as_str().expect("session id").to_string()
}

#[tokio::test]
async fn start_route_returns_first_prompt() {
    let (service, _, _) = build_service(0);
    let router = intake_router(Arc::new(service));

    let response = router
        .oneshot(empty_request("POST", SESSIONS))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["position"], 0);
    assert_eq!(body["total_fields"], 15);
    assert_eq!(body["current_field"]["key"], "ID");
    assert_eq!(body["current_field"]["prompt"], "Please enter your ID:");
}

#[tokio::test]
async fn answers_route_accepts_numbers_and_text() {
    let (service, _, _) = build_service(0);
    let router = intake_router(Arc::new(service));
    let id = start_session(&router).await;
    let uri = format!("{SESSIONS}/{id}/answers");

    let response = router
        .clone()
        .oneshot(json_request("POST", &uri, json!({ "answer": "123" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["outcome"]["status"], "accepted");
    assert_eq!(body["session"]["current_field"]["key"], "Age");
    assert_eq!(body["session"]["current_field"]["default_input"], "25");

    let response = router
        .clone()
        .oneshot(json_request("POST", &uri, json!({ "answer": 42 })))
        .await
        .unwrap();
    let body = read_json_body(response).await;
    assert_eq!(body["outcome"]["value"], 42);
    assert_eq!(body["session"]["position"], 2);
}

#[tokio::test]
async fn answers_route_reports_rejections_with_ok_status() {
    let (service, _, _) = build_service(0);
    let router = intake_router(Arc::new(service));
    let id = start_session(&router).await;
    let uri = format!("{SESSIONS}/{id}/answers");

    let response = router
        .clone()
        .oneshot(json_request("POST", &uri, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["outcome"]["status"], "rejected");
    assert_eq!(body["outcome"]["reason"], "empty_input");
    assert_eq!(body["outcome"]["message"], "Please provide a valid response.");
    assert_eq!(body["session"]["position"], 0);
}

#[tokio::test]
async fn full_interview_over_http_yields_prediction() {
    let (service, _, _) = build_service(0);
    let router = intake_router(Arc::new(service));
    let id = start_session(&router).await;
    let uri = format!("{SESSIONS}/{id}/answers");

    for (_, raw) in scenario_answers() {
        let response = router
            .clone()
            .oneshot(json_request("POST", &uri, json!({ "answer": raw })))
            .await
            .unwrap();
        let body = read_json_body(response).await;
        assert_eq!(body["outcome"]["status"], "accepted");
    }

    let response = router
        .clone()
        .oneshot(empty_request("GET", &format!("{SESSIONS}/{id}/summary")))
        .await
        .unwrap();
    let summary = read_json_body(response).await;
    assert_eq!(summary["complete"], true);
    assert_eq!(summary["answers"]["ZIP Code"], "12345");
    assert_eq!(summary["features"]["Home Ownership"], 2);

    let response = router
        .clone()
        .oneshot(empty_request("POST", &format!("{SESSIONS}/{id}/prediction")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["label"], 0);
    assert_eq!(body["prediction"], "rejected");
    assert_eq!(body["message"], "The loan is likely to be rejected.");
}

#[tokio::test]
async fn prediction_route_conflicts_on_incomplete_session() {
    let (service, _, _) = build_service(0);
    let router = intake_router(Arc::new(service));
    let id = start_session(&router).await;

    let response = router
        .oneshot(empty_request("POST", &format!("{SESSIONS}/{id}/prediction")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("ID"));
}

#[tokio::test]
async fn prediction_handler_returns_bad_gateway_for_unknown_label() {
    let (service, _, _) = build_service(9);
    let service = Arc::new(service);
    let id = service.start().expect("session starts").session_id;
    for (_, raw) in scenario_answers() {
        service.submit(&id, raw).expect("submit answer");
    }

    let response =
        prediction_handler::<MemoryStore, FixedLabelPredictor>(State(service), Path(id.0)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn reset_and_end_routes_manage_the_session() {
    let (service, _, _) = build_service(0);
    let router = intake_router(Arc::new(service));
    let id = start_session(&router).await;

    router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{SESSIONS}/{id}/answers"),
            json!({ "answer": "123" }),
        ))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(empty_request("POST", &format!("{SESSIONS}/{id}/reset")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["position"], 0);
    assert_eq!(body["transcript"], json!([]));

    let response = router
        .clone()
        .oneshot(empty_request("DELETE", &format!("{SESSIONS}/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(empty_request("GET", &format!("{SESSIONS}/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_outage_maps_to_internal_error() {
    let service = Arc::new(LoanIntakeService::new(
        Arc::new(UnavailableStore),
        Arc::new(FixedLabelPredictor::new(0)),
    ));
    let router = intake_router(service);

    let response = router
        .oneshot(empty_request("POST", SESSIONS))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
