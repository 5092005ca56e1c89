//! Integration specifications for the guided loan interview.
//!
//! Scenarios drive the public flow controller, feature assembler, service facade, and HTTP router
//! the way a shell would, without reaching into private modules.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use loan_intake::workflows::loan::{
        keys, LoanIntakeService, RawAnswer, ScorecardPredictor, SessionId, SessionRecord,
        SessionStore, StoreError,
    };

    pub(super) fn applicant() -> Vec<RawAnswer> {
        vec![
            RawAnswer::from("123"),
            RawAnswer::from(30_i64),
            RawAnswer::from("M"),
            RawAnswer::from(5_i64),
            RawAnswer::from(60_i64),
            RawAnswer::from("12345"),
            RawAnswer::from("2"),
            RawAnswer::from(1.2_f64),
            RawAnswer::from("2"),
            RawAnswer::from(0_i64),
            RawAnswer::from("Rent"),
            RawAnswer::from("0"),
            RawAnswer::from("1"),
            RawAnswer::from("1"),
            RawAnswer::from("0"),
        ]
    }

    pub(super) const IDENTIFYING: [&str; 2] = [keys::ID, keys::ZIP_CODE];

    #[derive(Default)]
    pub(super) struct MemoryStore {
        records: Mutex<HashMap<SessionId, SessionRecord>>,
    }

    impl SessionStore for MemoryStore {
        fn insert(&self, record: SessionRecord) -> Result<SessionRecord, StoreError> {
            let mut guard = self.records.lock().expect("lock");
            guard.insert(record.id.clone(), record.clone());
            Ok(record)
        }

        fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<Option<T>, StoreError>
        where
            F: FnOnce(&mut SessionRecord) -> T,
        {
            Ok(self.records.lock().expect("lock").get_mut(id).map(change))
        }

        fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }

        fn remove(&self, id: &SessionId) -> Result<(), StoreError> {
            self.records
                .lock()
                .expect("lock")
                .remove(id)
                .map(|_| ())
                .ok_or(StoreError::NotFound)
        }
    }

    pub(super) fn service() -> Arc<LoanIntakeService<MemoryStore, ScorecardPredictor>> {
        Arc::new(LoanIntakeService::new(
            Arc::new(MemoryStore::default()),
            Arc::new(ScorecardPredictor::default()),
        ))
    }
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use loan_intake::workflows::loan::{
    intake_router, keys, FeatureAssembler, FeatureValue, FlowController, LoanPrediction,
    ScorecardPredictor, SessionState, Speaker,
};

use common::*;

#[test]
fn interview_collects_all_fields_and_assembles_features() {
    let flow = FlowController::standard();
    let mut state = SessionState::new();

    for answer in applicant() {
        let prompt = flow.current_field(&state).expect("question pending").prompt;
        assert!(!prompt.is_empty());
        assert!(flow.submit(&mut state, answer).expect("open").is_accepted());
    }

    assert_eq!(state.position(), 15);
    assert!(flow.current_field(&state).is_none());

    let features = FeatureAssembler::standard()
        .assemble_session(&state)
        .expect("complete");
    assert_eq!(features.get(keys::GENDER), Some(FeatureValue::Integer(1)));
    assert_eq!(features.get(keys::HOME_OWNERSHIP), Some(FeatureValue::Integer(2)));
    for key in IDENTIFYING {
        assert!(state.answers().contains_key(key));
        assert!(!features.contains_key(key));
    }

    let prediction =
        loan_intake::workflows::loan::predict(&ScorecardPredictor::default(), &features)
            .expect("known label");
    assert_eq!(prediction, LoanPrediction::Rejected);
}

#[test]
fn rejected_zip_code_is_asked_again_then_accepted() {
    let flow = FlowController::standard();
    let mut state = SessionState::new();
    let answers = applicant();

    for answer in answers.iter().take(5).cloned() {
        flow.submit(&mut state, answer).expect("open");
    }

    let outcome = flow.submit(&mut state, "1234").expect("open");
    assert_eq!(outcome.message(), Some("ZIP Code must be a 5-digit number."));
    assert_eq!(state.position(), 5);
    let last = state.transcript().last().expect("system message");
    assert_eq!(last.speaker, Speaker::System);

    assert!(flow.submit(&mut state, "12345").expect("open").is_accepted());
    assert_eq!(state.position(), 6);
}

#[tokio::test]
async fn http_interview_round_trip() {
    let router = intake_router(service());

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/loan/sessions")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let started = read_json(response).await;
    let id = started["session_id"].as_str().expect("id").to_string();

    for answer in applicant() {
        let payload = serde_json::json!({ "answer": answer });
        let response = router
            .clone()
            .oneshot(
                Request::post(format!("/api/v1/loan/sessions/{id}/answers"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(
            Request::post(format!("/api/v1/loan/sessions/{id}/prediction"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "The loan is likely to be rejected.");
    assert!(body["features"].get("ZIP Code").is_none());
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
