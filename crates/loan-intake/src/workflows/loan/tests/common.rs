use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::loan::fields::keys;
use crate::workflows::loan::flow::{FlowController, RawAnswer};
use crate::workflows::loan::features::FeatureRecord;
use crate::workflows::loan::prediction::{Predictor, PredictorError};
use crate::workflows::loan::repository::{SessionId, SessionRecord, SessionStore, StoreError};
use crate::workflows::loan::service::LoanIntakeService;
use crate::workflows::loan::session::SessionState;

/// The reference applicant, in interview order.
pub(super) fn scenario_answers() -> Vec<(&'static str, RawAnswer)> {
    vec![
        (keys::ID, RawAnswer::from("123")),
        (keys::AGE, RawAnswer::from(30_i64)),
        (keys::GENDER, RawAnswer::from("M")),
        (keys::EXPERIENCE, RawAnswer::from(5_i64)),
        (keys::INCOME, RawAnswer::from(60_i64)),
        (keys::ZIP_CODE, RawAnswer::from("12345")),
        (keys::FAMILY, RawAnswer::from("2")),
        (keys::CC_AVG, RawAnswer::from(1.2_f64)),
        (keys::EDUCATION, RawAnswer::from("2")),
        (keys::MORTGAGE, RawAnswer::from(0_i64)),
        (keys::HOME_OWNERSHIP, RawAnswer::from("Rent")),
        (keys::SECURITIES_ACCOUNT, RawAnswer::from("0")),
        (keys::CD_ACCOUNT, RawAnswer::from("1")),
        (keys::ONLINE, RawAnswer::from("1")),
        (keys::CREDIT_CARD, RawAnswer::from("0")),
    ]
}

/// An answer each field's rule refuses.
pub(super) fn invalid_answer(key: &str) -> &'static str {
    match key {
        keys::ID => "12a",
        keys::GENDER => "X",
        keys::ZIP_CODE => "1234",
        keys::FAMILY => "5",
        keys::EDUCATION => "4",
        keys::HOME_OWNERSHIP => "Own",
        keys::SECURITIES_ACCOUNT | keys::CD_ACCOUNT | keys::ONLINE | keys::CREDIT_CARD => "2",
        _ => "not a number",
    }
}

/// Answer the first `count` scenario questions.
pub(super) fn session_at(flow: &FlowController, count: usize) -> SessionState {
    let mut state = SessionState::new();
    for (_, raw) in scenario_answers().into_iter().take(count) {
        let outcome = flow.submit(&mut state, raw).expect("interview still open");
        assert!(outcome.is_accepted(), "scenario answer rejected: {outcome:?}");
    }
    state
}

pub(super) fn completed_session(flow: &FlowController) -> SessionState {
    session_at(flow, flow.script().len())
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
}

impl SessionStore for MemoryStore {
    fn insert(&self, record: SessionRecord) -> Result<SessionRecord, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(&mut SessionRecord) -> T,
    {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get_mut(id).map(change))
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn insert(&self, _record: SessionRecord) -> Result<SessionRecord, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn modify<T, F>(&self, _id: &SessionId, _change: F) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(&mut SessionRecord) -> T,
    {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

/// Predictor that always answers with the same label and remembers what it was shown.
#[derive(Default)]
pub(super) struct FixedLabelPredictor {
    label: i64,
    seen: Mutex<Vec<FeatureRecord>>,
}

impl FixedLabelPredictor {
    pub(super) fn new(label: i64) -> Self {
        Self {
            label,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn seen(&self) -> Vec<FeatureRecord> {
        self.seen.lock().expect("predictor mutex poisoned").clone()
    }
}

impl Predictor for FixedLabelPredictor {
    fn predict(&self, features: &FeatureRecord) -> Result<i64, PredictorError> {
        self.seen
            .lock()
            .expect("predictor mutex poisoned")
            .push(features.clone());
        Ok(self.label)
    }
}

pub(super) struct OfflinePredictor;

impl Predictor for OfflinePredictor {
    fn predict(&self, _features: &FeatureRecord) -> Result<i64, PredictorError> {
        Err(PredictorError::Unavailable("model not loaded".to_string()))
    }
}

pub(super) fn build_service(
    label: i64,
) -> (
    LoanIntakeService<MemoryStore, FixedLabelPredictor>,
    Arc<MemoryStore>,
    Arc<FixedLabelPredictor>,
) {
    let store = Arc::new(MemoryStore::default());
    let predictor = Arc::new(FixedLabelPredictor::new(label));
    let service = LoanIntakeService::new(store.clone(), predictor.clone());
    (service, store, predictor)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
