use loan_intake::config::{AppConfig, PredictorConfig};
use loan_intake::error::AppError;
use loan_intake::telemetry;
use loan_intake::workflows::loan::{
    ScorecardConfig, ScorecardPredictor, SessionId, SessionRecord, SessionStore, StoreError,
};
use chrono::Duration;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Sessions untouched for this long are dropped the next time a session starts.
pub(crate) const SESSION_IDLE_MINUTES: i64 = 30;

/// Process-local session storage. Sessions disappear when the process exits, and idle ones are
/// evicted on insert so abandoned interviews do not accumulate.
#[derive(Clone)]
pub(crate) struct InMemorySessionStore {
    records: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
    idle_timeout: Duration,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(Duration::minutes(SESSION_IDLE_MINUTES))
    }
}

impl InMemorySessionStore {
    pub(crate) fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    fn guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, SessionRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("session store mutex poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, record: SessionRecord) -> Result<SessionRecord, StoreError> {
        let mut guard = self.guard()?;
        let cutoff = record.started_at - self.idle_timeout;
        let before = guard.len();
        guard.retain(|_, existing| existing.updated_at >= cutoff);
        let evicted = before - guard.len();
        if evicted > 0 {
            debug!(evicted, "idle sessions evicted");
        }

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
        let mut guard = self.guard()?;
        Ok(guard.get_mut(id).map(change))
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let guard = self.guard()?;
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut guard = self.guard()?;
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

/// Build the scorecard predictor. A CLI path wins over `APP_SCORECARD_PATH`; with neither the
/// built-in card is used.
pub(crate) fn load_predictor(
    config: &PredictorConfig,
    override_path: Option<PathBuf>,
) -> Result<ScorecardPredictor, AppError> {
    match override_path.or_else(|| config.scorecard_path.clone()) {
        Some(path) => {
            let scorecard = ScorecardConfig::from_path(&path)?;
            info!(path = %path.display(), weights = scorecard.weights.len(), "scorecard loaded");
            Ok(ScorecardPredictor::new(scorecard))
        }
        None => Ok(ScorecardPredictor::default()),
    }
}

/// Start-up shared by the offline commands: configuration, stderr logging, and the predictor.
pub(crate) fn offline_predictor(
    scorecard: Option<PathBuf>,
) -> Result<ScorecardPredictor, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    load_predictor(&config.predictor, scorecard)
}
