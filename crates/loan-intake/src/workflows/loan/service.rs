use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::features::{AssemblyError, FeatureAssembler};
use super::fields::InterviewScript;
use super::flow::{FlowController, FlowError, RawAnswer};
use super::prediction::{self, PredictionError, Predictor};
use super::repository::{SessionId, SessionRecord, SessionStore, StoreError};
use super::views::{PredictionView, SessionSummary, SessionView, SubmissionView};

/// Service composing the flow controller, feature assembler, predictor, and session store.
pub struct LoanIntakeService<S, P> {
    flow: Arc<FlowController>,
    assembler: Arc<FeatureAssembler>,
    store: Arc<S>,
    predictor: Arc<P>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

impl<S, P> LoanIntakeService<S, P>
where
    S: SessionStore + 'static,
    P: Predictor + 'static,
{
    pub fn new(store: Arc<S>, predictor: Arc<P>) -> Self {
        Self::with_script(InterviewScript::standard(), store, predictor)
    }

    pub fn with_script(script: InterviewScript, store: Arc<S>, predictor: Arc<P>) -> Self {
        let assembler = Arc::new(FeatureAssembler::for_script(&script));
        let flow = Arc::new(FlowController::new(script));

        Self {
            flow,
            assembler,
            store,
            predictor,
        }
    }

    pub fn flow(&self) -> &FlowController {
        &self.flow
    }

    /// Open a fresh session at the first question.
    pub fn start(&self) -> Result<SessionView, SessionServiceError> {
        let record = SessionRecord::new(next_session_id(), Utc::now());
        let stored = self.store.insert(record)?;
        info!(session = %stored.id, "intake session started");
        Ok(SessionView::build(&self.flow, &stored))
    }

    pub fn view(&self, id: &SessionId) -> Result<SessionView, SessionServiceError> {
        let record = self.load(id)?;
        Ok(SessionView::build(&self.flow, &record))
    }

    /// Submit one raw answer for the pending question.
    pub fn submit(
        &self,
        id: &SessionId,
        raw: RawAnswer,
    ) -> Result<SubmissionView, SessionServiceError> {
        let flow = &self.flow;
        let (outcome, session) = self
            .store
            .modify(id, |record| {
                let outcome = flow.submit(&mut record.state, raw)?;
                record.updated_at = Utc::now();
                Ok::<_, FlowError>((outcome, SessionView::build(flow, record)))
            })?
            .ok_or_else(|| SessionServiceError::NotFound(id.clone()))??;

        if session.complete && outcome.is_accepted() {
            info!(session = %id, "intake session complete");
        }

        Ok(SubmissionView { outcome, session })
    }

    pub fn reset(&self, id: &SessionId) -> Result<SessionView, SessionServiceError> {
        let flow = &self.flow;
        let view = self
            .store
            .modify(id, |record| {
                flow.reset(&mut record.state);
                record.updated_at = Utc::now();
                SessionView::build(flow, record)
            })?
            .ok_or_else(|| SessionServiceError::NotFound(id.clone()))?;
        info!(session = %id, "intake session reset");
        Ok(view)
    }

    pub fn summary(&self, id: &SessionId) -> Result<SessionSummary, SessionServiceError> {
        let record = self.load(id)?;
        let summary = SessionSummary::build(&self.flow, &self.assembler, &record.state)?;
        Ok(summary)
    }

    /// Assemble features for a complete session and run the predictor.
    pub fn predict(&self, id: &SessionId) -> Result<PredictionView, SessionServiceError> {
        let record = self.load(id)?;
        let features = self.assembler.assemble_session(&record.state)?;
        let prediction = prediction::predict(self.predictor.as_ref(), &features)?;
        info!(session = %record.id, label = prediction.label(), "prediction produced");

        Ok(PredictionView {
            session_id: record.id,
            label: prediction.label(),
            prediction,
            message: prediction.message(),
            features,
        })
    }

    pub fn end(&self, id: &SessionId) -> Result<(), SessionServiceError> {
        self.store.remove(id).map_err(|err| match err {
            StoreError::NotFound => SessionServiceError::NotFound(id.clone()),
            other => SessionServiceError::Store(other),
        })?;
        info!(session = %id, "intake session ended");
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<SessionRecord, SessionServiceError> {
        self.store
            .fetch(id)?
            .ok_or_else(|| SessionServiceError::NotFound(id.clone()))
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum SessionServiceError {
    #[error("session '{0}' not found")]
    NotFound(SessionId),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
