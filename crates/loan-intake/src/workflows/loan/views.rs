use serde::Serialize;

use super::features::{AssemblyError, FeatureAssembler, FeatureRecord};
use super::fields::{FieldKind, FieldSpec};
use super::flow::{FlowController, Outcome};
use super::prediction::LoanPrediction;
use super::repository::{SessionId, SessionRecord};
use super::session::{Answers, SessionState, TranscriptEntry};

/// What a display surface needs to render the pending question.
#[derive(Debug, Clone, Serialize)]
pub struct FieldPrompt {
    pub key: &'static str,
    pub prompt: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'static [&'static str]>,
}

impl From<&FieldSpec> for FieldPrompt {
    fn from(field: &FieldSpec) -> Self {
        Self {
            key: field.key,
            prompt: field.prompt,
            kind: field.kind,
            default_input: field.default_input(),
            options: field.rule.as_ref().and_then(|rule| rule.options()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub position: usize,
    pub total_fields: usize,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_field: Option<FieldPrompt>,
    pub transcript: Vec<TranscriptEntry>,
}

impl SessionView {
    pub fn build(flow: &FlowController, record: &SessionRecord) -> Self {
        Self {
            session_id: record.id.clone(),
            position: record.state.position(),
            total_fields: flow.script().len(),
            complete: flow.is_complete(&record.state),
            current_field: flow.current_field(&record.state).map(FieldPrompt::from),
            transcript: record.state.transcript().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionView {
    pub outcome: Outcome,
    pub session: SessionView,
}

/// "Here is the summary of your inputs": every answer, identifying fields included, plus the
/// feature record once the interview is complete.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub complete: bool,
    pub answers: Answers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureRecord>,
}

impl SessionSummary {
    pub fn build(
        flow: &FlowController,
        assembler: &FeatureAssembler,
        state: &SessionState,
    ) -> Result<Self, AssemblyError> {
        let complete = flow.is_complete(state);
        let features = if complete {
            Some(assembler.assemble_session(state)?)
        } else {
            None
        };

        Ok(Self {
            complete,
            answers: state.answers().clone(),
            features,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub session_id: SessionId,
    pub label: i64,
    pub prediction: LoanPrediction,
    pub message: &'static str,
    pub features: FeatureRecord,
}
