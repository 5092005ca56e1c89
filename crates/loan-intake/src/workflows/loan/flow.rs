use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::fields::{keys, FieldKind, FieldSpec, InterviewScript, EMPTY_INPUT_MESSAGE};
use super::session::{AnswerValue, SessionState};

/// Answer exactly as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Number(f64),
    Text(String),
}

impl RawAnswer {
    pub fn is_blank(&self) -> bool {
        match self {
            RawAnswer::Number(_) => false,
            RawAnswer::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawAnswer::Text(text) => Cow::Borrowed(text.as_str()),
            RawAnswer::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                Cow::Owned(format!("{}", *value as i64))
            }
            RawAnswer::Number(value) => Cow::Owned(value.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawAnswer::Number(value) => Some(*value),
            RawAnswer::Text(text) => text.trim().parse::<f64>().ok(),
        }
    }
}

impl From<&str> for RawAnswer {
    fn from(value: &str) -> Self {
        RawAnswer::Text(value.to_string())
    }
}

impl From<String> for RawAnswer {
    fn from(value: String) -> Self {
        RawAnswer::Text(value)
    }
}

impl From<f64> for RawAnswer {
    fn from(value: f64) -> Self {
        RawAnswer::Number(value)
    }
}

impl From<i64> for RawAnswer {
    fn from(value: i64) -> Self {
        RawAnswer::Number(value as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    EmptyInput,
    ValidationFailed,
}

/// Result of one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Accepted {
        key: &'static str,
        value: AnswerValue,
    },
    Rejected {
        reason: RejectionReason,
        message: &'static str,
    },
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Outcome::Accepted { .. } => None,
            Outcome::Rejected { message, .. } => Some(message),
        }
    }
}

/// Precondition violations; these are caller bugs, not user mistakes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("interview is already complete ({answered} answers collected)")]
    SessionComplete { answered: usize },
}

/// Drives an interview one field at a time, advancing only on valid input.
#[derive(Debug, Clone)]
pub struct FlowController {
    script: InterviewScript,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::standard()
    }
}

impl FlowController {
    pub fn new(script: InterviewScript) -> Self {
        Self { script }
    }

    pub fn standard() -> Self {
        Self::new(InterviewScript::standard())
    }

    pub fn script(&self) -> &InterviewScript {
        &self.script
    }

    /// The field awaiting an answer, or `None` once every field is collected.
    pub fn current_field(&self, state: &SessionState) -> Option<&FieldSpec> {
        self.script.field(state.position())
    }

    pub fn is_complete(&self, state: &SessionState) -> bool {
        state.position() >= self.script.len()
    }

    pub fn submit(
        &self,
        state: &mut SessionState,
        raw: impl Into<RawAnswer>,
    ) -> Result<Outcome, FlowError> {
        let field = self
            .current_field(state)
            .ok_or(FlowError::SessionComplete {
                answered: state.position(),
            })?;
        let raw = raw.into();

        let outcome = match evaluate(field, &raw) {
            Ok(value) => {
                state.record_answer(field.key, value.clone(), raw.as_text().into_owned());
                Outcome::Accepted {
                    key: field.key,
                    value,
                }
            }
            Err(reason) => {
                let message = match reason {
                    RejectionReason::EmptyInput => EMPTY_INPUT_MESSAGE,
                    RejectionReason::ValidationFailed => field.error_message,
                };
                state.record_system_message(message);
                Outcome::Rejected { reason, message }
            }
        };

        if is_identifying(field.key) {
            debug!(
                field = field.key,
                accepted = outcome.is_accepted(),
                "answer evaluated"
            );
        } else {
            debug!(
                field = field.key,
                accepted = outcome.is_accepted(),
                raw = %raw.as_text(),
                "answer evaluated"
            );
        }

        Ok(outcome)
    }

    /// Start over: position zero, no answers, empty transcript.
    pub fn reset(&self, state: &mut SessionState) {
        *state = SessionState::new();
    }
}

fn is_identifying(key: &str) -> bool {
    key == keys::ID || key == keys::ZIP_CODE
}

fn evaluate(field: &FieldSpec, raw: &RawAnswer) -> Result<AnswerValue, RejectionReason> {
    if raw.is_blank() {
        return Err(RejectionReason::EmptyInput);
    }

    let text = raw.as_text();
    if let Some(rule) = &field.rule {
        if !rule.accepts(&text) {
            return Err(RejectionReason::ValidationFailed);
        }
    }

    match &field.kind {
        FieldKind::BoundedNumber(bounds) => raw
            .as_number()
            .and_then(|value| bounds.coerce(value))
            .ok_or(RejectionReason::ValidationFailed),
        FieldKind::FreeText => Ok(AnswerValue::Text(text.into_owned())),
    }
}
