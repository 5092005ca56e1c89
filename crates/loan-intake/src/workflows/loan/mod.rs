//! Guided loan application intake.
//!
//! An [`InterviewScript`] fixes the ordered questions and their acceptance rules, the
//! [`FlowController`] walks a caller-owned [`SessionState`] through them one answer at a time,
//! and the [`FeatureAssembler`] turns a finished session into the [`FeatureRecord`] handed to a
//! [`Predictor`].

pub mod batch;
pub mod features;
pub mod fields;
pub mod flow;
pub mod prediction;
pub mod repository;
pub mod router;
pub mod scorecard;
pub mod service;
pub mod session;
pub mod views;

#[cfg(test)]
mod tests;

pub use batch::{BatchError, BatchRow, BatchScorer, BatchStatus, BatchSummary};
pub use features::{
    AssemblyError, CategoricalEncoding, FeatureAssembler, FeatureRecord, FeatureValue,
    EXCLUDED_KEYS, GENDER_ENCODING, HOME_OWNERSHIP_ENCODING, UNKNOWN_CATEGORY_CODE,
};
pub use fields::{
    keys, FieldKind, FieldRule, FieldSpec, InterviewScript, NumberKind, NumericBounds,
    ScriptError, EMPTY_INPUT_MESSAGE,
};
pub use flow::{FlowController, FlowError, Outcome, RawAnswer, RejectionReason};
pub use prediction::{predict, LoanPrediction, PredictionError, Predictor, PredictorError};
pub use repository::{SessionId, SessionRecord, SessionStore, StoreError};
pub use router::{intake_router, SubmitAnswerRequest};
pub use scorecard::{
    ScoreContribution, ScorecardConfig, ScorecardError, ScorecardEvaluation, ScorecardPredictor,
};
pub use service::{LoanIntakeService, SessionServiceError};
pub use session::{AnswerValue, Answers, SessionState, Speaker, TranscriptEntry};
pub use views::{FieldPrompt, PredictionView, SessionSummary, SessionView, SubmissionView};
