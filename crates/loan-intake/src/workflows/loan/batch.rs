use std::collections::HashMap;
use std::io::{Read, Write};

use serde::Serialize;
use tracing::{debug, info};

use super::features::{AssemblyError, FeatureAssembler};
use super::flow::{FlowController, FlowError, Outcome};
use super::prediction::{self, Predictor};
use super::session::SessionState;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read applicant CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applicant CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("applicant CSV is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Predicted,
    Rejected,
    Error,
}

/// One output line per applicant row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRow {
    pub row: usize,
    pub status: BatchStatus,
    pub field: Option<&'static str>,
    pub label: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub predicted: usize,
    pub rejected: usize,
    pub errored: usize,
}

impl BatchSummary {
    fn record(&mut self, status: BatchStatus) {
        self.total += 1;
        match status {
            BatchStatus::Predicted => self.predicted += 1,
            BatchStatus::Rejected => self.rejected += 1,
            BatchStatus::Error => self.errored += 1,
        }
    }
}

/// Scores a CSV of applicants by replaying each row through a fresh interview session, so
/// rows get exactly the validation an interactive applicant would.
pub struct BatchScorer<'a, P: ?Sized> {
    flow: &'a FlowController,
    assembler: &'a FeatureAssembler,
    predictor: &'a P,
}

impl<'a, P: Predictor + ?Sized> BatchScorer<'a, P> {
    pub fn new(flow: &'a FlowController, assembler: &'a FeatureAssembler, predictor: &'a P) -> Self {
        Self {
            flow,
            assembler,
            predictor,
        }
    }

    pub fn score<R: Read, W: Write>(
        &self,
        reader: R,
        writer: W,
    ) -> Result<BatchSummary, BatchError> {
        // Cells are validated as typed; short rows reach the interview as blank answers.
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let columns: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name, index))
            .collect();

        let mut indices = Vec::with_capacity(self.flow.script().len());
        for key in self.flow.script().keys() {
            let index = columns
                .get(key)
                .copied()
                .ok_or(BatchError::MissingColumn(key))?;
            indices.push(index);
        }

        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut summary = BatchSummary::default();

        for (offset, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = self.score_row(offset + 1, &record, &indices)?;
            debug!(row = row.row, status = ?row.status, "applicant row scored");
            summary.record(row.status);
            csv_writer.serialize(&row)?;
        }

        csv_writer.flush()?;
        info!(
            total = summary.total,
            predicted = summary.predicted,
            rejected = summary.rejected,
            errored = summary.errored,
            "batch scoring finished"
        );
        Ok(summary)
    }

    fn score_row(
        &self,
        row: usize,
        record: &csv::StringRecord,
        indices: &[usize],
    ) -> Result<BatchRow, BatchError> {
        let mut state = SessionState::new();

        for index in indices {
            let raw = record.get(*index).unwrap_or_default();
            if let Outcome::Rejected { message, .. } = self.flow.submit(&mut state, raw)? {
                return Ok(BatchRow {
                    row,
                    status: BatchStatus::Rejected,
                    field: self.flow.current_field(&state).map(|field| field.key),
                    label: None,
                    message: message.to_string(),
                });
            }
        }

        let features = self.assembler.assemble_session(&state)?;
        Ok(match prediction::predict(self.predictor, &features) {
            Ok(prediction) => BatchRow {
                row,
                status: BatchStatus::Predicted,
                field: None,
                label: Some(prediction.label()),
                message: prediction.message().to_string(),
            },
            Err(err) => BatchRow {
                row,
                status: BatchStatus::Error,
                field: None,
                label: None,
                message: err.to_string(),
            },
        })
    }
}
