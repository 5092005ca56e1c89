use std::io::Write;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::fields::{keys, InterviewScript};
use super::session::{AnswerValue, Answers, SessionState};

/// Code assigned to categorical answers missing from an encoding table.
pub const UNKNOWN_CATEGORY_CODE: i64 = 3;

/// Fields kept in the session summary but never handed to the predictor.
pub const EXCLUDED_KEYS: [&str; 2] = [keys::ID, keys::ZIP_CODE];

/// Text-to-code table for one categorical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalEncoding {
    pub key: &'static str,
    pub codes: &'static [(&'static str, i64)],
    pub fallback: i64,
}

impl CategoricalEncoding {
    pub fn encode(&self, value: &str) -> i64 {
        self.codes
            .iter()
            .find(|(label, _)| *label == value)
            .map(|(_, code)| *code)
            .unwrap_or(self.fallback)
    }
}

pub const GENDER_ENCODING: CategoricalEncoding = CategoricalEncoding {
    key: keys::GENDER,
    codes: &[("M", 1), ("F", 2), ("O", 3)],
    fallback: UNKNOWN_CATEGORY_CODE,
};

pub const HOME_OWNERSHIP_ENCODING: CategoricalEncoding = CategoricalEncoding {
    key: keys::HOME_OWNERSHIP,
    codes: &[("Home Owner", 1), ("Rent", 2), ("Home Mortgage", 3)],
    fallback: UNKNOWN_CATEGORY_CODE,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Decimal(f64),
}

impl FeatureValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FeatureValue::Integer(value) => value as f64,
            FeatureValue::Decimal(value) => value,
        }
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Integer(value) => write!(f, "{value}"),
            FeatureValue::Decimal(value) => write!(f, "{value:?}"),
        }
    }
}

/// Model-facing feature vector, ordered as the interview script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    entries: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRecord {
    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| *value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FeatureValue)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write a header row of feature names followed by a single value row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(self.names())?;
        csv_writer.write_record(self.entries.iter().map(|(_, value)| value.to_string()))?;
        csv_writer.flush()?;
        Ok(())
    }
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    #[error("session incomplete: no answer collected for '{key}'")]
    IncompleteSession { key: &'static str },
    #[error("answer for '{key}' is not numeric: {value}")]
    NonNumeric { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
enum ColumnSource {
    Passthrough,
    Categorical(CategoricalEncoding),
}

#[derive(Debug, Clone)]
struct Column {
    key: &'static str,
    source: ColumnSource,
}

/// Turns a complete set of answers into a `FeatureRecord`. Performs no validation.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    required: Vec<&'static str>,
    columns: Vec<Column>,
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::standard()
    }
}

impl FeatureAssembler {
    pub fn new(
        script: &InterviewScript,
        encodings: &[CategoricalEncoding],
        excluded: &[&str],
    ) -> Self {
        let required: Vec<&'static str> = script.keys().collect();
        let columns = required
            .iter()
            .copied()
            .filter(|key| !excluded.contains(key))
            .map(|key| Column {
                key,
                source: encodings
                    .iter()
                    .find(|encoding| encoding.key == key)
                    .cloned()
                    .map(ColumnSource::Categorical)
                    .unwrap_or(ColumnSource::Passthrough),
            })
            .collect();

        Self { required, columns }
    }

    pub fn for_script(script: &InterviewScript) -> Self {
        Self::new(
            script,
            &[GENDER_ENCODING, HOME_OWNERSHIP_ENCODING],
            &EXCLUDED_KEYS,
        )
    }

    pub fn standard() -> Self {
        Self::for_script(&InterviewScript::standard())
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.key).collect()
    }

    pub fn assemble(&self, answers: &Answers) -> Result<FeatureRecord, AssemblyError> {
        if let Some(key) = self
            .required
            .iter()
            .find(|key| !answers.contains_key(key))
        {
            return Err(AssemblyError::IncompleteSession { key: *key });
        }

        let mut entries = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let answer = answers
                .get(column.key)
                .ok_or(AssemblyError::IncompleteSession { key: column.key })?;
            let value = match &column.source {
                ColumnSource::Categorical(encoding) => {
                    FeatureValue::Integer(encoding.encode(&answer.to_string()))
                }
                ColumnSource::Passthrough => numeric(column.key, answer)?,
            };
            entries.push((column.key, value));
        }

        Ok(FeatureRecord { entries })
    }

    /// Assemble from a session, refusing sessions that have not reached the end of the script.
    pub fn assemble_session(&self, state: &SessionState) -> Result<FeatureRecord, AssemblyError> {
        if let Some(key) = self.required.get(state.position()) {
            return Err(AssemblyError::IncompleteSession { key: *key });
        }
        self.assemble(state.answers())
    }
}

fn numeric(key: &'static str, answer: &AnswerValue) -> Result<FeatureValue, AssemblyError> {
    match answer {
        AnswerValue::Integer(value) => Ok(FeatureValue::Integer(*value)),
        AnswerValue::Decimal(value) => Ok(FeatureValue::Decimal(*value)),
        AnswerValue::Text(text) => {
            let trimmed = text.trim();
            if let Ok(value) = trimmed.parse::<i64>() {
                Ok(FeatureValue::Integer(value))
            } else if let Ok(value) = trimmed.parse::<f64>() {
                Ok(FeatureValue::Decimal(value))
            } else {
                Err(AssemblyError::NonNumeric {
                    key,
                    value: text.clone(),
                })
            }
        }
    }
}
