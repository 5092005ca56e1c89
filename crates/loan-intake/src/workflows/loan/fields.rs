use std::collections::HashSet;

use serde::Serialize;

use super::session::AnswerValue;

/// Field keys as they appear in the interview and in the model-facing feature record.
pub mod keys {
    pub const ID: &str = "ID";
    pub const AGE: &str = "Age";
    pub const GENDER: &str = "Gender";
    pub const EXPERIENCE: &str = "Experience";
    pub const INCOME: &str = "Income";
    pub const ZIP_CODE: &str = "ZIP Code";
    pub const FAMILY: &str = "Family";
    pub const CC_AVG: &str = "CCAvg";
    pub const EDUCATION: &str = "Education";
    pub const MORTGAGE: &str = "Mortgage";
    pub const HOME_OWNERSHIP: &str = "Home Ownership";
    pub const SECURITIES_ACCOUNT: &str = "Securities Account";
    pub const CD_ACCOUNT: &str = "CD Account";
    pub const ONLINE: &str = "Online";
    pub const CREDIT_CARD: &str = "CreditCard";
}

/// System message used whenever an answer is missing or blank.
pub const EMPTY_INPUT_MESSAGE: &str = "Please provide a valid response.";

const BINARY_OPTIONS: &[&str] = &["0", "1"];

/// Numeric type a bounded field stores its answer as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberKind {
    Integer,
    Decimal,
}

/// Range and pre-filled value for a bounded numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub number: NumberKind,
}

impl NumericBounds {
    pub fn integer(min: i64, max: i64, default: i64) -> Self {
        Self {
            min: min as f64,
            max: max as f64,
            default: default as f64,
            number: NumberKind::Integer,
        }
    }

    pub fn decimal(min: f64, max: f64, default: f64) -> Self {
        Self {
            min,
            max,
            default,
            number: NumberKind::Decimal,
        }
    }

    fn is_well_formed(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && (self.min..=self.max).contains(&self.default)
    }

    /// Clamp into range and convert to the declared numeric type. Out-of-range input is
    /// clamped, never rejected; only non-finite input yields `None`.
    pub fn coerce(&self, value: f64) -> Option<AnswerValue> {
        if !value.is_finite() {
            return None;
        }

        let clamped = value.clamp(self.min, self.max);
        Some(match self.number {
            NumberKind::Integer => AnswerValue::Integer(clamped.round() as i64),
            NumberKind::Decimal => AnswerValue::Decimal(clamped),
        })
    }

    pub fn default_value(&self) -> AnswerValue {
        match self.number {
            NumberKind::Integer => AnswerValue::Integer(self.default.round() as i64),
            NumberKind::Decimal => AnswerValue::Decimal(self.default),
        }
    }
}

/// How a field's answer is captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    FreeText,
    BoundedNumber(NumericBounds),
}

/// Declarative acceptance rule applied to the textual form of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    Digits,
    DigitsOfLength { length: usize },
    DigitsInRange { min: u64, max: u64 },
    OneOf { options: &'static [&'static str] },
}

impl FieldRule {
    pub fn accepts(&self, raw: &str) -> bool {
        match self {
            FieldRule::Digits => all_digits(raw),
            FieldRule::DigitsOfLength { length } => all_digits(raw) && raw.len() == *length,
            FieldRule::DigitsInRange { min, max } => {
                all_digits(raw)
                    && raw
                        .parse::<u64>()
                        .map(|value| (*min..=*max).contains(&value))
                        .unwrap_or(false)
            }
            FieldRule::OneOf { options } => options.iter().any(|option| *option == raw),
        }
    }

    pub fn options(&self) -> Option<&'static [&'static str]> {
        match self {
            FieldRule::OneOf { options } => Some(*options),
            _ => None,
        }
    }
}

fn all_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit())
}

/// One question of the interview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub prompt: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<FieldRule>,
    pub error_message: &'static str,
}

impl FieldSpec {
    pub fn numeric_bounds(&self) -> Option<&NumericBounds> {
        match &self.kind {
            FieldKind::BoundedNumber(bounds) => Some(bounds),
            FieldKind::FreeText => None,
        }
    }

    /// Pre-filled answer a shell may submit when the user accepts the default.
    pub fn default_input(&self) -> Option<String> {
        self.numeric_bounds()
            .map(|bounds| bounds.default_value().to_string())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FieldKind::BoundedNumber(_))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("duplicate field key '{0}' in interview script")]
    DuplicateKey(&'static str),
    #[error("field '{0}' declares invalid numeric bounds")]
    InvalidBounds(&'static str),
}

/// Ordered, immutable sequence of fields; the order is the interview order.
#[derive(Debug, Clone)]
pub struct InterviewScript {
    fields: Vec<FieldSpec>,
}

impl InterviewScript {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, ScriptError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.key) {
                return Err(ScriptError::DuplicateKey(field.key));
            }
            if let Some(bounds) = field.numeric_bounds() {
                if !bounds.is_well_formed() {
                    return Err(ScriptError::InvalidBounds(field.key));
                }
            }
        }

        Ok(Self { fields })
    }

    pub fn standard() -> Self {
        Self {
            fields: standard_fields(),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, position: usize) -> Option<&FieldSpec> {
        self.fields.get(position)
    }

    pub fn find(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn text(
    key: &'static str,
    prompt: &'static str,
    rule: FieldRule,
    error_message: &'static str,
) -> FieldSpec {
    FieldSpec {
        key,
        prompt,
        kind: FieldKind::FreeText,
        rule: Some(rule),
        error_message,
    }
}

fn bounded(
    key: &'static str,
    prompt: &'static str,
    bounds: NumericBounds,
    error_message: &'static str,
) -> FieldSpec {
    FieldSpec {
        key,
        prompt,
        kind: FieldKind::BoundedNumber(bounds),
        rule: None,
        error_message,
    }
}

fn standard_fields() -> Vec<FieldSpec> {
    vec![
        text(
            keys::ID,
            "Please enter your ID:",
            FieldRule::Digits,
            "ID must be a number.",
        ),
        bounded(
            keys::AGE,
            "Please enter your age:",
            NumericBounds::integer(16, 130, 25),
            "Age must be a number.",
        ),
        text(
            keys::GENDER,
            "Please enter your gender (M/F/O):",
            FieldRule::OneOf {
                options: &["M", "F", "O"],
            },
            "Gender must be M, F, or O.",
        ),
        bounded(
            keys::EXPERIENCE,
            "Please enter your experience (years):",
            NumericBounds::integer(0, 50, 1),
            "Experience must be a number.",
        ),
        bounded(
            keys::INCOME,
            "Please enter your income (in 1000s) per annum:",
            NumericBounds::integer(0, 500, 49),
            "Income must be a number.",
        ),
        text(
            keys::ZIP_CODE,
            "Please enter your ZIP Code:",
            FieldRule::DigitsOfLength { length: 5 },
            "ZIP Code must be a 5-digit number.",
        ),
        text(
            keys::FAMILY,
            "Please select your family size:",
            FieldRule::DigitsInRange { min: 1, max: 4 },
            "Family size must be between 1 and 4.",
        ),
        bounded(
            keys::CC_AVG,
            "Please enter your CCAvg (Credit Card Average Usage):",
            NumericBounds::decimal(0.0, 20.0, 1.6),
            "CCAvg must be a number.",
        ),
        text(
            keys::EDUCATION,
            "Please select your education level (1/2/3):",
            FieldRule::OneOf {
                options: &["1", "2", "3"],
            },
            "Education level must be 1, 2, or 3.",
        ),
        bounded(
            keys::MORTGAGE,
            "Please enter your mortgage value:",
            NumericBounds::integer(0, 1000, 0),
            "Mortgage must be a number.",
        ),
        text(
            keys::HOME_OWNERSHIP,
            "Please select your home ownership status (Home Owner/Rent/Home Mortgage):",
            FieldRule::OneOf {
                options: &["Home Owner", "Rent", "Home Mortgage"],
            },
            "Home Ownership must be Home Owner, Rent, or Home Mortgage.",
        ),
        text(
            keys::SECURITIES_ACCOUNT,
            "Do you have a securities account? (0 for No, 1 for Yes):",
            FieldRule::OneOf {
                options: BINARY_OPTIONS,
            },
            "Securities Account must be 0 or 1.",
        ),
        text(
            keys::CD_ACCOUNT,
            "Do you have a CD account? (0 for No, 1 for Yes):",
            FieldRule::OneOf {
                options: BINARY_OPTIONS,
            },
            "CD Account must be 0 or 1.",
        ),
        text(
            keys::ONLINE,
            "Do you use online banking? (0 for No, 1 for Yes):",
            FieldRule::OneOf {
                options: BINARY_OPTIONS,
            },
            "Online Banking must be 0 or 1.",
        ),
        text(
            keys::CREDIT_CARD,
            "Do you have a credit card? (0 for No, 1 for Yes):",
            FieldRule::OneOf {
                options: BINARY_OPTIONS,
            },
            "Credit Card must be 0 or 1.",
        ),
    ]
}
