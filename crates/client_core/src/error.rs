use shared::error::ParseChoiceError;
use thiserror::Error;

use crate::loan_form::LoanField;

/// Prompt shown when the loan form is submitted without its required fields.
pub const MISSING_FIELDS_PROMPT: &str =
    "Please fill in all required fields (Name, Income, and Loan Balance)";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    /// A caller addressed a field the form does not have.
    #[error("unknown loan form field '{0}'")]
    UnknownField(String),
    #[error("invalid value for {field}: {source}")]
    InvalidChoice {
        field: LoanField,
        #[source]
        source: ParseChoiceError,
    },
    #[error("{}", MISSING_FIELDS_PROMPT)]
    MissingRequired(Vec<LoanField>),
    #[error("{field} must be a positive amount, got '{value}'")]
    InvalidAmount { field: LoanField, value: String },
}

impl FormError {
    /// Validation failures the user can fix by editing the form, as opposed to
    /// programming errors from the caller.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            FormError::MissingRequired(_)
                | FormError::InvalidAmount { .. }
                | FormError::InvalidChoice { .. }
        )
    }
}

/// Opaque failure of a backend call. Transport errors, timeouts and non-2xx
/// responses all collapse into this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("backend call failed: {reason}")]
pub struct BackendFailure {
    pub reason: String,
}

impl BackendFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for BackendFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}
