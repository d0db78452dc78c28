//! Modal loan form: open/closed lifecycle, field edits by name, and the
//! submit guard that turns the draft into a [`LoanTimelineRequest`].

use std::{fmt, str::FromStr};

use shared::{
    domain::{FamilySize, LoanType, RepaymentPlan},
    error::ParseChoiceError,
    protocol::LoanTimelineRequest,
};

use crate::error::FormError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanField {
    Name,
    Income,
    FamilySize,
    LoanBalance,
    LoanType,
    CurrentPlan,
}

impl LoanField {
    pub const ALL: [LoanField; 6] = [
        LoanField::Name,
        LoanField::Income,
        LoanField::FamilySize,
        LoanField::LoanBalance,
        LoanField::LoanType,
        LoanField::CurrentPlan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoanField::Name => "name",
            LoanField::Income => "income",
            LoanField::FamilySize => "family_size",
            LoanField::LoanBalance => "loan_balance",
            LoanField::LoanType => "loan_type",
            LoanField::CurrentPlan => "current_plan",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanField::Name => "Full Name",
            LoanField::Income => "Annual Income",
            LoanField::FamilySize => "Family Size",
            LoanField::LoanBalance => "Total Loan Balance",
            LoanField::LoanType => "Loan Type",
            LoanField::CurrentPlan => "Current Repayment Plan",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            LoanField::Name | LoanField::Income | LoanField::LoanBalance
        )
    }
}

impl FromStr for LoanField {
    type Err = FormError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        LoanField::ALL
            .into_iter()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| FormError::UnknownField(value.to_string()))
    }
}

impl fmt::Display for LoanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values as entered. Free-text fields stay strings until submit; choice
/// fields always hold a valid value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanDraft {
    pub name: String,
    pub income: String,
    pub family_size: FamilySize,
    pub loan_balance: String,
    pub loan_type: LoanType,
    pub current_plan: RepaymentPlan,
}

impl LoanDraft {
    pub fn set(&mut self, field: LoanField, value: &str) -> Result<(), FormError> {
        let invalid = |source: ParseChoiceError| FormError::InvalidChoice { field, source };
        match field {
            LoanField::Name => self.name = value.to_string(),
            LoanField::Income => self.income = value.to_string(),
            LoanField::LoanBalance => self.loan_balance = value.to_string(),
            LoanField::FamilySize => self.family_size = value.parse().map_err(invalid)?,
            LoanField::LoanType => self.loan_type = value.parse().map_err(invalid)?,
            LoanField::CurrentPlan => self.current_plan = value.parse().map_err(invalid)?,
        }
        Ok(())
    }

    pub fn value(&self, field: LoanField) -> String {
        match field {
            LoanField::Name => self.name.clone(),
            LoanField::Income => self.income.clone(),
            LoanField::FamilySize => self.family_size.to_string(),
            LoanField::LoanBalance => self.loan_balance.clone(),
            LoanField::LoanType => self.loan_type.to_string(),
            LoanField::CurrentPlan => self.current_plan.to_string(),
        }
    }

    pub fn missing_required(&self) -> Vec<LoanField> {
        LoanField::ALL
            .into_iter()
            .filter(|field| field.is_required() && self.value(*field).trim().is_empty())
            .collect()
    }

    /// Applies the submit guard and parses the numeric fields.
    pub fn to_request(&self) -> Result<LoanTimelineRequest, FormError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(FormError::MissingRequired(missing));
        }

        Ok(LoanTimelineRequest {
            name: self.name.trim().to_string(),
            income: parse_amount(LoanField::Income, &self.income)?,
            family_size: self.family_size,
            loan_balance: parse_amount(LoanField::LoanBalance, &self.loan_balance)?,
            loan_type: self.loan_type,
            current_plan: self.current_plan,
        })
    }
}

/// Re-checks a request built outside the form against the same guard.
pub fn validate_request(request: &LoanTimelineRequest) -> Result<(), FormError> {
    if request.name.trim().is_empty() {
        return Err(FormError::MissingRequired(vec![LoanField::Name]));
    }
    for (field, amount) in [
        (LoanField::Income, request.income),
        (LoanField::LoanBalance, request.loan_balance),
    ] {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(FormError::InvalidAmount {
                field,
                value: amount.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_amount(field: LoanField, raw: &str) -> Result<f64, FormError> {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(FormError::InvalidAmount {
            field,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Closed,
    Open,
}

/// The draft is kept across cancel and reopen; only a successful submit
/// hands a request to the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct LoanForm {
    phase: FormPhase,
    draft: LoanDraft,
}

impl LoanForm {
    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == FormPhase::Open
    }

    pub fn draft(&self) -> &LoanDraft {
        &self.draft
    }

    pub fn open(&mut self) {
        self.phase = FormPhase::Open;
    }

    /// Returns whether the form was open.
    pub fn cancel(&mut self) -> bool {
        self.close()
    }

    pub(crate) fn close(&mut self) -> bool {
        std::mem::replace(&mut self.phase, FormPhase::Closed) == FormPhase::Open
    }

    pub fn edit(&mut self, field_name: &str, value: &str) -> Result<(), FormError> {
        let field = field_name.parse::<LoanField>()?;
        self.draft.set(field, value)
    }

    /// `Ok(None)` when the form is not open. On a guard failure the form
    /// stays open.
    pub fn submit(&mut self) -> Result<Option<LoanTimelineRequest>, FormError> {
        if !self.is_open() {
            return Ok(None);
        }
        let request = self.draft.to_request()?;
        self.phase = FormPhase::Closed;
        Ok(Some(request))
    }
}

#[cfg(test)]
#[path = "tests/loan_form_tests.rs"]
mod tests;
