use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseChoiceError;

/// Tool names attached to every timeline produced through the loan form.
pub const COMPLETE_FORM_TOOL: &str = "complete_form_tool";
pub const TIMELINE_TOOL: &str = "timeline_tool";

macro_rules! choice_enum {
    ($name:ident, $kind:literal, { $($variant:ident => ($wire:literal, $label:literal)),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire value, as sent to the backend.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseChoiceError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(ParseChoiceError::new($kind, value)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

choice_enum!(Role, "role", {
    User => ("user", "You"),
    Assistant => ("assistant", "Assistant"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    #[default]
    Federal,
    Private,
    Mixed,
}

choice_enum!(LoanType, "loan type", {
    Federal => ("federal", "Federal"),
    Private => ("private", "Private"),
    Mixed => ("mixed", "Mixed"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentPlan {
    #[default]
    Standard,
    Save,
    Paye,
    Ibr,
    Icr,
}

choice_enum!(RepaymentPlan, "repayment plan", {
    Standard => ("standard", "Standard"),
    Save => ("save", "SAVE"),
    Paye => ("paye", "PAYE"),
    Ibr => ("ibr", "IBR"),
    Icr => ("icr", "ICR"),
});

/// Household size reported on the loan form. Always at least one person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FamilySize(u32);

impl FamilySize {
    /// Largest value offered as a form choice; it stands for "or more".
    pub const MAX_CHOICE: u32 = 5;

    pub fn new(value: u32) -> Option<Self> {
        (value >= 1).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn label(self) -> String {
        match self.0 {
            1 => "1 person".to_string(),
            n if n >= Self::MAX_CHOICE => format!("{}+ people", Self::MAX_CHOICE),
            n => format!("{n} people"),
        }
    }

    /// Choices presented by the form.
    pub fn choices() -> impl Iterator<Item = FamilySize> {
        (1..=Self::MAX_CHOICE).map(FamilySize)
    }
}

impl Default for FamilySize {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u32> for FamilySize {
    type Error = ParseChoiceError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| ParseChoiceError::new("family size", value.to_string()))
    }
}

impl From<FamilySize> for u32 {
    fn from(value: FamilySize) -> Self {
        value.0
    }
}

impl FromStr for FamilySize {
    type Err = ParseChoiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParseChoiceError::new("family size", value))
    }
}

impl fmt::Display for FamilySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
