use serde::{Deserialize, Serialize};

use crate::models::{Currencies, PayUnit, State};

/// Every state transition the store understands, mirroring the dispatch
/// messages the shell sends: `{"type": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    AddCelery,
    RemoveCelery {
        id: String,
    },
    SetName {
        id: String,
        data: String,
    },
    SetInputValue {
        id: String,
        #[serde(deserialize_with = "lenient_number")]
        data: f64,
    },
    SetInputMeasurement {
        id: String,
        data: PayUnit,
    },
    SetInputCurrency {
        id: String,
        data: String,
    },
    SetCommitmentValue {
        id: String,
        #[serde(flatten)]
        update: CommitmentUpdate,
    },
    SetRating {
        id: String,
        #[serde(rename = "subID")]
        rating_type_id: String,
        data: f64,
    },
    SetRatingTypeName {
        id: String,
        data: String,
    },
    AddRatingType {
        id: String,
        data: String,
    },
    DeleteRatingType {
        id: String,
    },
    SetMin {
        #[serde(deserialize_with = "lenient_number")]
        data: f64,
    },
    SetDesired {
        #[serde(deserialize_with = "lenient_number")]
        data: f64,
    },
    SetCurrencies {
        data: Currencies,
    },
    SetBaseCurrency {
        data: String,
    },
    SetStore {
        data: State,
    },
    ResetStore,
}

impl Action {
    /// The entry an update depends on, when the action modifies one in
    /// place. Removal is not included: removing an absent entry stays an
    /// idempotent success rather than an error.
    pub fn celery_id(&self) -> Option<&str> {
        match self {
            Self::SetName { id, .. }
            | Self::SetInputValue { id, .. }
            | Self::SetInputMeasurement { id, .. }
            | Self::SetInputCurrency { id, .. }
            | Self::SetCommitmentValue { id, .. }
            | Self::SetRating { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Field-level update to an entry's commitment, tagged the way the shell's
/// form controls address sub-fields. Number fields send `null` to clear an
/// override back to the role template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "subID", content = "data", rename_all = "camelCase")]
pub enum CommitmentUpdate {
    FullTime(bool),
    HoursInDay(Option<f64>),
    DaysInWeek(Option<f64>),
    VacationDays(Option<f64>),
    HolidayDays(Option<f64>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

/// Numeric payloads arrive as numbers, numeric strings from raw text
/// inputs, or `null` from a cleared field. Anything else rejects the
/// whole action.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<NumberLike>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberLike::Number(value)) => Ok(value),
        Some(NumberLike::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(0.0)
            } else {
                trimmed
                    .parse::<f64>()
                    .map_err(|_| serde::de::Error::custom(format!("not a number: {text:?}")))
            }
        }
    }
}
