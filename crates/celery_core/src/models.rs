use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timestamp value marking a store that has never been configured; drives
/// the first-run onboarding flow.
pub const INIT_TIMESTAMP: i64 = 0;

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Rating categories seeded into a fresh store, each under a fresh id.
pub const SEED_RATING_TYPES: [&str; 4] = ["Culture", "Work Life", "Benefits", "Likeability"];

/// Currency codes offered by the picker; matches the set served by the
/// public exchange-rate API the shell fetches tables from.
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "AUD", "BGN", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "HKD", "HRK",
    "HUF", "IDR", "ILS", "INR", "ISK", "JPY", "KRW", "MXN", "MYR", "NOK", "NZD", "PHP", "PLN",
    "RON", "RUB", "SEK", "SGD", "THB", "TRY", "ZAR",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayUnit {
    #[serde(rename = "/hour")]
    PerHour,
    #[serde(rename = "/day")]
    PerDay,
    #[serde(rename = "/month")]
    PerMonth,
    #[serde(rename = "/year")]
    PerYear,
}

impl Default for PayUnit {
    fn default() -> Self {
        Self::PerYear
    }
}

impl PayUnit {
    pub const ALL: [PayUnit; 4] = [Self::PerHour, Self::PerDay, Self::PerMonth, Self::PerYear];

    pub fn label(&self) -> &'static str {
        match self {
            Self::PerHour => "/hour",
            Self::PerDay => "/day",
            Self::PerMonth => "/month",
            Self::PerYear => "/year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayInput {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub value: f64,
    #[serde(rename = "type", default)]
    pub unit: PayUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl Default for PayInput {
    fn default() -> Self {
        Self {
            value: 0.0,
            unit: PayUnit::PerYear,
            currency: None,
        }
    }
}

/// Work-schedule parameters stored per entry. Numeric fields are optional;
/// an unset field defers to the role template in [`Defaults`] at read time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commitment {
    #[serde(default = "default_full_time")]
    pub full_time: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_in_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_in_week: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacation_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_days: Option<f64>,
}

impl Default for Commitment {
    fn default() -> Self {
        Self {
            full_time: true,
            hours_in_day: None,
            days_in_week: None,
            vacation_days: None,
            holiday_days: None,
        }
    }
}

fn default_full_time() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentTemplate {
    pub hours_in_day: f64,
    pub days_in_week: f64,
    pub vacation_days: f64,
    pub holiday_days: f64,
}

impl CommitmentTemplate {
    pub fn full_time() -> Self {
        Self {
            hours_in_day: 8.0,
            days_in_week: 5.0,
            vacation_days: 0.0,
            holiday_days: 0.0,
        }
    }

    pub fn part_time() -> Self {
        Self {
            hours_in_day: 3.0,
            days_in_week: 2.0,
            vacation_days: 0.0,
            holiday_days: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default = "CommitmentTemplate::full_time")]
    pub full_time: CommitmentTemplate,
    #[serde(default = "CommitmentTemplate::part_time")]
    pub part_time: CommitmentTemplate,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            full_time: CommitmentTemplate::full_time(),
            part_time: CommitmentTemplate::part_time(),
        }
    }
}

/// Exchange-rate table as supplied by the external rate source: every rate
/// is a multiplier relative to `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currencies {
    #[serde(default = "default_base_currency")]
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<HashMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Default for Currencies {
    fn default() -> Self {
        Self {
            base: default_base_currency(),
            rates: None,
            date: None,
        }
    }
}

fn default_base_currency() -> String {
    DEFAULT_BASE_CURRENCY.to_string()
}

impl Currencies {
    /// Conversion factor for `code`, when a rate table is present. Absent
    /// tables (or codes missing from the table) mean no conversion applies.
    pub fn factor_for(&self, code: &str) -> Option<f64> {
        self.rates.as_ref()?.get(code).copied()
    }
}

/// One tracked job opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Celery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: PayInput,
    #[serde(default)]
    pub commitment: Commitment,
    #[serde(default)]
    pub ratings: HashMap<String, f64>,
}

impl Default for Celery {
    fn default() -> Self {
        Self {
            name: String::new(),
            input: PayInput::default(),
            commitment: Commitment::default(),
            ratings: HashMap::new(),
        }
    }
}

/// The whole application state tree. Treated as immutable: every transition
/// produces a fresh tree, sharing untouched entries via [`Arc`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub min: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub desired: f64,
    #[serde(default)]
    pub celeries: HashMap<String, Arc<Celery>>,
    #[serde(default)]
    pub currencies: Currencies,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub rating_types: HashMap<String, String>,
}

impl Default for State {
    fn default() -> Self {
        Self::blank()
    }
}

impl State {
    /// Empty template every persisted snapshot is merged onto: zeroed
    /// thresholds, no entries, no rate table, built-in role templates.
    pub fn blank() -> Self {
        Self {
            timestamp: INIT_TIMESTAMP,
            min: 0.0,
            desired: 0.0,
            celeries: HashMap::new(),
            currencies: Currencies::default(),
            defaults: Defaults::default(),
            rating_types: HashMap::new(),
        }
    }

    /// Template used when no persisted store exists (and after a reset):
    /// starter thresholds plus the seeded rating types under fresh ids.
    pub fn default_template() -> Self {
        let mut state = Self::blank();
        state.min = 15_000.0;
        state.desired = 50_000.0;
        state.rating_types = SEED_RATING_TYPES
            .iter()
            .map(|name| (Uuid::new_v4().to_string(), (*name).to_string()))
            .collect();
        state
    }

    /// A store that has never seen a dispatch keeps the sentinel timestamp.
    pub fn first_run(&self) -> bool {
        self.timestamp == INIT_TIMESTAMP
    }
}

/// Old browser snapshots hold `null` where a numeric field was cleared in
/// the UI; merge those (and missing fields) to zero instead of failing.
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}
