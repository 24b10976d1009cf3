//! Read-side projections of the state tree: normalized salaries and the
//! slider bounds derived from them.

use serde::Serialize;

use crate::models::{Celery, PayUnit, State};
use crate::salary;

/// An entry's pay normalized to a yearly amount in the base currency,
/// using its resolved schedule and the current rate table.
pub fn annual_salary(state: &State, celery: &Celery) -> f64 {
    let schedule = celery.commitment.resolve(&state.defaults);
    let code = celery
        .input
        .currency
        .as_deref()
        .unwrap_or(&state.currencies.base);
    let factor = state.currencies.factor_for(code);
    salary::convert(
        celery.input.value,
        celery.input.unit,
        PayUnit::PerYear,
        &schedule,
        factor,
    )
}

/// Everything the comparison sliders need in one read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalarySummary {
    /// Normalized yearly amounts, positive entries only.
    pub salaries: Vec<f64>,
    /// Lower slider bound: the minimum threshold, pulled down by any
    /// salary beneath it.
    pub floor: f64,
    /// Upper slider bound: the desired threshold, pushed up by any salary
    /// above it.
    pub ceiling: f64,
}

pub fn salary_summary(state: &State) -> SalarySummary {
    let salaries: Vec<f64> = state
        .celeries
        .values()
        .map(|celery| annual_salary(state, celery))
        .filter(|salary| *salary > 0.0)
        .collect();
    let floor = salaries.iter().copied().fold(state.min, f64::min);
    let ceiling = salaries.iter().copied().fold(state.desired, f64::max);
    SalarySummary {
        salaries,
        floor,
        ceiling,
    }
}
