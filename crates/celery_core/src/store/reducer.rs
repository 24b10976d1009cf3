use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::models::{Celery, Commitment, PayInput, PayUnit, State};
use crate::store::action::{Action, CommitmentUpdate};

/// Pure transition function: maps the previous state and an action to the
/// next state. Untouched entries keep their [`Arc`] so observers can detect
/// unchanged sub-trees by pointer.
pub fn reduce(state: &State, action: &Action) -> State {
    match action {
        Action::AddCelery => {
            let mut next = state.clone();
            next.celeries
                .insert(Uuid::new_v4().to_string(), Arc::new(new_celery(state)));
            next
        }
        Action::RemoveCelery { id } => {
            let mut next = state.clone();
            if next.celeries.remove(id).is_none() {
                warn!(id = %id, "removing a celery that does not exist");
            }
            next
        }
        Action::SetName { id, data } => with_celery(state, id, |celery| {
            celery.name = data.clone();
        }),
        Action::SetInputValue { id, data } => with_celery(state, id, |celery| {
            celery.input.value = *data;
        }),
        Action::SetInputMeasurement { id, data } => with_celery(state, id, |celery| {
            celery.input.unit = *data;
        }),
        Action::SetInputCurrency { id, data } => with_celery(state, id, |celery| {
            celery.input.currency = Some(data.clone());
        }),
        Action::SetCommitmentValue { id, update } => with_celery(state, id, |celery| {
            apply_commitment_update(&mut celery.commitment, update);
        }),
        Action::SetRating {
            id,
            rating_type_id,
            data,
        } => with_celery(state, id, |celery| {
            celery.ratings.insert(rating_type_id.clone(), *data);
        }),
        Action::SetRatingTypeName { id, data } | Action::AddRatingType { id, data } => {
            let mut next = state.clone();
            next.rating_types.insert(id.clone(), data.clone());
            next
        }
        Action::DeleteRatingType { id } => {
            let mut next = state.clone();
            if next.rating_types.remove(id).is_none() {
                warn!(id = %id, "deleting a rating type that does not exist");
            }
            next
        }
        Action::SetMin { data } => {
            let mut next = state.clone();
            next.min = *data;
            next
        }
        Action::SetDesired { data } => {
            let mut next = state.clone();
            next.desired = *data;
            next
        }
        Action::SetCurrencies { data } => {
            let mut next = state.clone();
            next.currencies = data.clone();
            next
        }
        Action::SetBaseCurrency { data } => rebase_currency(state, data),
        Action::SetStore { data } => data.clone(),
        Action::ResetStore => State::default_template(),
    }
}

/// Fresh entry the way the add action seeds it: unnamed, zero yearly value
/// priced in the current base currency, full-time with every schedule field
/// deferring to the role template.
fn new_celery(state: &State) -> Celery {
    Celery {
        name: String::new(),
        input: PayInput {
            value: 0.0,
            unit: PayUnit::PerYear,
            currency: Some(state.currencies.base.clone()),
        },
        commitment: Commitment::default(),
        ratings: Default::default(),
    }
}

/// Copy-on-write update of a single entry. Unknown ids leave the state
/// as-is, apart from a diagnostic.
fn with_celery(state: &State, id: &str, patch: impl FnOnce(&mut Celery)) -> State {
    let Some(existing) = state.celeries.get(id) else {
        warn!(id = %id, "updating a celery that does not exist");
        return state.clone();
    };
    let mut celery = Celery::clone(existing);
    patch(&mut celery);
    let mut next = state.clone();
    next.celeries.insert(id.to_string(), Arc::new(celery));
    next
}

fn apply_commitment_update(commitment: &mut Commitment, update: &CommitmentUpdate) {
    match update {
        CommitmentUpdate::FullTime(value) => commitment.full_time = *value,
        CommitmentUpdate::HoursInDay(value) => commitment.hours_in_day = *value,
        CommitmentUpdate::DaysInWeek(value) => commitment.days_in_week = *value,
        CommitmentUpdate::VacationDays(value) => commitment.vacation_days = *value,
        CommitmentUpdate::HolidayDays(value) => commitment.holiday_days = *value,
    }
}

/// Re-express the rate table in a new base currency. Every rate is scaled
/// by `rates[new] / rates[old]` so relative conversion factors survive the
/// move; a base missing from its own table counts as 1. Without a table,
/// or when the new base has no rate, only the base code changes.
fn rebase_currency(state: &State, new_base: &str) -> State {
    let mut next = state.clone();
    if let Some(rates) = &state.currencies.rates {
        if let Some(new_rate) = rates.get(new_base).copied() {
            let old_rate = rates.get(&state.currencies.base).copied().unwrap_or(1.0);
            let factor = new_rate / old_rate;
            next.currencies.rates = Some(
                rates
                    .iter()
                    .map(|(code, rate)| (code.clone(), rate * factor))
                    .collect(),
            );
        } else {
            warn!(currency = %new_base, "no rate for new base currency; leaving table as-is");
        }
    }
    next.currencies.base = new_base.to_string();
    next
}
