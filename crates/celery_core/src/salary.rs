//! Pay-rate normalization between hourly, daily, monthly and yearly units.

use crate::models::{Commitment, Defaults, PayUnit};

/// Fully resolved work schedule, after entry overrides and role templates
/// have been merged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkSchedule {
    pub full_time: bool,
    pub hours_in_day: f64,
    pub days_in_week: f64,
    pub vacation_days: f64,
    pub holiday_days: f64,
}

impl WorkSchedule {
    /// 52 weeks of working days; full-time schedules subtract vacation and
    /// holidays, floored at zero.
    pub fn working_days_in_year(&self) -> f64 {
        let days = 52.0 * self.days_in_week;
        if self.full_time {
            (days - (self.vacation_days + self.holiday_days)).max(0.0)
        } else {
            days
        }
    }

    pub fn working_days_in_month(&self) -> f64 {
        self.working_days_in_year() / 12.0
    }
}

impl Commitment {
    /// Merge entry overrides onto the matching role template. A stored zero
    /// or NaN counts as unset and defers to the template.
    pub fn resolve(&self, defaults: &Defaults) -> WorkSchedule {
        let template = if self.full_time {
            &defaults.full_time
        } else {
            &defaults.part_time
        };
        WorkSchedule {
            full_time: self.full_time,
            hours_in_day: coalesce(self.hours_in_day, template.hours_in_day),
            days_in_week: coalesce(self.days_in_week, template.days_in_week),
            vacation_days: coalesce(self.vacation_days, template.vacation_days),
            holiday_days: coalesce(self.holiday_days, template.holiday_days),
        }
    }
}

fn coalesce(stored: Option<f64>, template: f64) -> f64 {
    match stored {
        Some(value) if value != 0.0 && !value.is_nan() => value,
        _ => template,
    }
}

/// Convert `value` from one pay unit to another under the given schedule.
///
/// A zero or NaN value short-circuits to zero. When a currency `factor` is
/// supplied (and is itself non-zero and not NaN), the value is divided by
/// it first, rebasing the amount into the base currency. Degenerate
/// schedules are not guarded: dividing by a zero-day schedule yields
/// infinity or NaN, which callers filter out downstream.
pub fn convert(
    value: f64,
    from: PayUnit,
    to: PayUnit,
    schedule: &WorkSchedule,
    factor: Option<f64>,
) -> f64 {
    use PayUnit::{PerDay, PerHour, PerMonth, PerYear};

    if value == 0.0 || value.is_nan() {
        return 0.0;
    }
    let value = match factor {
        Some(factor) if factor != 0.0 && !factor.is_nan() => value / factor,
        _ => value,
    };

    let hours_in_day = schedule.hours_in_day;
    let days_in_month = schedule.working_days_in_month();
    let days_in_year = schedule.working_days_in_year();

    match (from, to) {
        (PerHour, PerHour) | (PerDay, PerDay) | (PerMonth, PerMonth) | (PerYear, PerYear) => value,
        (PerHour, PerDay) => value * hours_in_day,
        (PerHour, PerMonth) => value * hours_in_day * days_in_month,
        (PerHour, PerYear) => value * hours_in_day * days_in_year,
        (PerDay, PerHour) => value / hours_in_day,
        (PerDay, PerMonth) => value * days_in_month,
        (PerDay, PerYear) => value * days_in_year,
        (PerMonth, PerHour) => value / days_in_month / hours_in_day,
        (PerMonth, PerDay) => value / days_in_month,
        (PerMonth, PerYear) => value * 12.0,
        (PerYear, PerHour) => value / days_in_year / hours_in_day,
        (PerYear, PerDay) => value / days_in_year,
        (PerYear, PerMonth) => value / 12.0,
    }
}
