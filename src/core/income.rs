use chrono::{Datelike, NaiveDate};

use super::types::{IncomeInputs, IncomeResult, SpendingGuides};

const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_WEEK: f64 = 7.0;
const MONTHS_PER_YEAR: f64 = 12.0;

const AUTO_PAYMENT_SHARE: f64 = 0.12;
const RENT_SHARE: f64 = 0.30;

/// Later of `start` and January 1 of `as_of`'s year. YTD figures reset each
/// calendar year, so earlier tenure does not count.
pub fn effective_start(start: NaiveDate, as_of: NaiveDate) -> Option<NaiveDate> {
    let year_start = NaiveDate::from_yo_opt(as_of.year(), 1)?;
    Some(start.max(year_start))
}

/// Annualizes a year-to-date gross figure. `None` means there is not enough
/// data yet: the as-of date precedes the start date, or no days have elapsed.
pub fn project_annual_income(
    start: NaiveDate,
    as_of: NaiveDate,
    ytd_gross: f64,
) -> Option<IncomeResult> {
    if as_of < start {
        return None;
    }
    let effective = effective_start(start, as_of)?;
    let days_worked = (as_of - effective).num_days() + 1;
    if days_worked <= 0 {
        return None;
    }

    let daily = ytd_gross / days_worked as f64;
    Some(IncomeResult {
        days_worked,
        daily_rate: daily,
        weekly_rate: daily * DAYS_PER_WEEK,
        monthly_rate: daily * DAYS_PER_YEAR / MONTHS_PER_YEAR,
        annual_rate: daily * DAYS_PER_YEAR,
    })
}

pub fn project(inputs: &IncomeInputs) -> Option<IncomeResult> {
    project_annual_income(inputs.start_date, inputs.as_of_date, inputs.ytd_gross_income)
}

pub fn income_from_annual(annual: f64) -> IncomeResult {
    let daily = annual / DAYS_PER_YEAR;
    IncomeResult {
        days_worked: 0,
        daily_rate: daily,
        weekly_rate: daily * DAYS_PER_WEEK,
        monthly_rate: annual / MONTHS_PER_YEAR,
        annual_rate: annual,
    }
}

pub fn income_from_monthly(monthly: f64) -> IncomeResult {
    income_from_annual(monthly * MONTHS_PER_YEAR)
}

pub fn spending_guides(monthly_gross: f64) -> SpendingGuides {
    SpendingGuides {
        max_auto_payment: monthly_gross * AUTO_PAYMENT_SHARE,
        max_rent: monthly_gross * RENT_SHARE,
    }
}
