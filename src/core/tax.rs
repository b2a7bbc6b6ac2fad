use super::types::{AllocationBucket, BudgetAllocation, TaxInputs, TaxResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    pub floor: f64,
    pub ceiling: Option<f64>,
    pub rate: f64,
}

impl TaxBracket {
    fn width(&self) -> f64 {
        match self.ceiling {
            Some(ceiling) => ceiling - self.floor,
            None => f64::INFINITY,
        }
    }
}

/// 2024 single-filer federal brackets, ordered by rate.
#[rustfmt::skip]
pub const FEDERAL_BRACKETS_2024: [TaxBracket; 7] = [
    TaxBracket { floor: 0.0, ceiling: Some(11_600.0), rate: 0.10 },
    TaxBracket { floor: 11_600.0, ceiling: Some(47_150.0), rate: 0.12 },
    TaxBracket { floor: 47_150.0, ceiling: Some(100_525.0), rate: 0.22 },
    TaxBracket { floor: 100_525.0, ceiling: Some(191_950.0), rate: 0.24 },
    TaxBracket { floor: 191_950.0, ceiling: Some(243_725.0), rate: 0.32 },
    TaxBracket { floor: 243_725.0, ceiling: Some(609_350.0), rate: 0.35 },
    TaxBracket { floor: 609_350.0, ceiling: None, rate: 0.37 },
];

pub const STANDARD_DEDUCTION_2024: f64 = 14_600.0;

pub const SOCIAL_SECURITY_RATE: f64 = 0.062;
pub const MEDICARE_RATE: f64 = 0.0145;

const NEEDS_SHARE: f64 = 0.50;
const WANTS_SHARE: f64 = 0.30;
const SAVINGS_SHARE: f64 = 0.20;

pub fn taxable_income(gross_income: f64) -> f64 {
    (gross_income - STANDARD_DEDUCTION_2024).max(0.0)
}

pub fn federal_tax(gross_income: f64) -> f64 {
    progressive_tax(taxable_income(gross_income), &FEDERAL_BRACKETS_2024)
}

pub fn progressive_tax(taxable: f64, brackets: &[TaxBracket]) -> f64 {
    let mut remaining = taxable.max(0.0);
    let mut tax = 0.0;
    for bracket in brackets {
        if remaining <= 0.0 {
            break;
        }
        let in_bracket = remaining.min(bracket.width());
        tax += in_bracket * bracket.rate;
        remaining -= in_bracket;
    }
    tax
}

/// Social Security and Medicare on the full gross. The Social Security wage
/// base is not applied.
pub fn fica_tax(gross_income: f64) -> (f64, f64) {
    let gross = gross_income.max(0.0);
    (gross * SOCIAL_SECURITY_RATE, gross * MEDICARE_RATE)
}

pub fn estimate_take_home(inputs: &TaxInputs) -> TaxResult {
    let gross = inputs.gross_annual_income.max(0.0);
    let federal = federal_tax(gross);
    let (social_security, medicare) = fica_tax(gross);
    let fica = social_security + medicare;
    let state = gross * inputs.state_rate_percent / 100.0;
    let retirement = gross * inputs.retirement_contribution_percent / 100.0;
    let health = inputs.monthly_health_premium * 12.0;

    let net_annual = gross - federal - fica - state - retirement - health;
    let effective_tax_rate = if gross > 0.0 {
        (federal + fica + state) / gross * 100.0
    } else {
        0.0
    };

    TaxResult {
        gross_annual: gross,
        taxable_income: taxable_income(gross),
        federal_tax: federal,
        fica_tax: fica,
        social_security,
        medicare,
        state_tax: state,
        retirement_contribution: retirement,
        health_premium_annual: health,
        net_annual,
        net_monthly: net_annual / 12.0,
        net_weekly: net_annual / 52.0,
        net_daily: net_annual / 365.0,
        effective_tax_rate,
    }
}

fn allocation_bucket(net_monthly: f64, share: f64) -> AllocationBucket {
    let monthly = net_monthly * share;
    AllocationBucket {
        percent: share * 100.0,
        monthly,
        weekly: monthly * 12.0 / 52.0,
        daily: monthly * 12.0 / 365.0,
    }
}

pub fn budget_allocation(net_monthly: f64) -> BudgetAllocation {
    let net_monthly = net_monthly.max(0.0);
    BudgetAllocation {
        net_monthly,
        needs: allocation_bucket(net_monthly, NEEDS_SHARE),
        wants: allocation_bucket(net_monthly, WANTS_SHARE),
        savings: allocation_bucket(net_monthly, SAVINGS_SHARE),
    }
}
