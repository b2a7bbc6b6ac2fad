use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanInputs {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResult {
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermComparisonRow {
    pub term_months: u32,
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
    pub extra_interest_vs_shortest: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeInputs {
    pub start_date: NaiveDate,
    pub as_of_date: NaiveDate,
    pub ytd_gross_income: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeResult {
    pub days_worked: i64,
    pub daily_rate: f64,
    pub weekly_rate: f64,
    pub monthly_rate: f64,
    pub annual_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingGuides {
    pub max_auto_payment: f64,
    pub max_rent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxInputs {
    pub gross_annual_income: f64,
    pub state_rate_percent: f64,
    pub retirement_contribution_percent: f64,
    pub monthly_health_premium: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub gross_annual: f64,
    pub taxable_income: f64,
    pub federal_tax: f64,
    pub fica_tax: f64,
    pub social_security: f64,
    pub medicare: f64,
    pub state_tax: f64,
    pub retirement_contribution: f64,
    pub health_premium_annual: f64,
    pub net_annual: f64,
    pub net_monthly: f64,
    pub net_weekly: f64,
    pub net_daily: f64,
    pub effective_tax_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationBucket {
    pub percent: f64,
    pub monthly: f64,
    pub weekly: f64,
    pub daily: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAllocation {
    pub net_monthly: f64,
    pub needs: AllocationBucket,
    pub wants: AllocationBucket,
    pub savings: AllocationBucket,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub severity: Severity,
    pub message: String,
}

impl Recommendation {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Danger,
            message: message.into(),
        }
    }
}
