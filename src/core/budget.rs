use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::catalog::{
    BudgetBucket, ExpenseCategory, FrequencyAnswer, FrequencyQuestion, SubscriptionCategory,
    SubscriptionId,
};
use super::subscriptions;
use super::types::Recommendation;

const HOUSING_CEILING: f64 = 30.0;
const NEEDS_TARGET: f64 = 50.0;
const WANTS_TARGET: f64 = 30.0;
const SAVINGS_TARGET: f64 = 20.0;
const SAVINGS_FLOOR: f64 = 10.0;
const CREDIT_CARD_CEILING: f64 = 10.0;
const DTI_COMFORT: f64 = 36.0;
const DTI_CEILING: f64 = 43.0;
const CAR_GUIDELINE: f64 = 10.0;
const CAR_CEILING: f64 = 15.0;
const UNALLOCATED_SHARE: f64 = 10.0;

/// Monthly spending per category. Deserializes from a plain category map
/// through `add`, so negative amounts never get in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<ExpenseCategory, f64>",
    into = "BTreeMap<ExpenseCategory, f64>"
)]
pub struct SpendingBreakdown {
    amounts: BTreeMap<ExpenseCategory, f64>,
}

impl From<BTreeMap<ExpenseCategory, f64>> for SpendingBreakdown {
    fn from(amounts: BTreeMap<ExpenseCategory, f64>) -> Self {
        let mut breakdown = Self::new();
        for (category, amount) in amounts {
            breakdown.add(category, amount);
        }
        breakdown
    }
}

impl From<SpendingBreakdown> for BTreeMap<ExpenseCategory, f64> {
    fn from(breakdown: SpendingBreakdown) -> Self {
        breakdown.amounts
    }
}

impl SpendingBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: ExpenseCategory, amount: f64) -> Self {
        self.add(category, amount);
        self
    }

    /// Negative amounts are treated as zero.
    pub fn add(&mut self, category: ExpenseCategory, amount: f64) {
        if amount > 0.0 {
            *self.amounts.entry(category).or_default() += amount;
        }
    }

    pub fn amount(&self, category: ExpenseCategory) -> f64 {
        self.amounts.get(&category).copied().unwrap_or_default()
    }

    pub fn total(&self) -> f64 {
        self.amounts.values().sum()
    }

    pub fn bucket_total(&self, bucket: BudgetBucket) -> f64 {
        self.amounts
            .iter()
            .filter(|(category, _)| category.info().bucket == bucket)
            .map(|(_, amount)| amount)
            .sum()
    }

    pub fn debt_payments(&self) -> f64 {
        self.amounts
            .iter()
            .filter(|(category, _)| category.info().counts_toward_dti)
            .map(|(_, amount)| amount)
            .sum()
    }

    /// Folds the pieces of a saved budget into monthly per-category amounts.
    pub fn from_snapshot_parts(
        fixed_expenses: &BTreeMap<ExpenseCategory, f64>,
        frequency_data: &BTreeMap<FrequencyQuestion, FrequencyAnswer>,
        selected_subscriptions: &BTreeSet<SubscriptionId>,
        custom_sub_amounts: &BTreeMap<SubscriptionCategory, f64>,
    ) -> Self {
        let mut breakdown = Self::new();
        for (&category, &amount) in fixed_expenses {
            breakdown.add(category, amount);
        }
        for (question, answer) in frequency_data {
            breakdown.add(question.category(), answer.monthly_amount());
        }
        breakdown.add(
            ExpenseCategory::Subscriptions,
            subscriptions::monthly_total(selected_subscriptions, custom_sub_amounts),
        );
        breakdown
    }
}

/// Ratios derived once from a breakdown and monthly income. Every rule reads
/// from this and nothing else.
#[derive(Debug, Clone)]
pub struct FinancialProfile<'a> {
    pub monthly_income: f64,
    pub breakdown: &'a SpendingBreakdown,
    pub needs_percent: f64,
    pub wants_percent: f64,
    pub savings_percent: f64,
    pub debt_to_income_percent: f64,
    pub total_spending: f64,
    pub leftover: f64,
}

impl<'a> FinancialProfile<'a> {
    /// `None` without a positive income; no ratio is meaningful then.
    pub fn new(breakdown: &'a SpendingBreakdown, monthly_income: f64) -> Option<Self> {
        if monthly_income.is_nan() || monthly_income <= 0.0 {
            return None;
        }
        let share = |amount: f64| amount / monthly_income * 100.0;
        let total_spending = breakdown.total();
        Some(Self {
            monthly_income,
            breakdown,
            needs_percent: share(breakdown.bucket_total(BudgetBucket::Needs)),
            wants_percent: share(breakdown.bucket_total(BudgetBucket::Wants)),
            savings_percent: share(breakdown.bucket_total(BudgetBucket::Savings)),
            debt_to_income_percent: share(breakdown.debt_payments()),
            total_spending,
            leftover: monthly_income - total_spending,
        })
    }

    pub fn percent(&self, category: ExpenseCategory) -> f64 {
        self.breakdown.amount(category) / self.monthly_income * 100.0
    }
}

type Rule = fn(&FinancialProfile<'_>) -> Option<Recommendation>;

const RULES: &[Rule] = &[
    housing_share,
    needs_share,
    wants_share,
    savings_rate,
    credit_card_load,
    debt_to_income,
    car_payment,
    groceries_guideline,
    utilities_guideline,
    transportation_guideline,
    dining_out_guideline,
    entertainment_guideline,
    shopping_guideline,
    subscriptions_guideline,
    student_loans_guideline,
    childcare_guideline,
    healthcare_guideline,
    retirement_contribution,
    unallocated_income,
    balanced_budget,
];

/// Runs every rule against the profile. Rules are independent: each one that
/// applies contributes exactly one recommendation, in table order.
pub fn evaluate(breakdown: &SpendingBreakdown, monthly_income: f64) -> Vec<Recommendation> {
    let Some(profile) = FinancialProfile::new(breakdown, monthly_income) else {
        return Vec::new();
    };
    RULES.iter().filter_map(|rule| rule(&profile)).collect()
}

fn housing_share(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    let housing = p.percent(ExpenseCategory::Housing);
    if housing > HOUSING_CEILING {
        Some(Recommendation::danger(format!(
            "Housing is {housing:.0}% of income. Aim for under 30% to avoid being house-poor."
        )))
    } else if housing > 0.0 {
        Some(Recommendation::success(format!(
            "Great job! Housing at {housing:.0}% is within the recommended 30%."
        )))
    } else {
        None
    }
}

fn needs_share(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    (p.needs_percent > NEEDS_TARGET).then(|| {
        Recommendation::danger(format!(
            "Needs are {:.0}% of income. The 50/30/20 rule suggests keeping needs under 50%.",
            p.needs_percent
        ))
    })
}

fn wants_share(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    (p.wants_percent > WANTS_TARGET).then(|| {
        Recommendation::warning(format!(
            "Wants are {:.0}% of income. Try to keep discretionary spending under 30%.",
            p.wants_percent
        ))
    })
}

fn savings_rate(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    let savings = p.savings_percent;
    if savings < SAVINGS_FLOOR {
        Some(Recommendation::danger(format!(
            "Saving only {savings:.0}% of income. Aim for at least 20% for financial security."
        )))
    } else if savings < SAVINGS_TARGET {
        Some(Recommendation::warning(format!(
            "Saving {savings:.0}% of income is a solid start. Work toward the 20% target."
        )))
    } else {
        Some(Recommendation::success(format!(
            "Excellent! Saving {savings:.0}% puts you on track for financial independence."
        )))
    }
}

fn credit_card_load(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    let cards = p.percent(ExpenseCategory::CreditCards);
    (cards > CREDIT_CARD_CEILING).then(|| {
        Recommendation::danger(format!(
            "Credit card payments at {cards:.0}% is high. Focus on paying down this high-interest debt."
        ))
    })
}

fn debt_to_income(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    let dti = p.debt_to_income_percent;
    if dti > DTI_CEILING {
        Some(Recommendation::danger(format!(
            "Debt payments take {dti:.0}% of income, above the 43% ceiling most lenders use to approve new loans."
        )))
    } else if dti > DTI_COMFORT {
        Some(Recommendation::warning(format!(
            "Debt payments take {dti:.0}% of income. Lenders prefer to see 36% or less."
        )))
    } else {
        None
    }
}

fn car_payment(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    let car = p.percent(ExpenseCategory::CarPayment);
    if car > CAR_CEILING {
        Some(Recommendation::danger(format!(
            "Car payments at {car:.0}% of income exceed the 15% most lenders will approve."
        )))
    } else if car > CAR_GUIDELINE {
        Some(Recommendation::warning(format!(
            "Car payments at {car:.0}% of income are above the 10% guideline."
        )))
    } else {
        None
    }
}

fn over_guideline(p: &FinancialProfile<'_>, category: ExpenseCategory) -> Option<Recommendation> {
    let info = category.info();
    let share = p.percent(category);
    (share > info.guideline_percent).then(|| {
        Recommendation::warning(format!(
            "{} at {share:.0}% of income is above the {:.0}% guideline.",
            info.title, info.guideline_percent
        ))
    })
}

fn groceries_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::Groceries)
}

fn utilities_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::Utilities)
}

fn transportation_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::Transportation)
}

fn dining_out_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::DiningOut)
}

fn entertainment_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::Entertainment)
}

fn shopping_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::Shopping)
}

fn subscriptions_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::Subscriptions)
}

fn student_loans_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::StudentLoans)
}

fn childcare_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::Childcare)
}

fn healthcare_guideline(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    over_guideline(p, ExpenseCategory::Healthcare)
}

fn retirement_contribution(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    (p.breakdown.amount(ExpenseCategory::Retirement) <= 0.0 && p.total_spending > 0.0).then(|| {
        Recommendation::warning(
            "No retirement contributions recorded. Even a small percentage, especially with an employer match, compounds over decades.",
        )
    })
}

fn unallocated_income(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    if p.leftover < 0.0 {
        Some(Recommendation::danger(format!(
            "You're spending ${:.0} more than you earn! Review expenses urgently.",
            p.leftover.abs()
        )))
    } else if p.leftover > p.monthly_income * UNALLOCATED_SHARE / 100.0 {
        Some(Recommendation::success(format!(
            "You have ${:.0} unallocated. Consider increasing savings or investments.",
            p.leftover
        )))
    } else {
        None
    }
}

fn balanced_budget(p: &FinancialProfile<'_>) -> Option<Recommendation> {
    let balanced = p.total_spending > 0.0
        && p.needs_percent <= NEEDS_TARGET
        && p.wants_percent <= WANTS_TARGET
        && p.savings_percent >= SAVINGS_TARGET;
    balanced.then(|| Recommendation::success("Your budget follows the 50/30/20 rule. Keep it up!"))
}
