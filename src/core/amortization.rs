use serde::Serialize;

use super::types::{LoanInputs, LoanResult, TermComparisonRow};

pub const DEFAULT_COMPARISON_TERMS: [u32; 5] = [36, 48, 60, 72, 84];

const PTI_COMFORTABLE: f64 = 8.0;
const PTI_TIGHT: f64 = 12.0;
const DTI_COMFORTABLE: f64 = 36.0;
const DTI_TIGHT: f64 = 43.0;
const MARGIN_COMFORTABLE: f64 = 500.0;
const MARGIN_TIGHT: f64 = 200.0;
const DEFAULT_NET_TO_GROSS: f64 = 0.75;
const INCOME_DROP_FRACTION: f64 = 0.10;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CreditTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CreditTier {
    pub const ALL: [CreditTier; 4] = [
        CreditTier::Excellent,
        CreditTier::Good,
        CreditTier::Fair,
        CreditTier::Poor,
    ];

    pub fn score_range(self) -> &'static str {
        match self {
            CreditTier::Excellent => "750+",
            CreditTier::Good => "700-749",
            CreditTier::Fair => "650-699",
            CreditTier::Poor => "550-649",
        }
    }

    pub fn typical_apr_percent(self) -> f64 {
        match self {
            CreditTier::Excellent => 5.99,
            CreditTier::Good => 8.49,
            CreditTier::Fair => 12.99,
            CreditTier::Poor => 18.99,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PtiGuideline {
    Conservative,
    Standard,
    Aggressive,
}

impl PtiGuideline {
    pub const ALL: [PtiGuideline; 3] = [
        PtiGuideline::Conservative,
        PtiGuideline::Standard,
        PtiGuideline::Aggressive,
    ];

    pub fn ratio(self) -> f64 {
        match self {
            PtiGuideline::Conservative => 0.08,
            PtiGuideline::Standard => 0.12,
            PtiGuideline::Aggressive => 0.15,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PtiGuideline::Conservative => "Low risk, easier approval",
            PtiGuideline::Standard => "Typical auto loan guideline",
            PtiGuideline::Aggressive => "Maximum most lenders approve",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentApproval {
    pub guideline: PtiGuideline,
    pub ratio: f64,
    pub max_payment: f64,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierEstimate {
    pub tier: CreditTier,
    pub score_range: &'static str,
    pub apr_percent: f64,
    pub loan_amount: f64,
    pub total_interest: f64,
    pub total_paid: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Comfortable,
    Tight,
    Risky,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityVerdict {
    pub verdict: Verdict,
    pub explanation: String,
    pub payment_to_income_percent: f64,
    pub debt_to_income_percent: f64,
    pub remaining_after_payment: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeDropScenario {
    pub reduced_income: f64,
    pub income_change: f64,
    pub payment_to_income_percent: f64,
    pub debt_to_income_percent: f64,
    pub explanation: String,
    pub verdict: AffordabilityVerdict,
}

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

/// Fixed-rate amortized payment. Callers reject negative principal and a zero
/// term before calling; no validation happens here.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    let n = term_months as f64;
    let r = monthly_rate(annual_rate_percent);
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

pub fn total_interest(principal: f64, payment: f64, term_months: u32) -> f64 {
    payment * term_months as f64 - principal
}

pub fn loan_result(inputs: &LoanInputs) -> LoanResult {
    let payment = monthly_payment(
        inputs.principal,
        inputs.annual_rate_percent,
        inputs.term_months,
    );
    let total_paid = payment * inputs.term_months as f64;
    LoanResult {
        monthly_payment: payment,
        total_interest: total_paid - inputs.principal,
        total_paid,
    }
}

/// Same loan priced over several terms. Rows keep the order of `terms`; the
/// interest delta is measured against the shortest term in the list.
pub fn term_comparison(
    principal: f64,
    annual_rate_percent: f64,
    terms: &[u32],
) -> Vec<TermComparisonRow> {
    let Some(&shortest) = terms.iter().min() else {
        return Vec::new();
    };
    let baseline_interest = loan_result(&LoanInputs {
        principal,
        annual_rate_percent,
        term_months: shortest,
    })
    .total_interest;

    terms
        .iter()
        .map(|&term_months| {
            let result = loan_result(&LoanInputs {
                principal,
                annual_rate_percent,
                term_months,
            });
            TermComparisonRow {
                term_months,
                monthly_payment: result.monthly_payment,
                total_interest: result.total_interest,
                total_paid: result.total_paid,
                extra_interest_vs_shortest: result.total_interest - baseline_interest,
            }
        })
        .collect()
}

/// Principal that a given monthly payment retires over `term_months`.
pub fn loan_amount_for_payment(payment: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    let n = term_months as f64;
    let r = monthly_rate(annual_rate_percent);
    if r == 0.0 {
        return payment * n;
    }
    payment * (1.0 - (1.0 + r).powf(-n)) / r
}

pub fn payment_approvals(monthly_gross_income: f64) -> Vec<PaymentApproval> {
    PtiGuideline::ALL
        .iter()
        .map(|&guideline| PaymentApproval {
            guideline,
            ratio: guideline.ratio(),
            max_payment: monthly_gross_income * guideline.ratio(),
            description: guideline.description(),
        })
        .collect()
}

pub fn estimates_by_tier(monthly_payment: f64, term_months: u32) -> Vec<TierEstimate> {
    CreditTier::ALL
        .iter()
        .map(|&tier| {
            let apr = tier.typical_apr_percent();
            let loan_amount = loan_amount_for_payment(monthly_payment, apr, term_months);
            let total_paid = monthly_payment * term_months as f64;
            TierEstimate {
                tier,
                score_range: tier.score_range(),
                apr_percent: apr,
                loan_amount,
                total_interest: total_paid - loan_amount,
                total_paid,
            }
        })
        .collect()
}

pub fn affordability_verdict(
    payment: f64,
    monthly_gross_income: f64,
    fixed_obligations: f64,
    monthly_net_income: Option<f64>,
) -> AffordabilityVerdict {
    let (pti, dti) = if monthly_gross_income > 0.0 {
        (
            payment / monthly_gross_income * 100.0,
            (fixed_obligations + payment) / monthly_gross_income * 100.0,
        )
    } else {
        (f64::INFINITY, f64::INFINITY)
    };
    let net = monthly_net_income
        .filter(|v| *v > 0.0)
        .unwrap_or(monthly_gross_income * DEFAULT_NET_TO_GROSS);
    let margin = net - fixed_obligations - payment;

    let (verdict, explanation) = if pti > PTI_TIGHT || dti > DTI_TIGHT || margin < MARGIN_TIGHT {
        let explanation = if pti > PTI_TIGHT {
            format!(
                "This payment consumes {pti:.0}% of your gross income, beyond the recommended 12% maximum."
            )
        } else if dti > DTI_TIGHT {
            format!(
                "Your total debt obligations would reach {dti:.0}% of income, leaving little cushion for emergencies."
            )
        } else {
            format!(
                "After this payment and your obligations, you'd have only ${margin:.0} monthly cushion."
            )
        };
        (Verdict::Risky, explanation)
    } else if pti > PTI_COMFORTABLE || dti > DTI_COMFORTABLE || margin < MARGIN_COMFORTABLE {
        let explanation = if pti > PTI_COMFORTABLE {
            format!(
                "This payment is {pti:.0}% of your income, workable but with limited margin if expenses rise."
            )
        } else if dti > DTI_COMFORTABLE {
            format!(
                "Your total debt-to-income of {dti:.0}% is manageable but approaching limits most lenders prefer."
            )
        } else {
            format!(
                "Your monthly cushion of ${margin:.0} is adequate but not robust against unexpected costs."
            )
        };
        (Verdict::Tight, explanation)
    } else {
        (
            Verdict::Comfortable,
            format!(
                "This payment is {pti:.0}% of your income with a healthy {:.0}% margin for savings and unexpected expenses.",
                100.0 - dti
            ),
        )
    };

    AffordabilityVerdict {
        verdict,
        explanation,
        payment_to_income_percent: pti,
        debt_to_income_percent: dti,
        remaining_after_payment: margin,
    }
}

/// Re-runs the verdict with gross (and net, when given) income cut by 10%.
pub fn income_drop_scenario(
    payment: f64,
    monthly_gross_income: f64,
    fixed_obligations: f64,
    monthly_net_income: Option<f64>,
) -> IncomeDropScenario {
    let keep = 1.0 - INCOME_DROP_FRACTION;
    let reduced_income = monthly_gross_income * keep;
    let verdict = affordability_verdict(
        payment,
        reduced_income,
        fixed_obligations,
        monthly_net_income.map(|net| net * keep),
    );
    let pti = verdict.payment_to_income_percent;
    let outlook = match verdict.verdict {
        Verdict::Risky => "Unsustainable",
        Verdict::Tight => "Manageable but strained",
        Verdict::Comfortable => "Still workable",
    };

    IncomeDropScenario {
        reduced_income,
        income_change: -monthly_gross_income * INCOME_DROP_FRACTION,
        payment_to_income_percent: pti,
        debt_to_income_percent: verdict.debt_to_income_percent,
        explanation: format!(
            "With 10% less income, this payment becomes {pti:.0}% of your earnings. {outlook}."
        ),
        verdict,
    }
}
