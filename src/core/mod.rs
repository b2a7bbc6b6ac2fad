pub mod amortization;
pub mod budget;
pub mod catalog;
pub mod income;
pub mod merchants;
pub mod subscriptions;
pub mod tax;
mod types;

pub use types::{
    AllocationBucket, BudgetAllocation, IncomeInputs, IncomeResult, LoanInputs, LoanResult,
    Recommendation, Severity, SpendingGuides, TaxInputs, TaxResult, TermComparisonRow,
};
