//! Merchant-name heuristics for categorizing transactions.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use super::catalog::{BudgetBucket, ExpenseCategory};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MerchantSubcategory {
    Groceries,
    Gas,
    Utilities,
    Phone,
    Insurance,
    Healthcare,
    Dining,
    Entertainment,
    Shopping,
    Travel,
}

impl MerchantSubcategory {
    pub fn bucket(self) -> BudgetBucket {
        match self {
            MerchantSubcategory::Groceries
            | MerchantSubcategory::Gas
            | MerchantSubcategory::Utilities
            | MerchantSubcategory::Phone
            | MerchantSubcategory::Insurance
            | MerchantSubcategory::Healthcare => BudgetBucket::Needs,
            MerchantSubcategory::Dining
            | MerchantSubcategory::Entertainment
            | MerchantSubcategory::Shopping
            | MerchantSubcategory::Travel => BudgetBucket::Wants,
        }
    }

    pub fn expense_category(self) -> ExpenseCategory {
        match self {
            MerchantSubcategory::Groceries => ExpenseCategory::Groceries,
            MerchantSubcategory::Gas => ExpenseCategory::Transportation,
            MerchantSubcategory::Utilities => ExpenseCategory::Utilities,
            MerchantSubcategory::Phone => ExpenseCategory::Phone,
            MerchantSubcategory::Insurance => ExpenseCategory::Insurance,
            MerchantSubcategory::Healthcare => ExpenseCategory::Healthcare,
            MerchantSubcategory::Dining => ExpenseCategory::DiningOut,
            MerchantSubcategory::Entertainment | MerchantSubcategory::Travel => {
                ExpenseCategory::Entertainment
            }
            MerchantSubcategory::Shopping => ExpenseCategory::Shopping,
        }
    }
}

/// Checked in order; the first pattern that matches wins.
const MERCHANT_PATTERNS: [(&str, MerchantSubcategory); 10] = [
    (
        "walmart|target|costco|kroger|safeway|publix|trader joe|whole foods|aldi|grocery|\
         food lion|wegmans|heb|meijer|sprouts",
        MerchantSubcategory::Groceries,
    ),
    (
        "shell|chevron|exxon|mobil|bp|76|gas|fuel|valero|speedway|marathon|circle k|wawa|\
         sheetz|quiktrip",
        MerchantSubcategory::Gas,
    ),
    (
        "electric|water|gas company|utility|power|energy|pge|con edison|duke energy",
        MerchantSubcategory::Utilities,
    ),
    (
        "verizon|at&t|t-mobile|sprint|comcast|xfinity|spectrum|cox|frontier",
        MerchantSubcategory::Phone,
    ),
    (
        "geico|progressive|state farm|allstate|liberty mutual|farmers|usaa|nationwide",
        MerchantSubcategory::Insurance,
    ),
    (
        "pharmacy|cvs|walgreens|rite aid|hospital|medical|clinic|doctor|dentist|optometrist",
        MerchantSubcategory::Healthcare,
    ),
    (
        "mcdonald|starbucks|chipotle|pizza|restaurant|cafe|doordash|uber eats|grubhub|dunkin|\
         chick-fil-a|wendy|burger|subway|taco bell|panera|olive garden|applebee",
        MerchantSubcategory::Dining,
    ),
    (
        "netflix|spotify|hulu|disney|amc|cinema|theater|gaming|playstation|xbox|nintendo|\
         steam|twitch",
        MerchantSubcategory::Entertainment,
    ),
    (
        "amazon|ebay|etsy|mall|clothing|shoes|apparel|nordstrom|macys|kohls|tj maxx|\
         marshalls|ross|old navy|gap|h&m|zara",
        MerchantSubcategory::Shopping,
    ),
    (
        "uber|lyft|airline|delta|united|american|southwest|hotel|marriott|hilton|airbnb|\
         expedia|booking",
        MerchantSubcategory::Travel,
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantCategory {
    pub category: BudgetBucket,
    pub subcategory: Option<MerchantSubcategory>,
    pub expense_category: Option<ExpenseCategory>,
}

impl MerchantCategory {
    /// Unknown or missing merchants count as discretionary.
    pub const UNMATCHED: MerchantCategory = MerchantCategory {
        category: BudgetBucket::Wants,
        subcategory: None,
        expense_category: None,
    };

    fn from_subcategory(subcategory: MerchantSubcategory) -> Self {
        Self {
            category: subcategory.bucket(),
            subcategory: Some(subcategory),
            expense_category: Some(subcategory.expense_category()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MerchantMatcher {
    patterns: Vec<(Regex, MerchantSubcategory)>,
}

impl MerchantMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = MERCHANT_PATTERNS
            .iter()
            .map(|&(pattern, subcategory)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (regex, subcategory))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn categorize(&self, merchant: Option<&str>) -> MerchantCategory {
        let Some(merchant) = merchant.map(str::trim).filter(|m| !m.is_empty()) else {
            return MerchantCategory::UNMATCHED;
        };
        self.patterns
            .iter()
            .find(|(regex, _)| regex.is_match(merchant))
            .map(|&(_, subcategory)| MerchantCategory::from_subcategory(subcategory))
            .unwrap_or(MerchantCategory::UNMATCHED)
    }
}
