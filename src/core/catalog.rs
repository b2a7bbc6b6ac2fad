//! Static reference data for the budget planner.
//!
//! Every table is keyed by a closed enum, so an unknown id is rejected when a
//! payload or stored snapshot is deserialized rather than silently ignored.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetBucket {
    Needs,
    Wants,
    Savings,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseInfo {
    pub title: &'static str,
    pub guideline_percent: f64,
    pub bucket: BudgetBucket,
    pub counts_toward_dti: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpenseCategory {
    Housing,
    CarPayment,
    CreditCards,
    StudentLoans,
    OtherDebt,
    Utilities,
    Insurance,
    Groceries,
    Transportation,
    Healthcare,
    Childcare,
    Phone,
    DiningOut,
    Entertainment,
    Shopping,
    Subscriptions,
    Savings,
    Retirement,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 18] = [
        ExpenseCategory::Housing,
        ExpenseCategory::CarPayment,
        ExpenseCategory::CreditCards,
        ExpenseCategory::StudentLoans,
        ExpenseCategory::OtherDebt,
        ExpenseCategory::Utilities,
        ExpenseCategory::Insurance,
        ExpenseCategory::Groceries,
        ExpenseCategory::Transportation,
        ExpenseCategory::Healthcare,
        ExpenseCategory::Childcare,
        ExpenseCategory::Phone,
        ExpenseCategory::DiningOut,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Shopping,
        ExpenseCategory::Subscriptions,
        ExpenseCategory::Savings,
        ExpenseCategory::Retirement,
    ];

    pub fn info(self) -> ExpenseInfo {
        use BudgetBucket::{Needs, Savings, Wants};
        let (title, guideline_percent, bucket, counts_toward_dti) = match self {
            ExpenseCategory::Housing => ("Housing", 28.0, Needs, true),
            ExpenseCategory::CarPayment => ("Car Payments", 10.0, Needs, true),
            ExpenseCategory::CreditCards => ("Credit Cards", 5.0, Needs, true),
            ExpenseCategory::StudentLoans => ("Student Loans", 10.0, Needs, true),
            ExpenseCategory::OtherDebt => ("Other Debt", 5.0, Needs, true),
            ExpenseCategory::Utilities => ("Utilities", 5.0, Needs, false),
            ExpenseCategory::Insurance => ("Insurance", 5.0, Needs, false),
            ExpenseCategory::Groceries => ("Groceries & Food", 12.0, Needs, false),
            ExpenseCategory::Transportation => ("Transportation", 10.0, Needs, false),
            ExpenseCategory::Healthcare => ("Healthcare", 5.0, Needs, false),
            ExpenseCategory::Childcare => ("Childcare", 10.0, Needs, false),
            ExpenseCategory::Phone => ("Phone & Internet", 3.0, Needs, false),
            ExpenseCategory::DiningOut => ("Dining Out", 5.0, Wants, false),
            ExpenseCategory::Entertainment => ("Entertainment & Travel", 5.0, Wants, false),
            ExpenseCategory::Shopping => ("Personal & Shopping", 5.0, Wants, false),
            ExpenseCategory::Subscriptions => ("Subscriptions", 3.0, Wants, false),
            ExpenseCategory::Savings => ("Savings", 20.0, Savings, false),
            ExpenseCategory::Retirement => ("Retirement", 10.0, Savings, false),
        };
        ExpenseInfo {
            title,
            guideline_percent,
            bucket,
            counts_toward_dti,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Never,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    /// Occurrences per average month (365/12 days).
    pub fn per_month(self) -> f64 {
        match self {
            Frequency::Never => 0.0,
            Frequency::Daily => 365.0 / 12.0,
            Frequency::Weekly => 52.0 / 12.0,
            Frequency::Biweekly => 26.0 / 12.0,
            Frequency::Monthly => 1.0,
            Frequency::Quarterly => 4.0 / 12.0,
            Frequency::Annually => 1.0 / 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyAnswer {
    pub frequency: Frequency,
    pub amount: f64,
}

impl FrequencyAnswer {
    pub fn monthly_amount(&self) -> f64 {
        self.amount.max(0.0) * self.frequency.per_month()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrequencyQuestion {
    Coffee,
    DiningOut,
    Takeout,
    Groceries,
    Gas,
    Rideshare,
    Shopping,
    Entertainment,
    PersonalCare,
    Gifts,
}

impl FrequencyQuestion {
    pub const ALL: [FrequencyQuestion; 10] = [
        FrequencyQuestion::Coffee,
        FrequencyQuestion::DiningOut,
        FrequencyQuestion::Takeout,
        FrequencyQuestion::Groceries,
        FrequencyQuestion::Gas,
        FrequencyQuestion::Rideshare,
        FrequencyQuestion::Shopping,
        FrequencyQuestion::Entertainment,
        FrequencyQuestion::PersonalCare,
        FrequencyQuestion::Gifts,
    ];

    pub fn title(self) -> &'static str {
        match self {
            FrequencyQuestion::Coffee => "How often do you buy coffee out?",
            FrequencyQuestion::DiningOut => "How often do you eat at restaurants?",
            FrequencyQuestion::Takeout => "How often do you order delivery or takeout?",
            FrequencyQuestion::Groceries => "How often do you shop for groceries?",
            FrequencyQuestion::Gas => "How often do you fill up your tank?",
            FrequencyQuestion::Rideshare => "How often do you take rideshares?",
            FrequencyQuestion::Shopping => "How often do you shop for clothes or household items?",
            FrequencyQuestion::Entertainment => "How often do you go out for entertainment?",
            FrequencyQuestion::PersonalCare => "How often do you pay for personal care?",
            FrequencyQuestion::Gifts => "How often do you buy gifts?",
        }
    }

    pub fn category(self) -> ExpenseCategory {
        match self {
            FrequencyQuestion::Coffee
            | FrequencyQuestion::DiningOut
            | FrequencyQuestion::Takeout => ExpenseCategory::DiningOut,
            FrequencyQuestion::Groceries => ExpenseCategory::Groceries,
            FrequencyQuestion::Gas | FrequencyQuestion::Rideshare => {
                ExpenseCategory::Transportation
            }
            FrequencyQuestion::Entertainment => ExpenseCategory::Entertainment,
            FrequencyQuestion::Shopping
            | FrequencyQuestion::PersonalCare
            | FrequencyQuestion::Gifts => ExpenseCategory::Shopping,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubscriptionCategory {
    Video,
    Music,
    Gaming,
    Cloud,
    Software,
    Fitness,
    News,
    Delivery,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubscriptionInfo {
    pub name: &'static str,
    pub monthly_price: f64,
    pub category: SubscriptionCategory,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubscriptionId {
    Netflix,
    Hulu,
    DisneyPlus,
    Max,
    AppleTvPlus,
    ParamountPlus,
    Peacock,
    YoutubePremium,
    Spotify,
    AppleMusic,
    Audible,
    XboxGamePass,
    PlaystationPlus,
    Icloud,
    GoogleOne,
    Dropbox,
    Microsoft365,
    AdobeCreativeCloud,
    ChatgptPlus,
    Gym,
    Peloton,
    NewYorkTimes,
    AmazonPrime,
    DashPass,
    UberOne,
}

impl SubscriptionId {
    pub const ALL: [SubscriptionId; 25] = [
        SubscriptionId::Netflix,
        SubscriptionId::Hulu,
        SubscriptionId::DisneyPlus,
        SubscriptionId::Max,
        SubscriptionId::AppleTvPlus,
        SubscriptionId::ParamountPlus,
        SubscriptionId::Peacock,
        SubscriptionId::YoutubePremium,
        SubscriptionId::Spotify,
        SubscriptionId::AppleMusic,
        SubscriptionId::Audible,
        SubscriptionId::XboxGamePass,
        SubscriptionId::PlaystationPlus,
        SubscriptionId::Icloud,
        SubscriptionId::GoogleOne,
        SubscriptionId::Dropbox,
        SubscriptionId::Microsoft365,
        SubscriptionId::AdobeCreativeCloud,
        SubscriptionId::ChatgptPlus,
        SubscriptionId::Gym,
        SubscriptionId::Peloton,
        SubscriptionId::NewYorkTimes,
        SubscriptionId::AmazonPrime,
        SubscriptionId::DashPass,
        SubscriptionId::UberOne,
    ];

    pub fn info(self) -> SubscriptionInfo {
        use SubscriptionCategory::*;
        let (name, monthly_price, category) = match self {
            SubscriptionId::Netflix => ("Netflix", 15.49, Video),
            SubscriptionId::Hulu => ("Hulu", 7.99, Video),
            SubscriptionId::DisneyPlus => ("Disney+", 13.99, Video),
            SubscriptionId::Max => ("Max", 15.99, Video),
            SubscriptionId::AppleTvPlus => ("Apple TV+", 9.99, Video),
            SubscriptionId::ParamountPlus => ("Paramount+", 7.99, Video),
            SubscriptionId::Peacock => ("Peacock", 7.99, Video),
            SubscriptionId::YoutubePremium => ("YouTube Premium", 13.99, Video),
            SubscriptionId::Spotify => ("Spotify Premium", 11.99, Music),
            SubscriptionId::AppleMusic => ("Apple Music", 10.99, Music),
            SubscriptionId::Audible => ("Audible", 14.95, Music),
            SubscriptionId::XboxGamePass => ("Xbox Game Pass", 16.99, Gaming),
            SubscriptionId::PlaystationPlus => ("PlayStation Plus", 9.99, Gaming),
            SubscriptionId::Icloud => ("iCloud+", 2.99, Cloud),
            SubscriptionId::GoogleOne => ("Google One", 1.99, Cloud),
            SubscriptionId::Dropbox => ("Dropbox Plus", 11.99, Cloud),
            SubscriptionId::Microsoft365 => ("Microsoft 365", 9.99, Software),
            SubscriptionId::AdobeCreativeCloud => ("Adobe Creative Cloud", 59.99, Software),
            SubscriptionId::ChatgptPlus => ("ChatGPT Plus", 20.00, Software),
            SubscriptionId::Gym => ("Gym Membership", 40.00, Fitness),
            SubscriptionId::Peloton => ("Peloton", 44.00, Fitness),
            SubscriptionId::NewYorkTimes => ("New York Times", 17.00, News),
            SubscriptionId::AmazonPrime => ("Amazon Prime", 14.99, Delivery),
            SubscriptionId::DashPass => ("DoorDash DashPass", 9.99, Delivery),
            SubscriptionId::UberOne => ("Uber One", 9.99, Delivery),
        };
        SubscriptionInfo {
            name,
            monthly_price,
            category,
        }
    }
}
