use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::catalog::{SubscriptionCategory, SubscriptionId};

const STREAMING_OVERLAP: usize = 3;
const MUSIC_OVERLAP: usize = 2;
const ANNUAL_SPEND_ALERT: f64 = 1_000.0;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionLine {
    pub id: SubscriptionId,
    pub name: &'static str,
    pub category: SubscriptionCategory,
    pub monthly_price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionAudit {
    pub count: usize,
    pub monthly_total: f64,
    pub annual_total: f64,
    pub lines: Vec<SubscriptionLine>,
    pub by_category: BTreeMap<SubscriptionCategory, f64>,
    pub flags: Vec<String>,
}

/// Catalog prices for the selected services plus any custom per-category
/// amounts the user entered for services outside the catalog.
pub fn monthly_total(
    selected: &BTreeSet<SubscriptionId>,
    custom_amounts: &BTreeMap<SubscriptionCategory, f64>,
) -> f64 {
    let catalog: f64 = selected.iter().map(|id| id.info().monthly_price).sum();
    let custom: f64 = custom_amounts.values().map(|v| v.max(0.0)).sum();
    catalog + custom
}

pub fn audit(
    selected: &BTreeSet<SubscriptionId>,
    custom_amounts: &BTreeMap<SubscriptionCategory, f64>,
) -> SubscriptionAudit {
    let lines: Vec<SubscriptionLine> = selected
        .iter()
        .map(|&id| {
            let info = id.info();
            SubscriptionLine {
                id,
                name: info.name,
                category: info.category,
                monthly_price: info.monthly_price,
            }
        })
        .collect();

    let mut by_category: BTreeMap<SubscriptionCategory, f64> = BTreeMap::new();
    for line in &lines {
        *by_category.entry(line.category).or_default() += line.monthly_price;
    }
    for (&category, &amount) in custom_amounts {
        if amount > 0.0 {
            *by_category.entry(category).or_default() += amount;
        }
    }

    let monthly_total = monthly_total(selected, custom_amounts);
    let annual_total = monthly_total * 12.0;
    let count_in = |category: SubscriptionCategory| {
        lines.iter().filter(|l| l.category == category).count()
    };

    let mut flags = Vec::new();
    let video = count_in(SubscriptionCategory::Video);
    if video >= STREAMING_OVERLAP {
        let video_cost = by_category
            .get(&SubscriptionCategory::Video)
            .copied()
            .unwrap_or_default();
        flags.push(format!(
            "You pay for {video} video streaming services (${video_cost:.2}/month). Rotating one or two at a time could cut this in half."
        ));
    }
    let music = count_in(SubscriptionCategory::Music);
    if music >= MUSIC_OVERLAP {
        flags.push(format!(
            "You have {music} music or audio subscriptions. Most catalogs overlap heavily."
        ));
    }
    if annual_total > ANNUAL_SPEND_ALERT {
        flags.push(format!(
            "Subscriptions cost ${annual_total:.0} a year. Review anything you haven't used in the last month."
        ));
    }

    SubscriptionAudit {
        count: lines.len(),
        monthly_total,
        annual_total,
        lines,
        by_category,
        flags,
    }
}
