use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::Recommendation;
use crate::core::budget::{self, SpendingBreakdown};
use crate::core::catalog::{
    ExpenseCategory, FrequencyAnswer, FrequencyQuestion, SubscriptionCategory, SubscriptionId,
};
use crate::error::{Error, Result};

/// Everything the planner saves about a budget besides ownership and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetContents {
    pub fixed_expenses: BTreeMap<ExpenseCategory, f64>,
    pub frequency_data: BTreeMap<FrequencyQuestion, FrequencyAnswer>,
    #[serde(default)]
    pub selected_subscriptions: BTreeSet<SubscriptionId>,
    #[serde(default)]
    pub custom_sub_amounts: BTreeMap<SubscriptionCategory, f64>,
    pub monthly_income: f64,
}

impl BudgetContents {
    pub fn breakdown(&self) -> SpendingBreakdown {
        SpendingBreakdown::from_snapshot_parts(
            &self.fixed_expenses,
            &self.frequency_data,
            &self.selected_subscriptions,
            &self.custom_sub_amounts,
        )
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        budget::evaluate(&self.breakdown(), self.monthly_income)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSnapshot {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: String,
    pub name: Option<String>,
    #[serde(flatten)]
    pub contents: BudgetContents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, name, fixed_expenses, frequency_data, \
     selected_subscriptions, custom_sub_amounts, monthly_income, created_at, updated_at \
     FROM budget_snapshots";

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed width so text ordering in SQL matches chronological ordering.
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {column}: {e}")))
}

fn snapshot_from_row(row: &SqliteRow) -> Result<BudgetSnapshot> {
    let id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse snapshot id: {e}")))?;

    let fixed_expenses: String = row.try_get("fixed_expenses")?;
    let frequency_data: String = row.try_get("frequency_data")?;
    let selected_subscriptions: String = row.try_get("selected_subscriptions")?;
    let custom_sub_amounts: String = row.try_get("custom_sub_amounts")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(BudgetSnapshot {
        id,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        contents: BudgetContents {
            fixed_expenses: serde_json::from_str(&fixed_expenses)?,
            frequency_data: serde_json::from_str(&frequency_data)?,
            selected_subscriptions: serde_json::from_str(&selected_subscriptions)?,
            custom_sub_amounts: serde_json::from_str(&custom_sub_amounts)?,
            monthly_income: row.try_get("monthly_income")?,
        },
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

pub async fn create(
    pool: &SqlitePool,
    user_id: &str,
    name: Option<&str>,
    contents: &BudgetContents,
) -> Result<BudgetSnapshot> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let stamp = timestamp(now);

    sqlx::query(
        r#"
        INSERT INTO budget_snapshots (
            id, user_id, name, fixed_expenses, frequency_data,
            selected_subscriptions, custom_sub_amounts, monthly_income,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id)
    .bind(name)
    .bind(serde_json::to_string(&contents.fixed_expenses)?)
    .bind(serde_json::to_string(&contents.frequency_data)?)
    .bind(serde_json::to_string(&contents.selected_subscriptions)?)
    .bind(serde_json::to_string(&contents.custom_sub_amounts)?)
    .bind(contents.monthly_income)
    .bind(&stamp)
    .bind(&stamp)
    .execute(pool)
    .await?;

    info!("Saved budget {id} for user {user_id}");

    // Round-trip through the stored text so callers see what a later read returns.
    let stored = parse_timestamp("created_at", &stamp)?;
    Ok(BudgetSnapshot {
        id,
        user_id: user_id.to_string(),
        name: name.map(str::to_string),
        contents: contents.clone(),
        created_at: stored,
        updated_at: stored,
    })
}

pub async fn latest(pool: &SqlitePool, user_id: &str) -> Result<Option<BudgetSnapshot>> {
    let row = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE user_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(snapshot_from_row).transpose()
}

/// Newest first.
pub async fn history(pool: &SqlitePool, user_id: &str) -> Result<Vec<BudgetSnapshot>> {
    let rows = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE user_id = ? ORDER BY created_at DESC, rowid DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    debug!("Loaded {} budgets for user {user_id}", rows.len());
    rows.iter().map(snapshot_from_row).collect()
}

pub async fn find(pool: &SqlitePool, id: Uuid, user_id: &str) -> Result<Option<BudgetSnapshot>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ? AND user_id = ?"))
        .bind(id.to_string())
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(snapshot_from_row).transpose()
}

/// Replaces the saved contents. The name and creation time are kept.
pub async fn update(
    pool: &SqlitePool,
    id: Uuid,
    user_id: &str,
    contents: &BudgetContents,
) -> Result<BudgetSnapshot> {
    let result = sqlx::query(
        r#"
        UPDATE budget_snapshots
        SET fixed_expenses = ?, frequency_data = ?, selected_subscriptions = ?,
            custom_sub_amounts = ?, monthly_income = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(serde_json::to_string(&contents.fixed_expenses)?)
    .bind(serde_json::to_string(&contents.frequency_data)?)
    .bind(serde_json::to_string(&contents.selected_subscriptions)?)
    .bind(serde_json::to_string(&contents.custom_sub_amounts)?)
    .bind(contents.monthly_income)
    .bind(timestamp(Utc::now()))
    .bind(id.to_string())
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Budget".to_string()));
    }
    info!("Updated budget {id} for user {user_id}");

    find(pool, id, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("Budget".to_string()))
}

pub async fn delete(pool: &SqlitePool, id: Uuid, user_id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM budget_snapshots WHERE id = ? AND user_id = ?")
        .bind(id.to_string())
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Budget".to_string()));
    }
    info!("Deleted budget {id} for user {user_id}");
    Ok(())
}

/// Removes every budget a user owns. Called when the account itself goes away.
pub async fn delete_for_user(pool: &SqlitePool, user_id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM budget_snapshots WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    let removed = result.rows_affected();
    info!("Deleted {removed} budgets for user {user_id}");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Frequency;
    use crate::store::memory_pool;

    fn sample_contents(income: f64) -> BudgetContents {
        let mut contents = BudgetContents {
            monthly_income: income,
            ..BudgetContents::default()
        };
        contents.fixed_expenses.insert(ExpenseCategory::Housing, 1_500.0);
        contents.fixed_expenses.insert(ExpenseCategory::Savings, 400.0);
        contents.frequency_data.insert(
            FrequencyQuestion::Coffee,
            FrequencyAnswer {
                frequency: Frequency::Weekly,
                amount: 15.0,
            },
        );
        contents.selected_subscriptions.insert(SubscriptionId::Netflix);
        contents
    }

    #[tokio::test]
    async fn create_then_find_returns_same_contents() {
        let pool = memory_pool().await;
        let saved = create(&pool, "alice", Some("March"), &sample_contents(5_000.0))
            .await
            .expect("create");

        let found = find(&pool, saved.id, "alice")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found, saved);
        assert_eq!(found.name.as_deref(), Some("March"));
    }

    #[tokio::test]
    async fn other_users_cannot_see_or_touch_a_budget() {
        let pool = memory_pool().await;
        let saved = create(&pool, "alice", None, &sample_contents(5_000.0))
            .await
            .expect("create");

        assert!(find(&pool, saved.id, "bob").await.expect("find").is_none());
        assert!(latest(&pool, "bob").await.expect("latest").is_none());
        assert!(matches!(
            update(&pool, saved.id, "bob", &sample_contents(1.0)).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            delete(&pool, saved.id, "bob").await,
            Err(Error::NotFound(_))
        ));
        assert!(find(&pool, saved.id, "alice").await.expect("find").is_some());
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let pool = memory_pool().await;
        let first = create(&pool, "alice", Some("first"), &sample_contents(4_000.0))
            .await
            .expect("create");
        let second = create(&pool, "alice", Some("second"), &sample_contents(4_500.0))
            .await
            .expect("create");
        create(&pool, "bob", None, &sample_contents(3_000.0))
            .await
            .expect("create");

        let ids: Vec<Uuid> = history(&pool, "alice")
            .await
            .expect("history")
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let newest = latest(&pool, "alice").await.expect("latest").expect("present");
        assert_eq!(newest.id, second.id);
    }

    #[tokio::test]
    async fn update_replaces_contents_and_bumps_timestamp() {
        let pool = memory_pool().await;
        let saved = create(&pool, "alice", Some("keep me"), &sample_contents(5_000.0))
            .await
            .expect("create");

        let mut changed = sample_contents(6_000.0);
        changed.fixed_expenses.insert(ExpenseCategory::Housing, 1_800.0);
        let updated = update(&pool, saved.id, "alice", &changed)
            .await
            .expect("update");

        assert_eq!(updated.contents, changed);
        assert_eq!(updated.name.as_deref(), Some("keep me"));
        assert_eq!(updated.created_at, saved.created_at);
        assert!(updated.updated_at >= saved.updated_at);
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let pool = memory_pool().await;
        let doomed = create(&pool, "alice", None, &sample_contents(5_000.0))
            .await
            .expect("create");
        let kept = create(&pool, "alice", None, &sample_contents(5_000.0))
            .await
            .expect("create");

        delete(&pool, doomed.id, "alice").await.expect("delete");
        assert!(find(&pool, doomed.id, "alice").await.expect("find").is_none());
        assert!(find(&pool, kept.id, "alice").await.expect("find").is_some());
        assert!(matches!(
            delete(&pool, doomed.id, "alice").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_for_user_cascades() {
        let pool = memory_pool().await;
        for _ in 0..3 {
            create(&pool, "alice", None, &sample_contents(5_000.0))
                .await
                .expect("create");
        }
        create(&pool, "bob", None, &sample_contents(5_000.0))
            .await
            .expect("create");

        assert_eq!(delete_for_user(&pool, "alice").await.expect("cascade"), 3);
        assert!(history(&pool, "alice").await.expect("history").is_empty());
        assert_eq!(history(&pool, "bob").await.expect("history").len(), 1);
    }

    #[test]
    fn saved_contents_feed_the_recommendation_engine() {
        let contents = sample_contents(5_000.0);
        let breakdown = contents.breakdown();
        assert!((breakdown.amount(ExpenseCategory::DiningOut) - 65.0).abs() < 1e-9);
        assert!((breakdown.amount(ExpenseCategory::Subscriptions) - 15.49).abs() < 1e-9);

        let recs = contents.recommendations();
        assert!(recs.iter().any(|r| r.message.contains("Housing at 30%")));
    }

    #[test]
    fn contents_reject_unknown_expense_ids() {
        let json = r#"{"fixedExpenses": {"yacht": 10}, "frequencyData": {}, "monthlyIncome": 1}"#;
        assert!(serde_json::from_str::<BudgetContents>(json).is_err());
    }
}
