//! Portable per-user snapshots.
//!
//! A snapshot carries the user's whole entity graph in one versioned JSON
//! document. Restore is destructive: it wipes the caller's existing data
//! and reconstructs the graph with the snapshot's own ids, so every
//! cross-reference (transfer targets, goal pockets, debt links) survives
//! the round trip byte for byte. The account/goal cycle is broken by
//! inserting accounts without their goal link, inserting goals, then
//! re-linking the accounts in a second pass.

use chrono::Utc;
use sea_orm::entity::{ActiveValue, prelude::*};
use sea_orm::{IntoActiveModel, TransactionTrait};
use serde::{Deserialize, Serialize};

use crate::{
    Ledger, LedgerError, ResultLedger, accounts, budgets, categories, debts, goals,
    planned_expenses, transactions, users,
};

pub const SNAPSHOT_VERSION: u32 = 1;

/// The owning user, without the password hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub currency: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl From<users::Model> for UserProfile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            currency: user.currency,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotData {
    pub user: UserProfile,
    pub accounts: Vec<accounts::Model>,
    pub categories: Vec<categories::Model>,
    pub transactions: Vec<transactions::Model>,
    pub budgets: Vec<budgets::Model>,
    pub goals: Vec<goals::Model>,
    pub debts: Vec<debts::Model>,
    pub planned_expenses: Vec<planned_expenses::Model>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub timestamp: DateTimeUtc,
    pub data: SnapshotData,
}

impl Ledger {
    /// Serialize everything the user owns into one snapshot.
    pub async fn export_data(&self, user_id: i32) -> ResultLedger<Snapshot> {
        let user = self.user(user_id).await?;

        let data = SnapshotData {
            user: user.into(),
            accounts: accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id))
                .all(self.db())
                .await?,
            categories: categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id))
                .all(self.db())
                .await?,
            transactions: transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .all(self.db())
                .await?,
            budgets: budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id))
                .all(self.db())
                .await?,
            goals: goals::Entity::find()
                .filter(goals::Column::UserId.eq(user_id))
                .all(self.db())
                .await?,
            debts: debts::Entity::find()
                .filter(debts::Column::UserId.eq(user_id))
                .all(self.db())
                .await?,
            planned_expenses: planned_expenses::Entity::find()
                .filter(planned_expenses::Column::UserId.eq(user_id))
                .all(self.db())
                .await?,
        };

        Ok(Snapshot {
            version: SNAPSHOT_VERSION,
            timestamp: Utc::now(),
            data,
        })
    }

    /// Replace the user's data with a snapshot's contents.
    ///
    /// The raw JSON is validated up front; a document that does not parse
    /// as a snapshot is rejected before anything is touched. The whole
    /// wipe-and-rebuild runs in one database transaction.
    pub async fn restore_data(&self, user_id: i32, raw: serde_json::Value) -> ResultLedger<()> {
        let snapshot: Snapshot = serde_json::from_value(raw)
            .map_err(|_| LedgerError::InvalidOperation("Invalid backup format".to_string()))?;
        let data = snapshot.data;

        let txn = self.db().begin().await?;

        // Wipe in reverse dependency order. Planned expenses go first
        // since they reference transactions; the account/goal cycle is
        // broken by clearing the pocket links before deleting goals.
        planned_expenses::Entity::delete_many()
            .filter(planned_expenses::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        transactions::Entity::delete_many()
            .filter(transactions::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        budgets::Entity::delete_many()
            .filter(budgets::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        debts::Entity::delete_many()
            .filter(debts::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        accounts::Entity::update_many()
            .col_expr(accounts::Column::GoalId, Expr::value(Option::<i32>::None))
            .filter(accounts::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        goals::Entity::delete_many()
            .filter(goals::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        accounts::Entity::delete_many()
            .filter(accounts::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        categories::Entity::delete_many()
            .filter(categories::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        // Rebuild in dependency order, keeping the snapshot's ids and
        // re-parenting every row to the caller.
        for category in &data.categories {
            let mut row = category.clone().into_active_model();
            row.user_id = ActiveValue::Set(user_id);
            row.insert(&txn).await?;
        }

        for account in &data.accounts {
            let mut row = account.clone().into_active_model();
            row.user_id = ActiveValue::Set(user_id);
            row.goal_id = ActiveValue::Set(None);
            row.insert(&txn).await?;
        }

        for goal in &data.goals {
            let mut row = goal.clone().into_active_model();
            row.user_id = ActiveValue::Set(user_id);
            row.insert(&txn).await?;
        }

        for account in &data.accounts {
            if account.goal_id.is_some() {
                let row = accounts::ActiveModel {
                    id: ActiveValue::Unchanged(account.id),
                    goal_id: ActiveValue::Set(account.goal_id),
                    ..Default::default()
                };
                row.update(&txn).await?;
            }
        }

        for debt in &data.debts {
            let mut row = debt.clone().into_active_model();
            row.user_id = ActiveValue::Set(user_id);
            row.insert(&txn).await?;
        }

        for budget in &data.budgets {
            let mut row = budget.clone().into_active_model();
            row.user_id = ActiveValue::Set(user_id);
            row.insert(&txn).await?;
        }

        for transaction in &data.transactions {
            let mut row = transaction.clone().into_active_model();
            row.user_id = ActiveValue::Set(user_id);
            row.insert(&txn).await?;
        }

        for planned in &data.planned_expenses {
            let mut row = planned.clone().into_active_model();
            row.user_id = ActiveValue::Set(user_id);
            row.insert(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}
