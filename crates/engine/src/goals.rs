//! Savings goals.
//!
//! A goal's progress has two sources of truth that must not be conflated:
//! the stored `current_amount`, mutated by income/expense transactions that
//! reference the goal, and the derived amount computed from linked
//! accounts ("pockets"). The stored field stays the write-path source of
//! truth; [`effective_current_amount`] is applied at every read boundary.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::entity::{ActiveValue, prelude::*};
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};

use crate::{Ledger, LedgerError, ResultLedger, accounts};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl TryFrom<&str> for GoalStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(LedgerError::Validation(format!(
                "invalid goal status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goals")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub target_amount: Decimal,
    /// Stored progress. Display uses [`effective_current_amount`] when
    /// linked accounts exist.
    pub current_amount: Decimal,
    pub image_url: Option<String>,
    pub deadline: Option<DateTimeUtc>,
    pub status: String,
    /// Singular linked account.
    pub account_id: Option<i32>,
    pub user_id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields for creating or replacing a goal.
#[derive(Clone, Debug)]
pub struct GoalInput {
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub image_url: Option<String>,
    pub deadline: Option<DateTimeUtc>,
    pub status: GoalStatus,
    pub account_id: Option<i32>,
}

/// A goal together with its derived progress and pockets.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Model,
    /// The amount to display, per the pocket derivation.
    pub effective_current_amount: Decimal,
    pub linked_accounts: Vec<accounts::Model>,
}

/// Derive the amount a goal should display.
///
/// Pockets win over the singular linked account, which wins over the
/// stored value. As soon as no linked accounts remain, display reverts to
/// the stored amount.
pub fn effective_current_amount(
    stored: Decimal,
    singular_balance: Option<Decimal>,
    pocket_balances: &[Decimal],
) -> Decimal {
    if !pocket_balances.is_empty() {
        return pocket_balances.iter().sum();
    }
    if let Some(balance) = singular_balance {
        return balance;
    }
    stored
}

impl Ledger {
    /// List the caller's goals, newest first, with derived progress.
    pub async fn goals(&self, user_id: i32) -> ResultLedger<Vec<GoalView>> {
        let goals = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .all(self.db())
            .await?;

        let mut views = Vec::with_capacity(goals.len());
        for goal in goals {
            views.push(self.goal_view(goal).await?);
        }
        Ok(views)
    }

    pub async fn goal(&self, user_id: i32, id: i32) -> ResultLedger<Model> {
        Entity::find_by_id(id)
            .filter(Column::UserId.eq(user_id))
            .one(self.db())
            .await?
            .ok_or_else(|| LedgerError::NotFound("goal".to_string()))
    }

    async fn goal_view(&self, goal: Model) -> ResultLedger<GoalView> {
        let linked_accounts = accounts::Entity::find()
            .filter(accounts::Column::GoalId.eq(goal.id))
            .all(self.db())
            .await?;

        let singular_balance = match goal.account_id {
            Some(account_id) => accounts::Entity::find_by_id(account_id)
                .one(self.db())
                .await?
                .map(|account| account.balance),
            None => None,
        };

        let pocket_balances: Vec<Decimal> =
            linked_accounts.iter().map(|a| a.balance).collect();
        let effective =
            effective_current_amount(goal.current_amount, singular_balance, &pocket_balances);

        Ok(GoalView {
            goal,
            effective_current_amount: effective,
            linked_accounts,
        })
    }

    pub async fn create_goal(&self, user_id: i32, mut input: GoalInput) -> ResultLedger<GoalView> {
        // Linking an account at creation snapshots its balance as the
        // starting progress.
        if let Some(account_id) = input.account_id {
            if let Ok(account) = self.account(user_id, account_id).await {
                input.current_amount = account.balance;
            }
        }

        let now = Utc::now();
        let goal = ActiveModel {
            name: ActiveValue::Set(input.name),
            target_amount: ActiveValue::Set(input.target_amount),
            current_amount: ActiveValue::Set(input.current_amount),
            image_url: ActiveValue::Set(input.image_url),
            deadline: ActiveValue::Set(input.deadline),
            status: ActiveValue::Set(input.status.as_str().to_string()),
            account_id: ActiveValue::Set(input.account_id),
            user_id: ActiveValue::Set(user_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let goal = goal.insert(self.db()).await?;
        self.goal_view(goal).await
    }

    pub async fn update_goal(
        &self,
        user_id: i32,
        id: i32,
        mut input: GoalInput,
    ) -> ResultLedger<GoalView> {
        let goal = self.goal(user_id, id).await?;

        if let Some(account_id) = input.account_id {
            if let Ok(account) = self.account(user_id, account_id).await {
                input.current_amount = account.balance;
            }
        }

        let mut goal: ActiveModel = goal.into();
        goal.name = ActiveValue::Set(input.name);
        goal.target_amount = ActiveValue::Set(input.target_amount);
        goal.current_amount = ActiveValue::Set(input.current_amount);
        goal.image_url = ActiveValue::Set(input.image_url);
        goal.deadline = ActiveValue::Set(input.deadline);
        goal.status = ActiveValue::Set(input.status.as_str().to_string());
        goal.account_id = ActiveValue::Set(input.account_id);
        goal.updated_at = ActiveValue::Set(Utc::now());
        let goal = goal.update(self.db()).await?;
        self.goal_view(goal).await
    }

    pub async fn delete_goal(&self, user_id: i32, id: i32) -> ResultLedger<()> {
        let goal = self.goal(user_id, id).await?;

        // Detach pockets first so the foreign key does not block the delete.
        let pockets = accounts::Entity::find()
            .filter(accounts::Column::GoalId.eq(id))
            .all(self.db())
            .await?;
        for pocket in pockets {
            let mut pocket: accounts::ActiveModel = pocket.into();
            pocket.goal_id = ActiveValue::Set(None);
            pocket.update(self.db()).await?;
        }

        goal.delete(self.db()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn pockets_override_stored_amount() {
        let effective = effective_current_amount(
            Decimal::new(5_000, 0),
            Some(Decimal::new(7_000, 0)),
            &[Decimal::new(1_000, 0), Decimal::new(2_500, 0)],
        );
        assert_eq!(effective, Decimal::new(3_500, 0));
    }

    #[test]
    fn singular_account_overrides_stored_amount() {
        let effective =
            effective_current_amount(Decimal::new(5_000, 0), Some(Decimal::new(7_000, 0)), &[]);
        assert_eq!(effective, Decimal::new(7_000, 0));
    }

    #[test]
    fn stored_amount_without_links() {
        let effective = effective_current_amount(Decimal::new(5_000, 0), None, &[]);
        assert_eq!(effective, Decimal::new(5_000, 0));
    }
}
