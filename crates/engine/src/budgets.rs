//! Monthly spending ceilings per category.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Ledger, LedgerError, ResultLedger, transactions, transactions::TransactionKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub amount: Decimal,
    /// 1-12.
    pub month: i32,
    pub year: i32,
    pub category_id: i32,
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
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
}

impl ActiveModelBehavior for ActiveModel {}

/// A budget with its spending progress for the covered month.
#[derive(Clone, Debug, Serialize)]
pub struct BudgetProgress {
    #[serde(flatten)]
    pub budget: Model,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Spent share of the ceiling, capped at 100.
    pub percentage: Decimal,
}

impl Ledger {
    /// List the caller's budgets, optionally narrowed to a period, each
    /// with its expense progress.
    pub async fn budgets(
        &self,
        user_id: i32,
        month: Option<i32>,
        year: Option<i32>,
    ) -> ResultLedger<Vec<BudgetProgress>> {
        let mut query = Entity::find().filter(Column::UserId.eq(user_id));
        if let Some(month) = month {
            query = query.filter(Column::Month.eq(month));
        }
        if let Some(year) = year {
            query = query.filter(Column::Year.eq(year));
        }
        let budgets = query.all(self.db()).await?;

        let mut out = Vec::with_capacity(budgets.len());
        for budget in budgets {
            let spent = self.spent_in_period(user_id, &budget).await?;
            let remaining = budget.amount - spent;
            let percentage = if budget.amount.is_zero() {
                Decimal::ZERO
            } else {
                (spent / budget.amount * Decimal::from(100)).min(Decimal::from(100))
            };
            out.push(BudgetProgress {
                budget,
                spent,
                remaining,
                percentage,
            });
        }
        Ok(out)
    }

    async fn spent_in_period(&self, user_id: i32, budget: &Model) -> ResultLedger<Decimal> {
        let start = month_start(budget.year, budget.month)?;
        let end = if budget.month == 12 {
            month_start(budget.year + 1, 1)?
        } else {
            month_start(budget.year, budget.month + 1)?
        };

        let expenses = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::CategoryId.eq(budget.category_id))
            .filter(transactions::Column::Kind.eq(TransactionKind::Expense.as_str()))
            .filter(transactions::Column::Date.gte(start))
            .filter(transactions::Column::Date.lt(end))
            .all(self.db())
            .await?;

        Ok(expenses.iter().map(|t| t.amount).sum())
    }

    pub async fn create_budget(
        &self,
        user_id: i32,
        amount: Decimal,
        month: i32,
        year: i32,
        category_id: i32,
    ) -> ResultLedger<Model> {
        self.category(user_id, category_id)
            .await
            .map_err(|_| LedgerError::InvalidReference("category".to_string()))?;

        let existing = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::CategoryId.eq(category_id))
            .filter(Column::Month.eq(month))
            .filter(Column::Year.eq(year))
            .one(self.db())
            .await?;
        if existing.is_some() {
            return Err(LedgerError::InvalidOperation(
                "Budget already exists for this category in this period".to_string(),
            ));
        }

        let now = Utc::now();
        let budget = ActiveModel {
            amount: ActiveValue::Set(amount),
            month: ActiveValue::Set(month),
            year: ActiveValue::Set(year),
            category_id: ActiveValue::Set(category_id),
            user_id: ActiveValue::Set(user_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        Ok(budget.insert(self.db()).await?)
    }

    pub async fn delete_budget(&self, user_id: i32, id: i32) -> ResultLedger<()> {
        let budget = Entity::find_by_id(id)
            .filter(Column::UserId.eq(user_id))
            .one(self.db())
            .await?
            .ok_or_else(|| LedgerError::NotFound("budget".to_string()))?;
        budget.delete(self.db()).await?;
        Ok(())
    }
}

fn month_start(year: i32, month: i32) -> ResultLedger<DateTimeUtc> {
    Utc.with_ymd_and_hms(year, month as u32, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| LedgerError::Validation(format!("invalid period {year}-{month}")))
}
