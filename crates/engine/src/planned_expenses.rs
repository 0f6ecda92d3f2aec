//! Planned expenses: spending committed to in advance.
//!
//! Executing a planned expense is a pure status flip PLANNED -> EXECUTED;
//! it does not create a transaction and does not touch balances. The
//! optional `transaction_id` link exists so a client that records the
//! matching transaction separately can tie the two rows together.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::{ActiveValue, prelude::*};
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};

use crate::{Ledger, LedgerError, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlannedStatus {
    Planned,
    Executed,
    Cancelled,
}

impl PlannedStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::Executed => "EXECUTED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl TryFrom<&str> for PlannedStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PLANNED" => Ok(Self::Planned),
            "EXECUTED" => Ok(Self::Executed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(LedgerError::Validation(format!(
                "invalid planned expense status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "planned_expenses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub amount: Decimal,
    pub date: DateTimeUtc,
    pub description: Option<String>,
    pub status: String,
    pub category_id: i32,
    pub account_id: Option<i32>,
    pub transaction_id: Option<i32>,
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
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields for creating a planned expense.
#[derive(Clone, Debug)]
pub struct NewPlannedExpense {
    pub amount: Decimal,
    pub date: DateTimeUtc,
    pub description: Option<String>,
    pub category_id: i32,
    pub account_id: Option<i32>,
}

/// Patch-style update where each field is independently present or absent.
///
/// `account_id` distinguishes "leave as-is" (outer `None`) from "detach"
/// (`Some(None)`), so an absent field never clobbers a stored link.
#[derive(Clone, Debug, Default)]
pub struct PlannedExpenseUpdate {
    pub amount: Option<Decimal>,
    pub date: Option<DateTimeUtc>,
    pub description: Option<Option<String>>,
    pub category_id: Option<i32>,
    pub account_id: Option<Option<i32>>,
    pub status: Option<PlannedStatus>,
}

impl Ledger {
    /// List the caller's planned expenses in date order, optionally
    /// narrowed by month/year and status.
    pub async fn planned_expenses(
        &self,
        user_id: i32,
        month: Option<i32>,
        year: Option<i32>,
        status: Option<PlannedStatus>,
    ) -> ResultLedger<Vec<Model>> {
        let mut query = Entity::find().filter(Column::UserId.eq(user_id));

        if let (Some(month), Some(year)) = (month, year) {
            let start = Utc
                .with_ymd_and_hms(year, month as u32, 1, 0, 0, 0)
                .single()
                .ok_or_else(|| LedgerError::Validation(format!("invalid period {year}-{month}")))?;
            let end = if month == 12 {
                Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
            } else {
                Utc.with_ymd_and_hms(year, month as u32 + 1, 1, 0, 0, 0)
            }
            .single()
            .ok_or_else(|| LedgerError::Validation(format!("invalid period {year}-{month}")))?;
            query = query
                .filter(Column::Date.gte(start))
                .filter(Column::Date.lt(end));
        }
        if let Some(status) = status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        let rows = query.order_by_asc(Column::Date).all(self.db()).await?;
        Ok(rows)
    }

    pub async fn planned_expense(&self, user_id: i32, id: i32) -> ResultLedger<Model> {
        Entity::find_by_id(id)
            .filter(Column::UserId.eq(user_id))
            .one(self.db())
            .await?
            .ok_or_else(|| LedgerError::NotFound("planned expense".to_string()))
    }

    pub async fn create_planned_expense(
        &self,
        user_id: i32,
        input: NewPlannedExpense,
    ) -> ResultLedger<Model> {
        self.category(user_id, input.category_id)
            .await
            .map_err(|_| LedgerError::InvalidReference("category".to_string()))?;
        if let Some(account_id) = input.account_id {
            self.account(user_id, account_id)
                .await
                .map_err(|_| LedgerError::InvalidReference("account".to_string()))?;
        }

        let now = Utc::now();
        let planned = ActiveModel {
            amount: ActiveValue::Set(input.amount),
            date: ActiveValue::Set(input.date),
            description: ActiveValue::Set(input.description),
            status: ActiveValue::Set(PlannedStatus::Planned.as_str().to_string()),
            category_id: ActiveValue::Set(input.category_id),
            account_id: ActiveValue::Set(input.account_id),
            user_id: ActiveValue::Set(user_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        Ok(planned.insert(self.db()).await?)
    }

    /// Apply a partial update; only present fields are written.
    pub async fn update_planned_expense(
        &self,
        user_id: i32,
        id: i32,
        update: PlannedExpenseUpdate,
    ) -> ResultLedger<Model> {
        let planned = self.planned_expense(user_id, id).await?;

        if let Some(category_id) = update.category_id {
            self.category(user_id, category_id)
                .await
                .map_err(|_| LedgerError::InvalidReference("category".to_string()))?;
        }
        if let Some(Some(account_id)) = update.account_id {
            self.account(user_id, account_id)
                .await
                .map_err(|_| LedgerError::InvalidReference("account".to_string()))?;
        }

        let mut planned: ActiveModel = planned.into();
        if let Some(amount) = update.amount {
            planned.amount = ActiveValue::Set(amount);
        }
        if let Some(date) = update.date {
            planned.date = ActiveValue::Set(date);
        }
        if let Some(description) = update.description {
            planned.description = ActiveValue::Set(description);
        }
        if let Some(category_id) = update.category_id {
            planned.category_id = ActiveValue::Set(category_id);
        }
        if let Some(account_id) = update.account_id {
            planned.account_id = ActiveValue::Set(account_id);
        }
        if let Some(status) = update.status {
            planned.status = ActiveValue::Set(status.as_str().to_string());
        }
        planned.updated_at = ActiveValue::Set(Utc::now());
        Ok(planned.update(self.db()).await?)
    }

    pub async fn delete_planned_expense(&self, user_id: i32, id: i32) -> ResultLedger<()> {
        let planned = self.planned_expense(user_id, id).await?;
        planned.delete(self.db()).await?;
        Ok(())
    }

    /// Flip a planned expense to EXECUTED.
    ///
    /// Execution never creates a transaction; re-executing is refused.
    pub async fn execute_planned_expense(&self, user_id: i32, id: i32) -> ResultLedger<Model> {
        let planned = self.planned_expense(user_id, id).await?;

        if planned.status == PlannedStatus::Executed.as_str() {
            return Err(LedgerError::InvalidOperation(
                "Planned expense already executed".to_string(),
            ));
        }

        let mut planned: ActiveModel = planned.into();
        planned.status = ActiveValue::Set(PlannedStatus::Executed.as_str().to_string());
        planned.updated_at = ActiveValue::Set(Utc::now());
        Ok(planned.update(self.db()).await?)
    }
}
