//! Transaction primitives.
//!
//! A transaction is the only thing that moves money: an income, an expense,
//! or a transfer between two of the caller's accounts. The side effects on
//! account balances, goal progress and debt installments live in
//! [`crate::ledger`]; this module holds the entity and its value types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            "TRANSFER" => Ok(Self::Transfer),
            other => Err(LedgerError::Validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub amount: Decimal,
    pub date: DateTimeUtc,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub category_id: i32,
    pub account_id: Option<i32>,
    /// Destination account, set for transfers only.
    pub target_account_id: Option<i32>,
    pub goal_id: Option<i32>,
    pub debt_id: Option<i32>,
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

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields for creating a transaction.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub kind: TransactionKind,
    pub category_id: i32,
    pub account_id: Option<i32>,
    pub target_account_id: Option<i32>,
    pub goal_id: Option<i32>,
    pub debt_id: Option<i32>,
}

/// Optional filters for listing transactions.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    /// Inclusive date range, applied only when both ends are present.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<i32>,
}
