//! Debts, both payable and receivable.
//!
//! A debt with `total_installments` set is an installment debt: every
//! transaction linked to it advances `current_installment` by one, and the
//! status flips to PAID once the counter reaches the total. The ledger
//! mutation engine owns that bookkeeping; this module is the entity plus
//! plain CRUD.

use chrono::Utc;
use sea_orm::entity::{ActiveValue, prelude::*};
use sea_orm::QueryOrder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Ledger, LedgerError, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtKind {
    Payable,
    Receivable,
}

impl DebtKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payable => "PAYABLE",
            Self::Receivable => "RECEIVABLE",
        }
    }
}

impl TryFrom<&str> for DebtKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PAYABLE" => Ok(Self::Payable),
            "RECEIVABLE" => Ok(Self::Receivable),
            other => Err(LedgerError::Validation(format!(
                "invalid debt type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtStatus {
    Unpaid,
    Paid,
}

impl DebtStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::Paid => "PAID",
        }
    }
}

impl TryFrom<&str> for DebtStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "UNPAID" => Ok(Self::Unpaid),
            "PAID" => Ok(Self::Paid),
            other => Err(LedgerError::Validation(format!(
                "invalid debt status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "debts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub person_name: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub due_date: Option<DateTimeUtc>,
    pub description: Option<String>,
    /// Present only for installment debts.
    pub total_installments: Option<i32>,
    pub current_installment: Option<i32>,
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

impl Model {
    /// Whether this debt tracks a fixed number of expected payments.
    pub fn is_installment(&self) -> bool {
        self.total_installments.is_some_and(|total| total > 0)
    }
}

/// Fields for creating or replacing a debt.
#[derive(Clone, Debug)]
pub struct DebtInput {
    pub person_name: String,
    pub amount: Decimal,
    pub kind: DebtKind,
    pub status: DebtStatus,
    pub due_date: Option<DateTimeUtc>,
    pub description: Option<String>,
    pub total_installments: Option<i32>,
    pub current_installment: Option<i32>,
}

impl Ledger {
    /// List the caller's debts, newest first.
    pub async fn debts(&self, user_id: i32) -> ResultLedger<Vec<Model>> {
        let debts = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .all(self.db())
            .await?;
        Ok(debts)
    }

    pub async fn debt(&self, user_id: i32, id: i32) -> ResultLedger<Model> {
        Entity::find_by_id(id)
            .filter(Column::UserId.eq(user_id))
            .one(self.db())
            .await?
            .ok_or_else(|| LedgerError::NotFound("debt".to_string()))
    }

    pub async fn create_debt(&self, user_id: i32, input: DebtInput) -> ResultLedger<Model> {
        let now = Utc::now();
        let debt = ActiveModel {
            person_name: ActiveValue::Set(input.person_name),
            amount: ActiveValue::Set(input.amount),
            kind: ActiveValue::Set(input.kind.as_str().to_string()),
            status: ActiveValue::Set(input.status.as_str().to_string()),
            due_date: ActiveValue::Set(input.due_date),
            description: ActiveValue::Set(input.description),
            total_installments: ActiveValue::Set(input.total_installments),
            current_installment: ActiveValue::Set(input.current_installment),
            user_id: ActiveValue::Set(user_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        Ok(debt.insert(self.db()).await?)
    }

    pub async fn update_debt(
        &self,
        user_id: i32,
        id: i32,
        input: DebtInput,
    ) -> ResultLedger<Model> {
        let debt = self.debt(user_id, id).await?;
        let mut debt: ActiveModel = debt.into();
        debt.person_name = ActiveValue::Set(input.person_name);
        debt.amount = ActiveValue::Set(input.amount);
        debt.kind = ActiveValue::Set(input.kind.as_str().to_string());
        debt.status = ActiveValue::Set(input.status.as_str().to_string());
        debt.due_date = ActiveValue::Set(input.due_date);
        debt.description = ActiveValue::Set(input.description);
        debt.total_installments = ActiveValue::Set(input.total_installments);
        debt.current_installment = ActiveValue::Set(input.current_installment);
        debt.updated_at = ActiveValue::Set(Utc::now());
        Ok(debt.update(self.db()).await?)
    }

    pub async fn delete_debt(&self, user_id: i32, id: i32) -> ResultLedger<()> {
        let debt = self.debt(user_id, id).await?;
        debt.delete(self.db()).await?;
        Ok(())
    }
}
