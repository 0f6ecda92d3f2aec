//! The module contains the representation of an account.
//!
//! An account is anywhere money is kept: a bank account, an e-wallet,
//! physical cash, or an investment position (mutual funds, stocks, crypto).
//! Balances are maintained incrementally by the ledger mutation engine
//! rather than recomputed from the transaction log on every read.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::entity::{ActiveValue, prelude::*};
use sea_orm::{PaginatorTrait, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::{Ledger, LedgerError, ResultLedger, transactions};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Bank,
    EWallet,
    Cash,
    Other,
    Reksadana,
    Saham,
    Crypto,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "BANK",
            Self::EWallet => "E_WALLET",
            Self::Cash => "CASH",
            Self::Other => "OTHER",
            Self::Reksadana => "REKSADANA",
            Self::Saham => "SAHAM",
            Self::Crypto => "CRYPTO",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "BANK" => Ok(Self::Bank),
            "E_WALLET" => Ok(Self::EWallet),
            "CASH" => Ok(Self::Cash),
            "OTHER" => Ok(Self::Other),
            "REKSADANA" => Ok(Self::Reksadana),
            "SAHAM" => Ok(Self::Saham),
            "CRYPTO" => Ok(Self::Crypto),
            other => Err(LedgerError::Validation(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub balance: Decimal,
    pub stock_symbol: Option<String>,
    pub quantity: Option<Decimal>,
    pub image_url: Option<String>,
    /// Set when this account is earmarked as a pocket for a goal.
    pub goal_id: Option<i32>,
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
        belongs_to = "super::goals::Entity",
        from = "Column::GoalId",
        to = "super::goals::Column::Id"
    )]
    Goals,
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields for creating or replacing an account.
#[derive(Clone, Debug)]
pub struct AccountInput {
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub stock_symbol: Option<String>,
    pub quantity: Option<Decimal>,
    pub image_url: Option<String>,
    pub goal_id: Option<i32>,
}

impl Ledger {
    /// List the caller's accounts, newest first.
    pub async fn accounts(&self, user_id: i32) -> ResultLedger<Vec<Model>> {
        let accounts = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .all(self.db())
            .await?;
        Ok(accounts)
    }

    /// Return one of the caller's accounts.
    pub async fn account(&self, user_id: i32, id: i32) -> ResultLedger<Model> {
        Entity::find_by_id(id)
            .filter(Column::UserId.eq(user_id))
            .one(self.db())
            .await?
            .ok_or_else(|| LedgerError::NotFound("account".to_string()))
    }

    pub async fn create_account(&self, user_id: i32, input: AccountInput) -> ResultLedger<Model> {
        let now = Utc::now();
        let account = ActiveModel {
            name: ActiveValue::Set(input.name),
            kind: ActiveValue::Set(input.kind.as_str().to_string()),
            balance: ActiveValue::Set(input.balance),
            stock_symbol: ActiveValue::Set(input.stock_symbol),
            quantity: ActiveValue::Set(input.quantity),
            image_url: ActiveValue::Set(input.image_url),
            goal_id: ActiveValue::Set(input.goal_id),
            user_id: ActiveValue::Set(user_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        Ok(account.insert(self.db()).await?)
    }

    pub async fn update_account(
        &self,
        user_id: i32,
        id: i32,
        input: AccountInput,
    ) -> ResultLedger<Model> {
        let account = self.account(user_id, id).await?;
        let mut account: ActiveModel = account.into();
        account.name = ActiveValue::Set(input.name);
        account.kind = ActiveValue::Set(input.kind.as_str().to_string());
        account.balance = ActiveValue::Set(input.balance);
        account.stock_symbol = ActiveValue::Set(input.stock_symbol);
        account.quantity = ActiveValue::Set(input.quantity);
        account.image_url = ActiveValue::Set(input.image_url);
        account.goal_id = ActiveValue::Set(input.goal_id);
        account.updated_at = ActiveValue::Set(Utc::now());
        Ok(account.update(self.db()).await?)
    }

    /// Delete an account.
    ///
    /// Fails while any transaction still references the account, so the
    /// incremental balances stay reconcilable against the log.
    pub async fn delete_account(&self, user_id: i32, id: i32) -> ResultLedger<()> {
        let account = self.account(user_id, id).await?;

        let referencing = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(id))
            .count(self.db())
            .await?;
        if referencing > 0 {
            return Err(LedgerError::InvalidOperation(
                "Cannot delete account with associated transactions".to_string(),
            ));
        }

        account.delete(self.db()).await?;
        Ok(())
    }
}
