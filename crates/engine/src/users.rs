//! User accounts.
//!
//! Every other entity hangs off a user through `user_id`; all ledger
//! operations take the authenticated user's id and scope their queries
//! with it.

use sea_orm::TransactionTrait;
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{Ledger, LedgerError, ResultLedger, accounts, categories};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 password hash, never serialized out of the engine.
    pub password: String,
    pub name: String,
    /// Display currency code, "IDR" or "USD".
    pub currency: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Starter categories created with every new user.
const DEFAULT_CATEGORIES: [(&str, categories::CategoryKind); 5] = [
    ("Salary", categories::CategoryKind::Income),
    ("Food", categories::CategoryKind::Expense),
    ("Transport", categories::CategoryKind::Expense),
    ("Utilities", categories::CategoryKind::Expense),
    ("Entertainment", categories::CategoryKind::Expense),
];

/// Fields for registering a user. `password` is the finished hash; the
/// engine never sees cleartext credentials.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub currency: String,
}

impl Ledger {
    /// Return a user by id.
    pub async fn user(&self, user_id: i32) -> ResultLedger<Model> {
        Entity::find_by_id(user_id)
            .one(self.db())
            .await?
            .ok_or_else(|| LedgerError::NotFound("user".to_string()))
    }

    /// Return a user by email, if one exists.
    pub async fn user_by_email(&self, email: &str) -> ResultLedger<Option<Model>> {
        let user = Entity::find()
            .filter(Column::Email.eq(email))
            .one(self.db())
            .await?;
        Ok(user)
    }

    /// Create a user together with their starter data: one "Wallet" cash
    /// account and a handful of default categories, all in one database
    /// transaction.
    pub async fn register_user(&self, new: NewUser) -> ResultLedger<Model> {
        let existing = self.user_by_email(&new.email).await?;
        if existing.is_some() {
            return Err(LedgerError::InvalidOperation(
                "Email already exists".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        let txn = self.db().begin().await?;

        let user = ActiveModel {
            email: ActiveValue::Set(new.email),
            password: ActiveValue::Set(new.password),
            name: ActiveValue::Set(new.name),
            currency: ActiveValue::Set(new.currency),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        accounts::ActiveModel {
            name: ActiveValue::Set("Wallet".to_string()),
            kind: ActiveValue::Set(accounts::AccountKind::Cash.as_str().to_string()),
            balance: ActiveValue::Set(rust_decimal::Decimal::ZERO),
            user_id: ActiveValue::Set(user.id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (name, kind) in DEFAULT_CATEGORIES {
            categories::ActiveModel {
                name: ActiveValue::Set(name.to_string()),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                user_id: ActiveValue::Set(user.id),
                created_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(user)
    }
}
