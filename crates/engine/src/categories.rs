//! Transaction categories, split into income and expense kinds.

use chrono::Utc;
use sea_orm::entity::{ActiveValue, prelude::*};
use sea_orm::{PaginatorTrait, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::{Ledger, LedgerError, ResultLedger, transactions};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            other => Err(LedgerError::Validation(format!(
                "invalid category type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl ActiveModelBehavior for ActiveModel {}

impl Ledger {
    /// List the caller's categories in name order.
    pub async fn categories(&self, user_id: i32) -> ResultLedger<Vec<Model>> {
        let categories = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::Name)
            .all(self.db())
            .await?;
        Ok(categories)
    }

    pub async fn category(&self, user_id: i32, id: i32) -> ResultLedger<Model> {
        Entity::find_by_id(id)
            .filter(Column::UserId.eq(user_id))
            .one(self.db())
            .await?
            .ok_or_else(|| LedgerError::NotFound("category".to_string()))
    }

    pub async fn create_category(
        &self,
        user_id: i32,
        name: String,
        kind: CategoryKind,
    ) -> ResultLedger<Model> {
        let category = ActiveModel {
            name: ActiveValue::Set(name),
            kind: ActiveValue::Set(kind.as_str().to_string()),
            user_id: ActiveValue::Set(user_id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        Ok(category.insert(self.db()).await?)
    }

    pub async fn update_category(
        &self,
        user_id: i32,
        id: i32,
        name: String,
        kind: CategoryKind,
    ) -> ResultLedger<Model> {
        let category = self.category(user_id, id).await?;
        let mut category: ActiveModel = category.into();
        category.name = ActiveValue::Set(name);
        category.kind = ActiveValue::Set(kind.as_str().to_string());
        Ok(category.update(self.db()).await?)
    }

    /// Delete a category, refused while transactions still reference it.
    pub async fn delete_category(&self, user_id: i32, id: i32) -> ResultLedger<()> {
        let category = self.category(user_id, id).await?;

        let referencing = transactions::Entity::find()
            .filter(transactions::Column::CategoryId.eq(id))
            .count(self.db())
            .await?;
        if referencing > 0 {
            return Err(LedgerError::InvalidOperation(
                "Cannot delete category with associated transactions".to_string(),
            ));
        }

        category.delete(self.db()).await?;
        Ok(())
    }
}
