//! Wire types for the HTTP API.
//!
//! Request bodies deserialize from camelCase JSON; enums travel in
//! SCREAMING_SNAKE_CASE. Amount fields accept either a JSON number or a
//! numeric string, coerced explicitly before validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a decimal from a JSON number or a numeric string.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(Decimal),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Like [`lenient_decimal`] but for optional fields.
pub fn lenient_decimal_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(Decimal),
        Text(String),
    }

    let raw: Option<Raw> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Deserialize `Option<Option<T>>` so an absent field and an explicit
/// `null` are distinguishable: absent stays `None`, `null` becomes
/// `Some(None)`. Pair with `#[serde(default, deserialize_with = ...)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Generic `{ "message": ... }` body for confirmations and errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub email: String,
        pub password: String,
        pub name: String,
        /// Display currency, "IDR" (default) or "USD".
        pub currency: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RegisterResponse {
        pub message: String,
        pub user_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthUser {
        pub id: i32,
        pub name: String,
        pub email: String,
        pub currency: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub user: AuthUser,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountUpsert {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: String,
        #[serde(default, deserialize_with = "lenient_decimal_opt")]
        pub balance: Option<Decimal>,
        pub stock_symbol: Option<String>,
        #[serde(default, deserialize_with = "lenient_decimal_opt")]
        pub quantity: Option<Decimal>,
        pub image_url: Option<String>,
        pub goal_id: Option<i32>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpsert {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: String,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        #[serde(deserialize_with = "lenient_decimal")]
        pub amount: Decimal,
        pub date: DateTime<Utc>,
        pub description: Option<String>,
        #[serde(rename = "type")]
        pub kind: String,
        pub category_id: i32,
        pub account_id: Option<i32>,
        pub target_account_id: Option<i32>,
        pub goal_id: Option<i32>,
        pub debt_id: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListQuery {
        pub start_date: Option<DateTime<Utc>>,
        pub end_date: Option<DateTime<Utc>>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub category_id: Option<i32>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetNew {
        #[serde(deserialize_with = "lenient_decimal")]
        pub amount: Decimal,
        pub month: i32,
        pub year: i32,
        pub category_id: i32,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetListQuery {
        pub month: Option<i32>,
        pub year: Option<i32>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GoalUpsert {
        pub name: String,
        #[serde(deserialize_with = "lenient_decimal")]
        pub target_amount: Decimal,
        #[serde(default, deserialize_with = "lenient_decimal_opt")]
        pub current_amount: Option<Decimal>,
        pub image_url: Option<String>,
        pub deadline: Option<DateTime<Utc>>,
        pub status: Option<String>,
        pub account_id: Option<i32>,
    }
}

pub mod debt {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DebtUpsert {
        pub person_name: String,
        #[serde(deserialize_with = "lenient_decimal")]
        pub amount: Decimal,
        #[serde(rename = "type")]
        pub kind: String,
        pub status: Option<String>,
        pub due_date: Option<DateTime<Utc>>,
        pub description: Option<String>,
        pub total_installments: Option<i32>,
        pub current_installment: Option<i32>,
    }
}

pub mod planned_expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PlannedExpenseNew {
        #[serde(deserialize_with = "lenient_decimal")]
        pub amount: Decimal,
        pub date: DateTime<Utc>,
        pub description: Option<String>,
        pub category_id: i32,
        pub account_id: Option<i32>,
    }

    /// Patch body: only fields present in the JSON are applied, so a
    /// field set to `null` clears it while an absent field is left alone.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PlannedExpensePatch {
        #[serde(default, deserialize_with = "lenient_decimal_opt")]
        pub amount: Option<Decimal>,
        pub date: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "double_option")]
        pub description: Option<Option<String>>,
        pub category_id: Option<i32>,
        #[serde(default, deserialize_with = "double_option")]
        pub account_id: Option<Option<i32>>,
        pub status: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PlannedExpenseListQuery {
        pub month: Option<i32>,
        pub year: Option<i32>,
        pub status: Option<String>,
    }
}
