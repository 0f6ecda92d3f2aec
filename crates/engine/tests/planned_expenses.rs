use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::Database;

use engine::{Ledger, LedgerError, accounts, planned_expenses, users};
use migration::MigratorTrait;

async fn ledger_with_user() -> (Ledger, users::Model) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::new(db);
    let user = ledger
        .register_user(users::NewUser {
            email: "alice@example.com".to_string(),
            password: "hashed-password".to_string(),
            name: "Alice".to_string(),
            currency: "IDR".to_string(),
        })
        .await
        .unwrap();
    (ledger, user)
}

async fn cash_account(ledger: &Ledger, user_id: i32, name: &str, balance: Decimal) -> i32 {
    ledger
        .create_account(
            user_id,
            accounts::AccountInput {
                name: name.to_string(),
                kind: accounts::AccountKind::Cash,
                balance,
                stock_symbol: None,
                quantity: None,
                image_url: None,
                goal_id: None,
            },
        )
        .await
        .unwrap()
        .id
}

async fn expense_category(ledger: &Ledger, user_id: i32) -> i32 {
    let categories = ledger.categories(user_id).await.unwrap();
    categories
        .iter()
        .find(|c| c.kind == "EXPENSE")
        .map(|c| c.id)
        .unwrap()
}

async fn planned(ledger: &Ledger, user_id: i32, account_id: Option<i32>) -> planned_expenses::Model {
    let category = expense_category(ledger, user_id).await;
    ledger
        .create_planned_expense(
            user_id,
            planned_expenses::NewPlannedExpense {
                amount: dec!(50_000),
                date: Utc::now(),
                description: Some("Concert tickets".to_string()),
                category_id: category,
                account_id,
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn absent_fields_leave_stored_values() {
    let (ledger, user) = ledger_with_user().await;
    let account = cash_account(&ledger, user.id, "Bank", dec!(100_000)).await;
    let row = planned(&ledger, user.id, Some(account)).await;

    let updated = ledger
        .update_planned_expense(
            user.id,
            row.id,
            planned_expenses::PlannedExpenseUpdate {
                amount: Some(dec!(60_000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Only the amount moved; the link and description survive the patch.
    assert_eq!(updated.amount, dec!(60_000));
    assert_eq!(updated.account_id, Some(account));
    assert_eq!(updated.description.as_deref(), Some("Concert tickets"));
}

#[tokio::test]
async fn explicit_null_detaches_account() {
    let (ledger, user) = ledger_with_user().await;
    let account = cash_account(&ledger, user.id, "Bank", dec!(100_000)).await;
    let row = planned(&ledger, user.id, Some(account)).await;

    let updated = ledger
        .update_planned_expense(
            user.id,
            row.id,
            planned_expenses::PlannedExpenseUpdate {
                account_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.account_id, None);
    assert_eq!(updated.amount, row.amount);
}

#[tokio::test]
async fn relinking_checks_ownership() {
    let (ledger, user) = ledger_with_user().await;
    let row = planned(&ledger, user.id, None).await;

    let err = ledger
        .update_planned_expense(
            user.id,
            row.id,
            planned_expenses::PlannedExpenseUpdate {
                account_id: Some(Some(9999)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidReference(_)));
}

#[tokio::test]
async fn execute_flips_status_once() {
    let (ledger, user) = ledger_with_user().await;
    let account = cash_account(&ledger, user.id, "Bank", dec!(100_000)).await;
    let row = planned(&ledger, user.id, Some(account)).await;
    assert_eq!(row.status, "PLANNED");

    let executed = ledger
        .execute_planned_expense(user.id, row.id)
        .await
        .unwrap();
    assert_eq!(executed.status, "EXECUTED");

    // Execution is a pure status flip; balances never move.
    let balance = ledger.account(user.id, account).await.unwrap().balance;
    assert_eq!(balance, dec!(100_000));

    let err = ledger
        .execute_planned_expense(user.id, row.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InvalidOperation("Planned expense already executed".to_string())
    );
}

#[tokio::test]
async fn list_filters_by_status() {
    let (ledger, user) = ledger_with_user().await;
    let first = planned(&ledger, user.id, None).await;
    let _second = planned(&ledger, user.id, None).await;
    ledger
        .execute_planned_expense(user.id, first.id)
        .await
        .unwrap();

    let pending = ledger
        .planned_expenses(user.id, None, None, Some(planned_expenses::PlannedStatus::Planned))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_ne!(pending[0].id, first.id);
}
