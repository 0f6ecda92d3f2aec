use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::Database;

use engine::{Ledger, WealthLevel, accounts, debts, transactions, users};
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

#[tokio::test]
async fn net_worth_subtracts_unpaid_payables() {
    let (ledger, user) = ledger_with_user().await;
    ledger
        .create_account(
            user.id,
            accounts::AccountInput {
                name: "Bank".to_string(),
                kind: accounts::AccountKind::Bank,
                balance: dec!(100_000),
                stock_symbol: None,
                quantity: None,
                image_url: None,
                goal_id: None,
            },
        )
        .await
        .unwrap();
    ledger
        .create_debt(
            user.id,
            debts::DebtInput {
                person_name: "Budi".to_string(),
                amount: dec!(30_000),
                kind: debts::DebtKind::Payable,
                status: debts::DebtStatus::Unpaid,
                due_date: None,
                description: None,
                total_installments: None,
                current_installment: None,
            },
        )
        .await
        .unwrap();

    let stats = ledger.dashboard(user.id).await.unwrap();
    assert_eq!(stats.net_worth, dec!(70_000));
    assert_eq!(stats.total_cash, dec!(100_000));
    assert_eq!(stats.payables, dec!(30_000));
    assert_eq!(stats.receivables, Decimal::ZERO);
    assert_eq!(stats.wealth_level, WealthLevel::Bertahan);
    // 50 base, +10 net worth, +15 cash over payables.
    assert_eq!(stats.health_score, 75);
}

#[tokio::test]
async fn paid_debts_do_not_count() {
    let (ledger, user) = ledger_with_user().await;
    ledger
        .create_debt(
            user.id,
            debts::DebtInput {
                person_name: "Sari".to_string(),
                amount: dec!(999_999),
                kind: debts::DebtKind::Payable,
                status: debts::DebtStatus::Paid,
                due_date: None,
                description: None,
                total_installments: None,
                current_installment: None,
            },
        )
        .await
        .unwrap();

    let stats = ledger.dashboard(user.id).await.unwrap();
    assert_eq!(stats.payables, Decimal::ZERO);
    assert_eq!(stats.net_worth, Decimal::ZERO);
    assert_eq!(stats.wealth_level, WealthLevel::Bertahan);
}

#[tokio::test]
async fn charts_and_trend_reflect_activity() {
    let (ledger, user) = ledger_with_user().await;
    let account = ledger
        .create_account(
            user.id,
            accounts::AccountInput {
                name: "Bank".to_string(),
                kind: accounts::AccountKind::Bank,
                balance: dec!(500_000),
                stock_symbol: None,
                quantity: None,
                image_url: None,
                goal_id: None,
            },
        )
        .await
        .unwrap();

    let categories = ledger.categories(user.id).await.unwrap();
    let food = categories.iter().find(|c| c.name == "Food").unwrap().id;
    ledger
        .create_transaction(
            user.id,
            transactions::NewTransaction {
                amount: dec!(75_000),
                date: Utc::now(),
                description: None,
                kind: transactions::TransactionKind::Expense,
                category_id: food,
                account_id: Some(account.id),
                target_account_id: None,
                goal_id: None,
                debt_id: None,
            },
        )
        .await
        .unwrap();

    let stats = ledger.dashboard(user.id).await.unwrap();

    let food_slice = stats
        .expense_chart_data
        .iter()
        .find(|p| p.name == "Food")
        .unwrap();
    assert_eq!(food_slice.value, dec!(75_000));

    // Zero-balance Wallet is excluded from the account chart.
    assert_eq!(stats.account_chart_data.len(), 1);
    assert_eq!(stats.account_chart_data[0].name, "Bank");

    assert_eq!(stats.recent_transactions.len(), 1);
    assert!(stats.recent_transactions[0].category.is_some());

    // The trend's final point is today's actual total.
    let last = stats.total_cash_history.last().unwrap();
    assert_eq!(last.date, Utc::now().date_naive());
    assert_eq!(last.total_cash, stats.total_cash);
}
