use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::Database;

use engine::{Ledger, LedgerError, accounts, debts, goals, transactions, users};
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

async fn income_category(ledger: &Ledger, user_id: i32) -> i32 {
    let categories = ledger.categories(user_id).await.unwrap();
    categories
        .iter()
        .find(|c| c.kind == "INCOME")
        .map(|c| c.id)
        .unwrap()
}

fn new_tx(
    kind: transactions::TransactionKind,
    amount: Decimal,
    category_id: i32,
) -> transactions::NewTransaction {
    transactions::NewTransaction {
        amount,
        date: Utc::now(),
        description: None,
        kind,
        category_id,
        account_id: None,
        target_account_id: None,
        goal_id: None,
        debt_id: None,
    }
}

#[tokio::test]
async fn register_seeds_wallet_and_categories() {
    let (ledger, user) = ledger_with_user().await;

    let accounts = ledger.accounts(user.id).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Wallet");
    assert_eq!(accounts[0].kind, "CASH");
    assert_eq!(accounts[0].balance, Decimal::ZERO);

    let categories = ledger.categories(user.id).await.unwrap();
    assert_eq!(categories.len(), 5);
    assert!(categories.iter().any(|c| c.name == "Salary" && c.kind == "INCOME"));
}

#[tokio::test]
async fn duplicate_email_is_refused() {
    let (ledger, _user) = ledger_with_user().await;
    let err = ledger
        .register_user(users::NewUser {
            email: "alice@example.com".to_string(),
            password: "other".to_string(),
            name: "Alice Again".to_string(),
            currency: "USD".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidOperation(_)));
}

#[tokio::test]
async fn transfer_round_trip_restores_balances() {
    let (ledger, user) = ledger_with_user().await;
    let source = cash_account(&ledger, user.id, "Bank", dec!(1000)).await;
    let target = cash_account(&ledger, user.id, "Savings", dec!(200)).await;
    let category = expense_category(&ledger, user.id).await;

    let mut tx = new_tx(transactions::TransactionKind::Transfer, dec!(250), category);
    tx.account_id = Some(source);
    tx.target_account_id = Some(target);
    let row = ledger.create_transaction(user.id, tx).await.unwrap();

    assert_eq!(ledger.account(user.id, source).await.unwrap().balance, dec!(750));
    assert_eq!(ledger.account(user.id, target).await.unwrap().balance, dec!(450));

    ledger.delete_transaction(user.id, row.id).await.unwrap();

    assert_eq!(ledger.account(user.id, source).await.unwrap().balance, dec!(1000));
    assert_eq!(ledger.account(user.id, target).await.unwrap().balance, dec!(200));
}

#[tokio::test]
async fn transfer_to_same_account_is_refused() {
    let (ledger, user) = ledger_with_user().await;
    let account = cash_account(&ledger, user.id, "Bank", dec!(1000)).await;
    let category = expense_category(&ledger, user.id).await;

    let mut tx = new_tx(transactions::TransactionKind::Transfer, dec!(100), category);
    tx.account_id = Some(account);
    tx.target_account_id = Some(account);
    let err = ledger.create_transaction(user.id, tx).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidOperation(_)));

    // Nothing moved.
    assert_eq!(ledger.account(user.id, account).await.unwrap().balance, dec!(1000));
}

#[tokio::test]
async fn transfer_requires_both_accounts() {
    let (ledger, user) = ledger_with_user().await;
    let account = cash_account(&ledger, user.id, "Bank", dec!(1000)).await;
    let category = expense_category(&ledger, user.id).await;

    let mut tx = new_tx(transactions::TransactionKind::Transfer, dec!(100), category);
    tx.account_id = Some(account);
    let err = ledger.create_transaction(user.id, tx).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidOperation(_)));
}

#[tokio::test]
async fn nonpositive_amount_is_rejected() {
    let (ledger, user) = ledger_with_user().await;
    let category = expense_category(&ledger, user.id).await;

    for amount in [Decimal::ZERO, dec!(-5)] {
        let tx = new_tx(transactions::TransactionKind::Expense, amount, category);
        let err = ledger.create_transaction(user.id, tx).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let (ledger, user) = ledger_with_user().await;
    let tx = new_tx(transactions::TransactionKind::Expense, dec!(10), 9999);
    let err = ledger.create_transaction(user.id, tx).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidReference(_)));
}

#[tokio::test]
async fn income_delete_reverses_by_stored_amount() {
    let (ledger, user) = ledger_with_user().await;
    let account = cash_account(&ledger, user.id, "Bank", dec!(100)).await;
    let category = income_category(&ledger, user.id).await;

    let mut tx = new_tx(transactions::TransactionKind::Income, dec!(1000), category);
    tx.account_id = Some(account);
    let row = ledger.create_transaction(user.id, tx).await.unwrap();
    assert_eq!(ledger.account(user.id, account).await.unwrap().balance, dec!(1100));

    // Independently move the balance; the delete must still subtract
    // exactly the transaction's own amount.
    let current = ledger.account(user.id, account).await.unwrap();
    ledger
        .update_account(
            user.id,
            account,
            accounts::AccountInput {
                name: current.name,
                kind: accounts::AccountKind::Cash,
                balance: dec!(5000),
                stock_symbol: None,
                quantity: None,
                image_url: None,
                goal_id: None,
            },
        )
        .await
        .unwrap();

    ledger.delete_transaction(user.id, row.id).await.unwrap();
    assert_eq!(ledger.account(user.id, account).await.unwrap().balance, dec!(4000));
}

#[tokio::test]
async fn goal_progress_moves_with_transactions() {
    let (ledger, user) = ledger_with_user().await;
    let category = income_category(&ledger, user.id).await;
    let goal = ledger
        .create_goal(
            user.id,
            goals::GoalInput {
                name: "Laptop".to_string(),
                target_amount: dec!(15_000_000),
                current_amount: Decimal::ZERO,
                image_url: None,
                deadline: None,
                status: goals::GoalStatus::InProgress,
                account_id: None,
            },
        )
        .await
        .unwrap();

    let mut tx = new_tx(transactions::TransactionKind::Income, dec!(500_000), category);
    tx.goal_id = Some(goal.goal.id);
    let row = ledger.create_transaction(user.id, tx).await.unwrap();
    assert_eq!(
        ledger.goal(user.id, goal.goal.id).await.unwrap().current_amount,
        dec!(500_000)
    );

    ledger.delete_transaction(user.id, row.id).await.unwrap();
    assert_eq!(
        ledger.goal(user.id, goal.goal.id).await.unwrap().current_amount,
        Decimal::ZERO
    );
}

#[tokio::test]
async fn linking_an_account_snapshots_its_balance() {
    let (ledger, user) = ledger_with_user().await;
    let account = cash_account(&ledger, user.id, "Savings", dec!(2_000_000)).await;

    let input = goals::GoalInput {
        name: "House".to_string(),
        target_amount: dec!(500_000_000),
        current_amount: Decimal::ZERO,
        image_url: None,
        deadline: None,
        status: goals::GoalStatus::InProgress,
        account_id: Some(account),
    };
    let goal = ledger.create_goal(user.id, input.clone()).await.unwrap();
    // The stored progress starts at the linked account's balance, not
    // at the caller-supplied amount.
    assert_eq!(goal.goal.current_amount, dec!(2_000_000));

    // Re-linking through an update snapshots again.
    let richer = cash_account(&ledger, user.id, "Bonds", dec!(7_500_000)).await;
    let updated = ledger
        .update_goal(
            user.id,
            goal.goal.id,
            goals::GoalInput {
                account_id: Some(richer),
                ..input
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.goal.current_amount, dec!(7_500_000));
    assert_eq!(updated.effective_current_amount, dec!(7_500_000));
}

#[tokio::test]
async fn installment_debt_pays_off_and_reverts() {
    let (ledger, user) = ledger_with_user().await;
    let category = expense_category(&ledger, user.id).await;
    let debt = ledger
        .create_debt(
            user.id,
            debts::DebtInput {
                person_name: "Budi".to_string(),
                amount: dec!(3_000_000),
                kind: debts::DebtKind::Payable,
                status: debts::DebtStatus::Unpaid,
                due_date: None,
                description: None,
                total_installments: Some(3),
                current_installment: Some(0),
            },
        )
        .await
        .unwrap();

    let mut last = None;
    for _ in 0..3 {
        let mut tx = new_tx(transactions::TransactionKind::Expense, dec!(1_000_000), category);
        tx.debt_id = Some(debt.id);
        last = Some(ledger.create_transaction(user.id, tx).await.unwrap());
    }

    let paid = ledger.debt(user.id, debt.id).await.unwrap();
    assert_eq!(paid.current_installment, Some(3));
    assert_eq!(paid.status, "PAID");

    // Deleting the final installment reopens the debt.
    let last = last.unwrap();
    ledger.delete_transaction(user.id, last.id).await.unwrap();

    let reopened = ledger.debt(user.id, debt.id).await.unwrap();
    assert_eq!(reopened.current_installment, Some(2));
    assert_eq!(reopened.status, "UNPAID");
}

#[tokio::test]
async fn referenced_account_cannot_be_deleted() {
    let (ledger, user) = ledger_with_user().await;
    let account = cash_account(&ledger, user.id, "Bank", dec!(100)).await;
    let category = expense_category(&ledger, user.id).await;

    let mut tx = new_tx(transactions::TransactionKind::Expense, dec!(10), category);
    tx.account_id = Some(account);
    let row = ledger.create_transaction(user.id, tx).await.unwrap();

    let err = ledger.delete_account(user.id, account).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidOperation(_)));

    ledger.delete_transaction(user.id, row.id).await.unwrap();
    ledger.delete_account(user.id, account).await.unwrap();
}

#[tokio::test]
async fn transactions_are_scoped_per_user() {
    let (ledger, alice) = ledger_with_user().await;
    let bob = ledger
        .register_user(users::NewUser {
            email: "bob@example.com".to_string(),
            password: "hashed".to_string(),
            name: "Bob".to_string(),
            currency: "IDR".to_string(),
        })
        .await
        .unwrap();

    let category = expense_category(&ledger, alice.id).await;
    let tx = new_tx(transactions::TransactionKind::Expense, dec!(10), category);
    let row = ledger.create_transaction(alice.id, tx).await.unwrap();

    let err = ledger.delete_transaction(bob.id, row.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn list_filters_by_kind() {
    let (ledger, user) = ledger_with_user().await;
    let income_cat = income_category(&ledger, user.id).await;
    let expense_cat = expense_category(&ledger, user.id).await;

    ledger
        .create_transaction(
            user.id,
            new_tx(transactions::TransactionKind::Income, dec!(100), income_cat),
        )
        .await
        .unwrap();
    ledger
        .create_transaction(
            user.id,
            new_tx(transactions::TransactionKind::Expense, dec!(40), expense_cat),
        )
        .await
        .unwrap();

    let expenses = ledger
        .transactions(
            user.id,
            transactions::TransactionFilter {
                kind: Some(transactions::TransactionKind::Expense),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, dec!(40));
}
