//! The ledger mutation engine.
//!
//! Creating a transaction applies side effects to the entities it
//! references: account balances move, a linked goal's stored progress
//! moves, an installment debt's counter advances. Deleting a transaction
//! must apply the exact inverse of every one of those effects, computed
//! from the row's *own* stored amount and kind at the time it is read
//! back, never from current external state. Balances are maintained
//! incrementally, so delete-time reversal is the hardest correctness
//! requirement in the crate.
//!
//! Every create and delete runs inside one scoped database transaction.
//! The original behavior only guaranteed atomicity for transfers; the
//! single scope closes the partial-application gap for the other paths
//! without changing observable success-path behavior.

use rust_decimal::Decimal;
use sea_orm::entity::{ActiveValue, prelude::*};
use sea_orm::{ConnectionTrait, QueryOrder, TransactionTrait};

use crate::{
    Ledger, LedgerError, ResultLedger, accounts, categories, debts, goals, transactions,
    transactions::{NewTransaction, TransactionFilter, TransactionKind},
};

impl Ledger {
    /// Create a transaction and apply its side effects.
    pub async fn create_transaction(
        &self,
        user_id: i32,
        new: NewTransaction,
    ) -> ResultLedger<transactions::Model> {
        if new.amount <= Decimal::ZERO {
            return Err(LedgerError::Validation("amount must be > 0".to_string()));
        }

        let txn = self.db().begin().await?;

        let category = categories::Entity::find_by_id(new.category_id)
            .filter(categories::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;
        if category.is_none() {
            return Err(LedgerError::InvalidReference("category".to_string()));
        }

        let model = match new.kind {
            TransactionKind::Transfer => self.create_transfer(&txn, user_id, &new).await?,
            TransactionKind::Income | TransactionKind::Expense => {
                self.create_income_expense(&txn, user_id, &new).await?
            }
        };

        txn.commit().await?;
        Ok(model)
    }

    async fn create_transfer(
        &self,
        txn: &impl ConnectionTrait,
        user_id: i32,
        new: &NewTransaction,
    ) -> ResultLedger<transactions::Model> {
        let (Some(source_id), Some(target_id)) = (new.account_id, new.target_account_id) else {
            return Err(LedgerError::InvalidOperation(
                "Source and target accounts are required for transfer".to_string(),
            ));
        };
        if source_id == target_id {
            return Err(LedgerError::InvalidOperation(
                "Cannot transfer to the same account".to_string(),
            ));
        }

        let source = owned_account(txn, user_id, source_id).await?;
        let target = owned_account(txn, user_id, target_id).await?;

        apply_balance_delta(txn, source, -new.amount).await?;
        apply_balance_delta(txn, target, new.amount).await?;

        insert_row(txn, user_id, new).await
    }

    async fn create_income_expense(
        &self,
        txn: &impl ConnectionTrait,
        user_id: i32,
        new: &NewTransaction,
    ) -> ResultLedger<transactions::Model> {
        let signed = match new.kind {
            TransactionKind::Income => new.amount,
            _ => -new.amount,
        };

        if let Some(account_id) = new.account_id {
            let account = owned_account(txn, user_id, account_id).await?;
            apply_balance_delta(txn, account, signed).await?;
        }

        if let Some(goal_id) = new.goal_id {
            let goal = goals::Entity::find_by_id(goal_id)
                .filter(goals::Column::UserId.eq(user_id))
                .one(txn)
                .await?
                .ok_or_else(|| LedgerError::InvalidReference("goal".to_string()))?;
            apply_goal_delta(txn, goal, signed).await?;
        }

        if let Some(debt_id) = new.debt_id {
            let debt = debts::Entity::find_by_id(debt_id)
                .filter(debts::Column::UserId.eq(user_id))
                .one(txn)
                .await?
                .ok_or_else(|| LedgerError::InvalidReference("debt".to_string()))?;
            advance_installment(txn, debt).await?;
        }

        insert_row(txn, user_id, new).await
    }

    /// Delete a transaction, reversing every side effect its creation
    /// applied.
    pub async fn delete_transaction(&self, user_id: i32, id: i32) -> ResultLedger<()> {
        let txn = self.db().begin().await?;

        let row = transactions::Entity::find_by_id(id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound("transaction".to_string()))?;

        let kind = TransactionKind::try_from(row.kind.as_str())?;

        if kind == TransactionKind::Transfer {
            if let (Some(source_id), Some(target_id)) = (row.account_id, row.target_account_id) {
                let source = fetch_account(&txn, source_id).await?;
                let target = fetch_account(&txn, target_id).await?;
                apply_balance_delta(&txn, source, row.amount).await?;
                apply_balance_delta(&txn, target, -row.amount).await?;
                row.delete(&txn).await?;
                txn.commit().await?;
                return Ok(());
            }
        }

        // Reversal sign derived from the row itself, not from current
        // account state.
        let reverse = match kind {
            TransactionKind::Income => -row.amount,
            _ => row.amount,
        };

        if let Some(account_id) = row.account_id {
            let account = fetch_account(&txn, account_id).await?;
            apply_balance_delta(&txn, account, reverse).await?;
        }

        if let Some(goal_id) = row.goal_id {
            if let Some(goal) = goals::Entity::find_by_id(goal_id).one(&txn).await? {
                apply_goal_delta(&txn, goal, reverse).await?;
            }
        }

        if let Some(debt_id) = row.debt_id {
            if let Some(debt) = debts::Entity::find_by_id(debt_id).one(&txn).await? {
                rewind_installment(&txn, debt).await?;
            }
        }

        row.delete(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    /// List the caller's transactions, newest first.
    pub async fn transactions(
        &self,
        user_id: i32,
        filter: TransactionFilter,
    ) -> ResultLedger<Vec<transactions::Model>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date);

        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            query = query
                .filter(transactions::Column::Date.gte(start))
                .filter(transactions::Column::Date.lte(end));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id));
        }

        let rows = query.all(self.db()).await?;
        Ok(rows)
    }

    /// Return one of the caller's transactions.
    pub async fn transaction(&self, user_id: i32, id: i32) -> ResultLedger<transactions::Model> {
        transactions::Entity::find_by_id(id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(self.db())
            .await?
            .ok_or_else(|| LedgerError::NotFound("transaction".to_string()))
    }
}

async fn insert_row(
    conn: &impl ConnectionTrait,
    user_id: i32,
    new: &NewTransaction,
) -> ResultLedger<transactions::Model> {
    let now = chrono::Utc::now();
    let row = transactions::ActiveModel {
        amount: ActiveValue::Set(new.amount),
        date: ActiveValue::Set(new.date),
        description: ActiveValue::Set(new.description.clone()),
        kind: ActiveValue::Set(new.kind.as_str().to_string()),
        category_id: ActiveValue::Set(new.category_id),
        account_id: ActiveValue::Set(new.account_id),
        target_account_id: ActiveValue::Set(new.target_account_id),
        goal_id: ActiveValue::Set(new.goal_id),
        debt_id: ActiveValue::Set(new.debt_id),
        user_id: ActiveValue::Set(user_id),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
        ..Default::default()
    };
    let model = row.insert(conn).await?;
    Ok(model)
}

async fn owned_account(
    conn: &impl ConnectionTrait,
    user_id: i32,
    id: i32,
) -> ResultLedger<accounts::Model> {
    accounts::Entity::find_by_id(id)
        .filter(accounts::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::InvalidReference("account".to_string()))
}

async fn fetch_account(conn: &impl ConnectionTrait, id: i32) -> ResultLedger<accounts::Model> {
    accounts::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::InvalidReference("account".to_string()))
}

async fn apply_balance_delta(
    conn: &impl ConnectionTrait,
    account: accounts::Model,
    delta: Decimal,
) -> ResultLedger<()> {
    let new_balance = account.balance + delta;
    let mut account: accounts::ActiveModel = account.into();
    account.balance = ActiveValue::Set(new_balance);
    account.update(conn).await?;
    Ok(())
}

async fn apply_goal_delta(
    conn: &impl ConnectionTrait,
    goal: goals::Model,
    delta: Decimal,
) -> ResultLedger<()> {
    let new_amount = goal.current_amount + delta;
    let mut goal: goals::ActiveModel = goal.into();
    goal.current_amount = ActiveValue::Set(new_amount);
    goal.update(conn).await?;
    Ok(())
}

/// Advance an installment debt by one payment, flipping to PAID on the
/// last one. Debts without installments are left untouched.
async fn advance_installment(
    conn: &impl ConnectionTrait,
    debt: debts::Model,
) -> ResultLedger<()> {
    if !debt.is_installment() {
        return Ok(());
    }
    let total = debt.total_installments.unwrap_or(0);
    let new_current = debt.current_installment.unwrap_or(0) + 1;

    let mut debt: debts::ActiveModel = debt.into();
    debt.current_installment = ActiveValue::Set(Some(new_current));
    if new_current >= total {
        debt.status = ActiveValue::Set(debts::DebtStatus::Paid.as_str().to_string());
    }
    debt.update(conn).await?;
    Ok(())
}

/// Rewind an installment debt by one payment.
///
/// The status reverts to UNPAID only when the decremented counter falls
/// below the total; a debt whose installments are still complete keeps its
/// status.
async fn rewind_installment(conn: &impl ConnectionTrait, debt: debts::Model) -> ResultLedger<()> {
    if !debt.is_installment() {
        return Ok(());
    }
    let total = debt.total_installments.unwrap_or(0);
    let new_current = (debt.current_installment.unwrap_or(1) - 1).max(0);

    let mut debt: debts::ActiveModel = debt.into();
    debt.current_installment = ActiveValue::Set(Some(new_current));
    if new_current < total {
        debt.status = ActiveValue::Set(debts::DebtStatus::Unpaid.as_str().to_string());
    }
    debt.update(conn).await?;
    Ok(())
}
