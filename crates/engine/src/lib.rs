//! Bookkeeping core: entities, the ledger mutation engine, dashboard
//! aggregation and backup snapshots, all behind one [`Ledger`] handle.
//!
//! Every operation takes the authenticated user's id and scopes its
//! queries with it; rows belonging to other users are indistinguishable
//! from rows that do not exist.

use sea_orm::DatabaseConnection;

pub use backup::{Snapshot, SnapshotData, UserProfile};
pub use dashboard::{CashPoint, ChartPoint, DashboardStats, WealthLevel};
pub use error::LedgerError;

pub mod accounts;
pub mod backup;
pub mod budgets;
pub mod categories;
pub mod dashboard;
pub mod debts;
mod error;
pub mod goals;
mod ledger;
pub mod planned_expenses;
pub mod transactions;
pub mod users;

pub type ResultLedger<T> = Result<T, LedgerError>;

/// Handle over the entity store. Cheap to clone; all operations hang off
/// it as `impl Ledger` blocks in the entity modules.
#[derive(Clone, Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.database
    }
}
