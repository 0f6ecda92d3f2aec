//! Read-side dashboard aggregation.
//!
//! Everything here is recomputed from current entity state on every call,
//! nothing is cached. The pure pieces (wealth ladder, health score, cash
//! trend replay) are free functions so they can be tested without a
//! database.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, QuerySelect};
use serde::Serialize;

use crate::{Ledger, ResultLedger, accounts, categories, debts, transactions};

/// The five-tier net-worth ladder. Tier boundaries are in rupiah.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WealthLevel {
    Kekurangan,
    Bertahan,
    Aman,
    Nyaman,
    Sultan,
}

/// Minimum net worth for each tier above the bottom one.
const LADDER: [(WealthLevel, i64); 4] = [
    (WealthLevel::Bertahan, 0),
    (WealthLevel::Aman, 10_000_000),
    (WealthLevel::Nyaman, 100_000_000),
    (WealthLevel::Sultan, 1_000_000_000),
];

/// One slice of a pie chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: Decimal,
}

/// One point of the trailing cash trend.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashPoint {
    pub date: NaiveDate,
    pub total_cash: Decimal,
}

/// A transaction joined to its category for the recent-activity list.
#[derive(Clone, Debug, Serialize)]
pub struct RecentTransaction {
    #[serde(flatten)]
    pub transaction: transactions::Model,
    pub category: Option<categories::Model>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub net_worth: Decimal,
    pub total_cash: Decimal,
    pub receivables: Decimal,
    pub payables: Decimal,
    pub wealth_level: WealthLevel,
    pub health_score: u8,
    pub amount_to_next_level: Option<Decimal>,
    pub next_level: Option<WealthLevel>,
    pub recent_transactions: Vec<RecentTransaction>,
    pub expense_chart_data: Vec<ChartPoint>,
    pub account_chart_data: Vec<ChartPoint>,
    pub total_cash_history: Vec<CashPoint>,
}

/// Classify a net worth on the ladder, returning the tier, the next tier
/// up and the amount still missing to reach it. The top tier has neither.
pub fn wealth_level(net_worth: Decimal) -> (WealthLevel, Option<WealthLevel>, Option<Decimal>) {
    let mut level = WealthLevel::Kekurangan;
    let mut next = Some(WealthLevel::Bertahan);
    let mut next_min = Some(Decimal::ZERO);

    for (i, (tier, min)) in LADDER.iter().enumerate() {
        if net_worth >= Decimal::from(*min) {
            level = *tier;
            match LADDER.get(i + 1) {
                Some((above, above_min)) => {
                    next = Some(*above);
                    next_min = Some(Decimal::from(*above_min));
                }
                None => {
                    next = None;
                    next_min = None;
                }
            }
        }
    }

    let to_next = next_min.map(|min| (min - net_worth).max(Decimal::ZERO));
    (level, next, to_next)
}

/// Heuristic 0..=100 score of the user's financial posture.
pub fn health_score(
    net_worth: Decimal,
    total_cash: Decimal,
    payables: Decimal,
    receivables: Decimal,
) -> u8 {
    let mut score: u8 = 50;
    if net_worth > Decimal::ZERO {
        score += 10;
    }
    if payables == Decimal::ZERO {
        score += 10;
    }
    if receivables > Decimal::ZERO {
        score += 5;
    }
    if total_cash > payables {
        score += 15;
    }
    score.min(100)
}

/// Replay per-day net deltas into a running cash total.
///
/// The window's starting balance is derived by subtracting the whole
/// window's net change from the current total, so the final point always
/// lands back on `total_cash`. If the last bucketed day is not today, the
/// current total is appended as today's point.
pub fn cash_history(
    total_cash: Decimal,
    daily_net: &BTreeMap<NaiveDate, Decimal>,
    today: NaiveDate,
) -> Vec<CashPoint> {
    let total_change: Decimal = daily_net.values().copied().sum();
    let mut running = total_cash - total_change;

    let mut history: Vec<CashPoint> = daily_net
        .iter()
        .map(|(date, net)| {
            running += *net;
            CashPoint {
                date: *date,
                total_cash: running.round_dp(2),
            }
        })
        .collect();

    if history.last().is_none_or(|point| point.date != today) {
        history.push(CashPoint {
            date: today,
            total_cash,
        });
    }
    history
}

impl Ledger {
    /// Assemble the full dashboard for one user.
    pub async fn dashboard(&self, user_id: i32) -> ResultLedger<DashboardStats> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .all(self.db())
            .await?;
        let total_cash: Decimal = accounts.iter().map(|account| account.balance).sum();

        let unpaid = debts::Entity::find()
            .filter(debts::Column::UserId.eq(user_id))
            .filter(debts::Column::Status.eq(debts::DebtStatus::Unpaid.as_str()))
            .all(self.db())
            .await?;
        let payables: Decimal = unpaid
            .iter()
            .filter(|debt| debt.kind == debts::DebtKind::Payable.as_str())
            .map(|debt| debt.amount)
            .sum();
        let receivables: Decimal = unpaid
            .iter()
            .filter(|debt| debt.kind == debts::DebtKind::Receivable.as_str())
            .map(|debt| debt.amount)
            .sum();

        let net_worth = total_cash + receivables - payables;
        let (level, next_level, amount_to_next_level) = wealth_level(net_worth);
        let score = health_score(net_worth, total_cash, payables, receivables);

        let recent_transactions = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .limit(5)
            .find_also_related(categories::Entity)
            .all(self.db())
            .await?
            .into_iter()
            .map(|(transaction, category)| RecentTransaction {
                transaction,
                category,
            })
            .collect();

        let expense_chart_data = self.expense_chart(user_id).await?;

        let account_chart_data = accounts
            .iter()
            .filter(|account| account.balance > Decimal::ZERO)
            .map(|account| ChartPoint {
                name: account.name.clone(),
                value: account.balance,
            })
            .collect();

        let total_cash_history = self.cash_trend(user_id, total_cash).await?;

        Ok(DashboardStats {
            net_worth,
            total_cash,
            receivables,
            payables,
            wealth_level: level,
            health_score: score,
            amount_to_next_level,
            next_level,
            recent_transactions,
            expense_chart_data,
            account_chart_data,
            total_cash_history,
        })
    }

    /// Sum of expenses per category, labelled by category name.
    async fn expense_chart(&self, user_id: i32) -> ResultLedger<Vec<ChartPoint>> {
        let expenses = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Kind.eq(transactions::TransactionKind::Expense.as_str()))
            .find_also_related(categories::Entity)
            .all(self.db())
            .await?;

        let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
        for (transaction, category) in expenses {
            let name = category
                .map(|category| category.name)
                .unwrap_or_else(|| "Unknown".to_string());
            *by_category.entry(name).or_default() += transaction.amount;
        }

        Ok(by_category
            .into_iter()
            .map(|(name, value)| ChartPoint { name, value })
            .collect())
    }

    /// Daily running cash total over the trailing 60 days.
    async fn cash_trend(&self, user_id: i32, total_cash: Decimal) -> ResultLedger<Vec<CashPoint>> {
        let today = Utc::now().date_naive();
        let window_start = (today - chrono::Days::new(60))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();

        let in_window = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Date.gte(window_start))
            .order_by_asc(transactions::Column::Date)
            .all(self.db())
            .await?;

        let mut daily_net: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for row in in_window {
            let day = row.date.date_naive();
            let net = daily_net.entry(day).or_default();
            match row.kind.as_str() {
                "INCOME" => *net += row.amount,
                "EXPENSE" => *net -= row.amount,
                _ => {}
            }
        }

        Ok(cash_history(total_cash, &daily_net, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ladder_boundaries() {
        assert_eq!(wealth_level(dec!(-1)).0, WealthLevel::Kekurangan);
        assert_eq!(wealth_level(Decimal::ZERO).0, WealthLevel::Bertahan);
        assert_eq!(wealth_level(dec!(9_999_999)).0, WealthLevel::Bertahan);
        assert_eq!(wealth_level(dec!(10_000_000)).0, WealthLevel::Aman);
        assert_eq!(wealth_level(dec!(100_000_000)).0, WealthLevel::Nyaman);
        assert_eq!(wealth_level(dec!(1_000_000_000)).0, WealthLevel::Sultan);
    }

    #[test]
    fn ladder_next_level() {
        let (_, next, to_next) = wealth_level(dec!(2_500_000));
        assert_eq!(next, Some(WealthLevel::Aman));
        assert_eq!(to_next, Some(dec!(7_500_000)));

        let (_, next, to_next) = wealth_level(dec!(1_000_000_001));
        assert_eq!(next, None);
        assert_eq!(to_next, None);
    }

    #[test]
    fn score_components() {
        // Broke and in debt, nothing positive.
        assert_eq!(
            health_score(dec!(-5000), Decimal::ZERO, dec!(5000), Decimal::ZERO),
            50
        );
        // Everything healthy: 50 + 10 + 10 + 5 + 15.
        assert_eq!(
            health_score(dec!(1000), dec!(900), Decimal::ZERO, dec!(100)),
            90
        );
        // Cash above payables but underwater overall.
        assert_eq!(
            health_score(dec!(-100), dec!(500), dec!(400), Decimal::ZERO),
            65
        );
    }

    #[test]
    fn score_is_capped() {
        for cash in [dec!(0), dec!(1), dec!(1_000_000)] {
            assert!(health_score(dec!(1), cash, Decimal::ZERO, dec!(1)) <= 100);
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn trend_replays_to_current_total() {
        let mut daily = BTreeMap::new();
        daily.insert(day("2026-08-26"), dec!(1000));
        daily.insert(day("2026-08-27"), dec!(-400));

        let today = day("2026-08-27");
        let history = cash_history(dec!(5000), &daily, today);

        assert_eq!(
            history,
            vec![
                CashPoint {
                    date: day("2026-08-26"),
                    total_cash: dec!(5400),
                },
                CashPoint {
                    date: day("2026-08-27"),
                    total_cash: dec!(5000),
                },
            ]
        );
    }

    #[test]
    fn trend_appends_today_when_quiet() {
        let daily = BTreeMap::new();
        let today = day("2026-08-28");
        let history = cash_history(dec!(750), &daily, today);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, today);
        assert_eq!(history[0].total_cash, dec!(750));
    }
}
