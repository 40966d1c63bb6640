//! Year-level trade execution.
//!
//! Candidate trades from every ticker in the universe are merged into one
//! ordered book, then executed sequentially against a single all-in capital
//! line: a candidate is taken only when the previous trade has already
//! exited, and the whole balance rides each trade. Entering again on the
//! day of an exit is allowed.

use crate::domain::trade::Trade;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Executed trades for one year plus the capital they left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub executed: Vec<Trade>,
    pub final_capital: f64,
}

/// Order candidates by entry date, breaking same-day ties in favor of the
/// higher-returning trade.
pub fn merge_candidates(mut candidates: Vec<Trade>) -> Vec<Trade> {
    candidates.sort_by(|a, b| {
        a.entry_date.cmp(&b.entry_date).then_with(|| {
            b.return_fraction()
                .partial_cmp(&a.return_fraction())
                .unwrap_or(Ordering::Equal)
        })
    });
    candidates
}

/// Walk merged candidates and keep the non-overlapping sequence.
///
/// Forced closes never execute; their exit price is an artifact of the
/// series ending, not a signal.
pub fn select_sequential(candidates: &[Trade]) -> Vec<Trade> {
    let mut executed = Vec::new();
    let mut next_available: Option<NaiveDate> = None;

    for trade in candidates {
        if trade.forced {
            continue;
        }
        if next_available.is_none_or(|free| trade.entry_date >= free) {
            next_available = Some(trade.exit_date);
            executed.push(trade.clone());
        }
    }

    executed
}

/// Ride the full balance through each executed trade in order.
pub fn compound_capital(executed: &[Trade], initial_capital: f64) -> f64 {
    executed.iter().fold(initial_capital, |capital, trade| {
        let shares = capital / trade.entry_price;
        shares * trade.exit_price
    })
}

pub fn execute_year(candidates: Vec<Trade>, initial_capital: f64) -> ExecutionOutcome {
    let merged = merge_candidates(candidates);
    let executed = select_sequential(&merged);
    let final_capital = compound_capital(&executed, initial_capital);
    ExecutionOutcome {
        executed,
        final_capital,
    }
}
