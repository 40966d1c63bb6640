//! Per-year trade statistics.

use crate::domain::trade::{Trade, TradeOutcome};

/// Summary of one year's executed trades.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestResult {
    pub year: i32,
    pub total_trades: usize,
    /// Winning trades as a percentage of all trades, 0 to 100.
    pub win_rate: f64,
    /// Compounded return over all trades, as a percentage.
    pub compounded_return: f64,
}

impl BacktestResult {
    /// Growth multiple: 1.045 for a 4.5% compounded return.
    pub fn growth_factor(&self) -> f64 {
        1.0 + self.compounded_return / 100.0
    }
}

/// Reduce a year's trades to counts, win rate, and compounded return.
///
/// Every trade passed in is counted; callers decide beforehand which trades
/// qualify. An empty slice yields zero trades and a 0.0 win rate.
pub fn aggregate(year: i32, trades: &[Trade]) -> BacktestResult {
    let mut won = 0usize;
    let mut growth = 1.0_f64;

    for trade in trades {
        if trade.outcome() == TradeOutcome::Win {
            won += 1;
        }
        growth *= 1.0 + trade.return_fraction();
    }

    let total_trades = trades.len();
    let win_rate = if total_trades > 0 {
        won as f64 / total_trades as f64 * 100.0
    } else {
        0.0
    };

    BacktestResult {
        year,
        total_trades,
        win_rate,
        compounded_return: (growth - 1.0) * 100.0,
    }
}
