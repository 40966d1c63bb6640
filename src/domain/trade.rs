//! Simulated trades and their derived outcomes.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    Win,
    Loss,
    Breakeven,
}

/// One round trip produced by the simulator.
///
/// `forced` marks a position closed at the final bar of the series because
/// no exit condition fired. Forced trades are reported by the simulator but
/// never executed against capital.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    /// Fractional shortfall of the entry close under the lower band.
    pub below_band: f64,
    pub days_held: i64,
    pub forced: bool,
}

impl Trade {
    pub fn outcome(&self) -> TradeOutcome {
        if self.exit_price > self.entry_price {
            TradeOutcome::Win
        } else if self.exit_price < self.entry_price {
            TradeOutcome::Loss
        } else {
            TradeOutcome::Breakeven
        }
    }

    /// Per-trade return as a fraction: 0.05 is a 5% gain.
    pub fn return_fraction(&self) -> f64 {
        (self.exit_price - self.entry_price) / self.entry_price
    }

    pub fn return_pct(&self) -> f64 {
        self.return_fraction() * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade(entry_price: f64, exit_price: f64) -> Trade {
        Trade {
            ticker: "AAPL".into(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            entry_price,
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 22).unwrap(),
            exit_price,
            below_band: 0.03,
            days_held: 7,
            forced: false,
        }
    }

    #[test]
    fn outcome_win() {
        assert_eq!(sample_trade(100.0, 105.0).outcome(), TradeOutcome::Win);
    }

    #[test]
    fn outcome_loss() {
        assert_eq!(sample_trade(100.0, 95.0).outcome(), TradeOutcome::Loss);
    }

    #[test]
    fn outcome_breakeven() {
        assert_eq!(
            sample_trade(100.0, 100.0).outcome(),
            TradeOutcome::Breakeven
        );
    }

    #[test]
    fn return_fraction_gain() {
        let trade = sample_trade(100.0, 105.0);
        assert!((trade.return_fraction() - 0.05).abs() < f64::EPSILON);
        assert!((trade.return_pct() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn return_fraction_loss() {
        let trade = sample_trade(200.0, 150.0);
        assert!((trade.return_fraction() - (-0.25)).abs() < f64::EPSILON);
    }
}
