//! Report output port trait.

use crate::domain::backtest::MultiYearRun;
use crate::domain::error::BandtraderError;
use crate::domain::strategy::StrategyParameters;
use crate::domain::trade::Trade;

/// Port for persisting backtest results.
pub trait ReportPort {
    fn write_summary(
        &self,
        params: &StrategyParameters,
        run: &MultiYearRun,
    ) -> Result<(), BandtraderError>;

    fn write_year_trades(&self, year: i32, trades: &[Trade]) -> Result<(), BandtraderError>;

    /// Default implementation: the summary plus one trade file per year.
    fn write_all(
        &self,
        params: &StrategyParameters,
        run: &MultiYearRun,
    ) -> Result<(), BandtraderError> {
        self.write_summary(params, run)?;
        for year in &run.years {
            self.write_year_trades(year.year, &year.executed)?;
        }
        Ok(())
    }
}
