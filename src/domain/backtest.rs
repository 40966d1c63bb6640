//! Backtest drivers: one year across the universe, or a whole horizon.

use crate::domain::error::BandtraderError;
use crate::domain::execution;
use crate::domain::metrics::{self, BacktestResult};
use crate::domain::signal;
use crate::domain::strategy::StrategyParameters;
use crate::domain::trade::Trade;
use crate::domain::universe::PriceCache;

/// One year's executed trades and their summary.
#[derive(Debug, Clone)]
pub struct YearOutcome {
    pub year: i32,
    pub executed: Vec<Trade>,
    pub result: BacktestResult,
}

/// A full horizon run. `years` is chronological; the summary layer decides
/// presentation order. `aggregate` covers every executed trade of the
/// horizon and is labeled with the final year. Capital resets to the
/// configured amount each year, so `compound_factor` is the product of the
/// yearly growth factors.
#[derive(Debug, Clone)]
pub struct MultiYearRun {
    pub years: Vec<YearOutcome>,
    pub aggregate: BacktestResult,
    pub compound_factor: f64,
}

/// Simulate every ticker for one year and execute the merged candidates.
///
/// Strict: a missing (ticker, year) pair or a series shorter than the
/// window is an error, not a skip.
pub fn run_year(
    cache: &PriceCache,
    tickers: &[String],
    year: i32,
    params: &StrategyParameters,
    initial_capital: f64,
) -> Result<YearOutcome, BandtraderError> {
    params.validate()?;

    let mut candidates = Vec::new();
    for ticker in tickers {
        let series = cache.get(ticker, year)?;
        candidates.extend(signal::simulate(series, params)?);
    }

    let outcome = execution::execute_year(candidates, initial_capital);
    let result = metrics::aggregate(year, &outcome.executed);
    Ok(YearOutcome {
        year,
        executed: outcome.executed,
        result,
    })
}

/// Run every year of the horizon, skipping pairs without usable data.
///
/// Missing pairs and too-short series are warned about and left out, the
/// way a long multi-ticker sweep expects; anything else still aborts.
pub fn run_years(
    cache: &PriceCache,
    tickers: &[String],
    years: &[i32],
    params: &StrategyParameters,
    initial_capital: f64,
) -> Result<MultiYearRun, BandtraderError> {
    params.validate()?;

    let mut outcomes = Vec::new();
    let mut all_executed: Vec<Trade> = Vec::new();
    let mut compound_factor = 1.0;

    for &year in years {
        let mut candidates = Vec::new();
        for ticker in tickers {
            let series = match cache.get(ticker, year) {
                Ok(series) => series,
                Err(e) => {
                    eprintln!("Warning: skipping {} {} ({})", ticker, year, e);
                    continue;
                }
            };
            match signal::simulate(series, params) {
                Ok(trades) => candidates.extend(trades),
                Err(e @ BandtraderError::InsufficientData { .. }) => {
                    eprintln!("Warning: skipping {} {} ({})", ticker, year, e);
                }
                Err(e) => return Err(e),
            }
        }

        let outcome = execution::execute_year(candidates, initial_capital);
        let result = metrics::aggregate(year, &outcome.executed);
        compound_factor *= result.growth_factor();
        all_executed.extend(outcome.executed.iter().cloned());
        outcomes.push(YearOutcome {
            year,
            executed: outcome.executed,
            result,
        });
    }

    let final_year = years.last().copied().unwrap_or_default();
    let aggregate = metrics::aggregate(final_year, &all_executed);

    Ok(MultiYearRun {
        years: outcomes,
        aggregate,
        compound_factor,
    })
}
