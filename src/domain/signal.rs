//! Dip-buying signal rule and the bar-by-bar simulator.
//!
//! The rule is Bollinger-shaped: a lower band sits `pct` of the full
//! two-sigma distance under the `window`-bar simple moving average, using
//! population standard deviation (divides by N, not N-1). A position opens
//! when the close lands on or under the band with enough volume behind it,
//! and closes when the price recovers above the average or the holding
//! limit of `count` calendar days runs out.
//!
//! Warmup: the first (window - 1) bars carry no band and produce no entries.

use crate::domain::error::BandtraderError;
use crate::domain::series::{PriceBar, PriceSeries};
use crate::domain::strategy::StrategyParameters;
use crate::domain::trade::Trade;
use chrono::NaiveDate;

/// Bars below this daily volume never trigger an entry.
pub const MIN_SIGNAL_VOLUME: i64 = 100_000;

/// Full band depth in standard deviations; `pct` scales it down.
pub const BAND_STD_FACTOR: f64 = 2.0;

struct OpenPosition {
    date: NaiveDate,
    price: f64,
    below_band: f64,
}

/// Run the strategy over one series and return its trades in entry order.
///
/// The final trade is marked `forced` when the series ends with the
/// position still open. Fails with `InsufficientData` when the series is
/// shorter than the lookback window.
pub fn simulate(
    series: &PriceSeries,
    params: &StrategyParameters,
) -> Result<Vec<Trade>, BandtraderError> {
    params.validate()?;

    let bars = &series.bars;
    if bars.len() < params.window {
        return Err(BandtraderError::InsufficientData {
            ticker: series.ticker.clone(),
            year: series.year,
            bars: bars.len(),
            needed: params.window,
        });
    }

    let warmup = params.window - 1;
    let mut trades = Vec::new();
    let mut open: Option<OpenPosition> = None;

    for i in warmup..bars.len() {
        let window = &bars[i + 1 - params.window..=i];
        let bar = &bars[i];

        match &open {
            None => {
                let lower = lower_band(window, params.pct);
                if bar.close <= lower && bar.volume > MIN_SIGNAL_VOLUME {
                    let shortfall = ((lower - bar.close) / bar.close).max(0.0);
                    open = Some(OpenPosition {
                        date: bar.date,
                        price: bar.close,
                        below_band: shortfall,
                    });
                }
            }
            Some(position) => {
                let sma = mean_close(window);
                let days_held = (bar.date - position.date).num_days();
                if bar.close > sma || days_held >= i64::from(params.count) {
                    trades.push(close_out(series, position, bar, days_held, false));
                    open = None;
                }
            }
        }
    }

    if let Some(position) = &open {
        let last = &bars[bars.len() - 1];
        let days_held = (last.date - position.date).num_days();
        trades.push(close_out(series, position, last, days_held, true));
    }

    Ok(trades)
}

/// One-line description of the rule for report headers.
pub fn describe(params: &StrategyParameters) -> String {
    format!(
        "Dip buyer: enter at {:.0}% of the {BAND_STD_FACTOR}-sigma band below the {}-bar average, exit above the average or after {} days",
        params.pct * 100.0,
        params.window,
        params.count
    )
}

fn close_out(
    series: &PriceSeries,
    position: &OpenPosition,
    bar: &PriceBar,
    days_held: i64,
    forced: bool,
) -> Trade {
    Trade {
        ticker: series.ticker.clone(),
        entry_date: position.date,
        entry_price: position.price,
        exit_date: bar.date,
        exit_price: bar.close,
        below_band: position.below_band,
        days_held,
        forced,
    }
}

fn mean_close(window: &[PriceBar]) -> f64 {
    window.iter().map(|b| b.close).sum::<f64>() / window.len() as f64
}

fn lower_band(window: &[PriceBar], pct: f64) -> f64 {
    let sma = mean_close(window);
    let variance = window
        .iter()
        .map(|b| {
            let diff = b.close - sma;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;
    sma - pct * BAND_STD_FACTOR * variance.sqrt()
}
