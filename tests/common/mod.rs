#![allow(dead_code)]

use bandtrader::domain::error::BandtraderError;
pub use bandtrader::domain::series::{PriceBar, PriceSeries};
use bandtrader::domain::strategy::StrategyParameters;
use bandtrader::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<(String, i32), Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, ticker: &str, year: i32, bars: Vec<PriceBar>) -> Self {
        self.data.insert((ticker.to_string(), year), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load(&self, ticker: &str, year: i32) -> Result<PriceSeries, BandtraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(BandtraderError::DataFormat {
                file: format!("{ticker}.csv"),
                reason: reason.clone(),
            });
        }
        match self.data.get(&(ticker.to_string(), year)) {
            Some(bars) => Ok(PriceSeries {
                ticker: ticker.to_string(),
                year,
                bars: bars.clone(),
            }),
            None => Err(BandtraderError::DataNotFound {
                ticker: ticker.to_string(),
                year,
            }),
        }
    }

    fn list_tickers(&self) -> Result<Vec<String>, BandtraderError> {
        let mut tickers: Vec<String> = self.data.keys().map(|(ticker, _)| ticker.clone()).collect();
        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64, volume: i64) -> PriceBar {
    PriceBar {
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume,
    }
}

/// Closes [100, 101, 102, 70, 95] on Jan 1-5: with window 3 and pct 0.1
/// the dip enters at 70 and the recovery exits at 95.
pub fn dip_bars(year: i32) -> Vec<PriceBar> {
    [100.0, 101.0, 102.0, 70.0, 95.0]
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(date(year, 1, (i + 1) as u32), close, 500_000))
        .collect()
}

/// Strictly rising closes on consecutive days from Jan 1.
pub fn rising_bars(year: i32, count: usize) -> Vec<PriceBar> {
    (0..count)
        .map(|i| {
            make_bar(
                date(year, 1, 1) + chrono::Duration::days(i as i64),
                100.0 + i as f64,
                500_000,
            )
        })
        .collect()
}

pub fn dip_params() -> StrategyParameters {
    StrategyParameters::new(50, 0.1, 3)
}
