//! Daily price bars and the per-ticker, per-year series they form.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// One ticker's bars for one calendar year, strictly increasing by date.
/// Read-only once loaded; everything downstream borrows it.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub ticker: String,
    pub year: i32,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
