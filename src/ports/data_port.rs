//! Price data access port trait.

use crate::domain::error::BandtraderError;
use crate::domain::series::PriceSeries;

pub trait DataPort {
    /// One ticker's bars for one calendar year, in chronological order.
    fn load(&self, ticker: &str, year: i32) -> Result<PriceSeries, BandtraderError>;

    /// Every ticker the data source offers, sorted.
    fn list_tickers(&self) -> Result<Vec<String>, BandtraderError>;
}
