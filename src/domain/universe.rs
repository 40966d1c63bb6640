//! Ticker universe resolution and price preloading.
//!
//! Parses ticker lists from configuration, falls back to scanning the data
//! source, and loads every (ticker, year) pair up front into a read-only
//! cache that the backtest drivers and the optimizer share.

use crate::domain::error::BandtraderError;
use crate::domain::series::PriceSeries;
use crate::ports::data_port::DataPort;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if seen.contains(&ticker) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        seen.insert(ticker.clone());
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// Configured tickers win; an empty list means every ticker the data
/// source offers.
pub fn resolve_universe(
    data_port: &dyn DataPort,
    configured: &[String],
) -> Result<Vec<String>, BandtraderError> {
    if !configured.is_empty() {
        return Ok(configured.to_vec());
    }

    let scanned = data_port.list_tickers()?;
    if scanned.is_empty() {
        return Err(BandtraderError::ConfigInvalid {
            section: "data".to_string(),
            key: "dir".to_string(),
            reason: "no ticker files found".to_string(),
        });
    }
    Ok(scanned)
}

/// Preloaded price series keyed by (ticker, year). Populated once, then
/// only read.
#[derive(Debug, Default)]
pub struct PriceCache {
    map: HashMap<(String, i32), PriceSeries>,
}

impl PriceCache {
    pub fn new() -> Self {
        PriceCache::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.map
            .insert((series.ticker.clone(), series.year), series);
    }

    pub fn get(&self, ticker: &str, year: i32) -> Result<&PriceSeries, BandtraderError> {
        self.map
            .get(&(ticker.to_string(), year))
            .ok_or_else(|| BandtraderError::DataNotFound {
                ticker: ticker.to_string(),
                year,
            })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Debug)]
pub struct PreloadResult {
    pub cache: PriceCache,
    pub skipped: Vec<(String, i32)>,
}

/// Load every (ticker, year) pair, skipping pairs with no data.
///
/// Missing data is warned about and recorded; malformed data aborts the
/// whole preload. Fails when nothing at all could be loaded.
pub fn preload(
    data_port: &dyn DataPort,
    tickers: &[String],
    years: &[i32],
) -> Result<PreloadResult, BandtraderError> {
    let mut cache = PriceCache::new();
    let mut skipped = Vec::new();

    for ticker in tickers {
        for &year in years {
            match data_port.load(ticker, year) {
                Ok(series) => {
                    eprintln!("  {} {}: {} bars [OK]", ticker, year, series.len());
                    cache.insert(series);
                }
                Err(e @ BandtraderError::DataNotFound { .. }) => {
                    eprintln!("Warning: skipping {} {} ({})", ticker, year, e);
                    skipped.push((ticker.clone(), year));
                }
                Err(e) => return Err(e),
            }
        }
    }

    if cache.is_empty() {
        return Err(BandtraderError::DataNotFound {
            ticker: "all".to_string(),
            year: years.first().copied().unwrap_or_default(),
        });
    }

    if !skipped.is_empty() {
        eprintln!(
            "Loaded {} of {} ticker-years",
            cache.len(),
            cache.len() + skipped.len()
        );
    }

    Ok(PreloadResult { cache, skipped })
}

/// Load every (ticker, year) pair or fail on the first problem. Explicit
/// runs use this path so a missing year surfaces as an error instead of a
/// skip.
pub fn preload_strict(
    data_port: &dyn DataPort,
    tickers: &[String],
    years: &[i32],
) -> Result<PriceCache, BandtraderError> {
    let mut cache = PriceCache::new();
    for ticker in tickers {
        for &year in years {
            cache.insert(data_port.load(ticker, year)?);
        }
    }
    Ok(cache)
}
