//! CSV price data adapter.
//!
//! Reads one `<TICKER>.csv` file per ticker from a base directory. Columns
//! are resolved from the header row by name, case-insensitively, so Yahoo
//! exports with an extra `Adj Close` column load unchanged.

use crate::domain::error::BandtraderError;
use crate::domain::series::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::PathBuf;

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

fn resolve_columns(headers: &csv::StringRecord, file: &str) -> Result<Columns, BandtraderError> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| BandtraderError::DataFormat {
                file: file.to_string(),
                reason: format!("missing {name} column"),
            })
    };
    Ok(Columns {
        date: find("date")?,
        open: find("open")?,
        high: find("high")?,
        low: find("low")?,
        close: find("close")?,
        volume: find("volume")?,
    })
}

fn field<'a>(
    record: &'a csv::StringRecord,
    idx: usize,
    name: &str,
    file: &str,
) -> Result<&'a str, BandtraderError> {
    record.get(idx).ok_or_else(|| BandtraderError::DataFormat {
        file: file.to_string(),
        reason: format!("missing {name} value"),
    })
}

fn parse_price(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    file: &str,
) -> Result<f64, BandtraderError> {
    field(record, idx, name, file)?
        .trim()
        .parse()
        .map_err(|e| BandtraderError::DataFormat {
            file: file.to_string(),
            reason: format!("invalid {name} value: {e}"),
        })
}

fn parse_volume(
    record: &csv::StringRecord,
    idx: usize,
    file: &str,
) -> Result<i64, BandtraderError> {
    field(record, idx, "volume", file)?
        .trim()
        .parse()
        .map_err(|e| BandtraderError::DataFormat {
            file: file.to_string(),
            reason: format!("invalid volume value: {e}"),
        })
}

fn validate_bar(bar: &PriceBar, file: &str) -> Result<(), BandtraderError> {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return Err(BandtraderError::DataFormat {
            file: file.to_string(),
            reason: format!("non-positive price on {}", bar.date),
        });
    }
    if bar.volume < 0 {
        return Err(BandtraderError::DataFormat {
            file: file.to_string(),
            reason: format!("negative volume on {}", bar.date),
        });
    }
    Ok(())
}

impl DataPort for CsvDataAdapter {
    fn load(&self, ticker: &str, year: i32) -> Result<PriceSeries, BandtraderError> {
        let path = self.csv_path(ticker);
        let file = path.display().to_string();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BandtraderError::DataNotFound {
                    ticker: ticker.to_string(),
                    year,
                });
            }
            Err(e) => return Err(BandtraderError::Io(e)),
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| BandtraderError::DataFormat {
                file: file.clone(),
                reason: format!("unreadable header row: {e}"),
            })?
            .clone();
        let cols = resolve_columns(&headers, &file)?;

        let mut bars: Vec<PriceBar> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BandtraderError::DataFormat {
                file: file.clone(),
                reason: format!("unreadable row: {e}"),
            })?;

            let date_str = field(&record, cols.date, "date", &file)?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                BandtraderError::DataFormat {
                    file: file.clone(),
                    reason: format!("invalid date {date_str:?}: {e}"),
                }
            })?;
            if date.year() != year {
                continue;
            }

            let bar = PriceBar {
                date,
                open: parse_price(&record, cols.open, "open", &file)?,
                high: parse_price(&record, cols.high, "high", &file)?,
                low: parse_price(&record, cols.low, "low", &file)?,
                close: parse_price(&record, cols.close, "close", &file)?,
                volume: parse_volume(&record, cols.volume, &file)?,
            };
            validate_bar(&bar, &file)?;

            if let Some(prev) = bars.last() {
                if bar.date <= prev.date {
                    return Err(BandtraderError::DataFormat {
                        file: file.clone(),
                        reason: format!("rows out of order at {}", bar.date),
                    });
                }
            }
            bars.push(bar);
        }

        if bars.is_empty() {
            return Err(BandtraderError::DataNotFound {
                ticker: ticker.to_string(),
                year,
            });
        }

        Ok(PriceSeries {
            ticker: ticker.to_string(),
            year,
            bars,
        })
    }

    fn list_tickers(&self) -> Result<Vec<String>, BandtraderError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                if !stem.is_empty() {
                    tickers.push(stem.to_string());
                }
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
