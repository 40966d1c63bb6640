//! Runtime settings resolved from INI configuration.
//!
//! Every key is optional. Missing keys fall back to built-in defaults so
//! the binary runs with no config file at all.

use crate::domain::error::BandtraderError;
use crate::domain::optimizer::{FloatParamRange, IntParamRange, ParameterSpace};
use crate::domain::universe;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: String,
    /// Explicit universe; empty means scan the data directory.
    pub tickers: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub initial_capital: f64,
    /// Optimizer pool size; 0 lets the pool pick.
    pub workers: usize,
    pub output_dir: String,
    pub params_file: String,
    pub space: ParameterSpace,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: "YahooStockData".to_string(),
            tickers: Vec::new(),
            start_year: 2014,
            end_year: 2025,
            initial_capital: 10_000.0,
            workers: 0,
            output_dir: ".".to_string(),
            params_file: "best_params.ini".to_string(),
            space: ParameterSpace::default(),
        }
    }
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BandtraderError> {
        let defaults = Settings::default();

        let data_dir = config
            .get_string("data", "dir")
            .unwrap_or(defaults.data_dir);
        let tickers = read_tickers(config)?;
        let start_year = read_year(config, "start_year", defaults.start_year)?;
        let end_year = read_year(config, "end_year", defaults.end_year)?;
        if start_year > end_year {
            return Err(BandtraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_year".to_string(),
                reason: "start_year must not be after end_year".to_string(),
            });
        }
        let initial_capital = read_initial_capital(config, defaults.initial_capital)?;
        let workers = read_workers(config)?;
        let output_dir = config
            .get_string("output", "dir")
            .unwrap_or(defaults.output_dir);
        let params_file = config
            .get_string("output", "params_file")
            .unwrap_or(defaults.params_file);
        let space = read_space(config, defaults.space)?;

        Ok(Settings {
            data_dir,
            tickers,
            start_year,
            end_year,
            initial_capital,
            workers,
            output_dir,
            params_file,
            space,
        })
    }

    /// The backtest horizon in chronological order.
    pub fn years(&self) -> Vec<i32> {
        (self.start_year..=self.end_year).collect()
    }
}

fn read_tickers(config: &dyn ConfigPort) -> Result<Vec<String>, BandtraderError> {
    match config.get_string("data", "tickers") {
        Some(raw) if !raw.trim().is_empty() => {
            universe::parse_tickers(&raw).map_err(|e| BandtraderError::ConfigInvalid {
                section: "data".to_string(),
                key: "tickers".to_string(),
                reason: e.to_string(),
            })
        }
        _ => Ok(Vec::new()),
    }
}

fn read_year(config: &dyn ConfigPort, key: &str, default: i32) -> Result<i32, BandtraderError> {
    let value = config.get_int("backtest", key, i64::from(default));
    i32::try_from(value).map_err(|_| BandtraderError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: format!("{key} is out of range"),
    })
}

fn read_initial_capital(config: &dyn ConfigPort, default: f64) -> Result<f64, BandtraderError> {
    let value = config.get_double("backtest", "initial_capital", default);
    if !value.is_finite() || value <= 0.0 {
        return Err(BandtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(value)
}

fn read_workers(config: &dyn ConfigPort) -> Result<usize, BandtraderError> {
    let value = config.get_int("backtest", "workers", 0);
    usize::try_from(value).map_err(|_| BandtraderError::ConfigInvalid {
        section: "backtest".to_string(),
        key: "workers".to_string(),
        reason: "workers must be non-negative".to_string(),
    })
}

fn read_space(
    config: &dyn ConfigPort,
    defaults: ParameterSpace,
) -> Result<ParameterSpace, BandtraderError> {
    let space = ParameterSpace {
        count: read_int_range(config, "count", &defaults.count)?,
        pct: read_float_range(config, "pct", &defaults.pct),
        window: read_int_range(config, "window", &defaults.window)?,
    };
    match space.validate() {
        Ok(()) => Ok(space),
        Err(BandtraderError::InvalidParameter { name, reason }) => {
            Err(BandtraderError::ConfigInvalid {
                section: "optimize".to_string(),
                key: name,
                reason,
            })
        }
        Err(other) => Err(other),
    }
}

fn read_int_range(
    config: &dyn ConfigPort,
    name: &str,
    default: &IntParamRange,
) -> Result<IntParamRange, BandtraderError> {
    Ok(IntParamRange::new(
        read_u32(config, &format!("{name}_min"), default.min)?,
        read_u32(config, &format!("{name}_max"), default.max)?,
        read_u32(config, &format!("{name}_step"), default.step)?,
    ))
}

fn read_u32(config: &dyn ConfigPort, key: &str, default: u32) -> Result<u32, BandtraderError> {
    let value = config.get_int("optimize", key, i64::from(default));
    u32::try_from(value).map_err(|_| BandtraderError::ConfigInvalid {
        section: "optimize".to_string(),
        key: key.to_string(),
        reason: "must be a non-negative integer".to_string(),
    })
}

fn read_float_range(
    config: &dyn ConfigPort,
    name: &str,
    default: &FloatParamRange,
) -> FloatParamRange {
    FloatParamRange::new(
        config.get_double("optimize", &format!("{name}_min"), default.min),
        config.get_double("optimize", &format!("{name}_max"), default.max),
        config.get_double("optimize", &format!("{name}_step"), default.step),
    )
}
